//! # QVC Appointment Bot
//!
//! 一个自动监控卡塔尔签证中心预约名额的 Rust 机器人
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `browser/` - 每次 Attempt 独立的浏览器会话（启动、伪装、关闭）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `PageDriver` - 唯一的 page owner，提供点击/输入/等待/截图能力
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，不关心流程顺序
//! - `StatusStore` - 状态快照 + 3 条日志尾部的持久化能力
//! - `CaptchaRelay` - 验证码单槽信箱接力能力
//! - `SlotDetector` - 可选日期探测能力
//! - `ShotWriter` - 截图产物落盘能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一次 Attempt"的完整步骤序列
//! - `BookingFlow` - 流程编排（导航 → … → 签证中心 → 监控循环）
//! - `StepKind` - {Required, Optional} 统一失败策略
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/supervisor` - 无限 Attempt 循环，致命错误后整体重启
//!
//! ## 模块结构

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod workflow;

// 重新导出常用类型
pub use browser::BrowserSession;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::PageDriver;
pub use models::{Credentials, Phase, SessionState};
pub use orchestrator::Supervisor;
pub use services::{CaptchaRelay, ShotWriter, SlotDetector, StatusStore};
pub use workflow::{BookingFlow, StepKind};
