//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责 Attempt 的生命周期管理，是整个系统的"指挥中心"。
//!
//! ### `supervisor` - 恢复监督者
//! - 无限 Attempt 循环（无退避、无次数限制）
//! - 每次 Attempt 管理浏览器资源（BrowserSession、PageDriver）
//! - 致命错误统一处理：记录、释放、重启

pub mod supervisor;

pub use supervisor::Supervisor;
