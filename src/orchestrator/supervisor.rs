//! 恢复监督者 - 编排层
//!
//! ## 职责
//!
//! 状态机：Idle → (Attempt) → Idle → (Attempt) → … 永不停止。
//!
//! 每次 Attempt：
//! 1. 启动全新的浏览器会话（不复用上一次的任何资源）
//! 2. 跑一次完整的 BookingFlow（其内部进入无限监控循环）
//! 3. 致命错误：记录进状态与日志、释放全部会话资源、立即重来
//!
//! 不区分失败原因，盲目重启是唯一的恢复策略。
//! 除了进程终止，没有任何外部机制能停止这个循环。

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info};

use crate::browser::BrowserSession;
use crate::config::Config;
use crate::infrastructure::PageDriver;
use crate::models::{Credentials, LogKind};
use crate::services::{CaptchaRelay, StatusStore};
use crate::workflow::BookingFlow;

/// 恢复监督者
pub struct Supervisor {
    config: Config,
    credentials: Credentials,
    status: Arc<StatusStore>,
    relay: Arc<CaptchaRelay>,
}

impl Supervisor {
    /// 创建新的监督者
    pub fn new(
        config: Config,
        credentials: Credentials,
        status: Arc<StatusStore>,
        relay: Arc<CaptchaRelay>,
    ) -> Self {
        Self {
            config,
            credentials,
            status,
            relay,
        }
    }

    /// 监督循环，永不正常返回
    pub async fn run_forever(&self) -> Result<()> {
        let mut attempt: u64 = 0;
        loop {
            attempt += 1;
            info!("🚀 第 {} 次 Attempt 开始", attempt);

            if let Err(e) = self.run_attempt().await {
                self.status.update(|s| s.error = Some(format!("{:#}", e)));
                if let Err(log_err) = self
                    .status
                    .record(LogKind::Event, format!("❌ 致命错误: {:#}，重启流程...", e))
                {
                    error!("记录致命错误失败: {}", log_err);
                }
            }

            // 刻意不做退避：restart_delay_secs 默认为 0，失败后立即重来
            if self.config.restart_delay_secs > 0 {
                sleep(Duration::from_secs(self.config.restart_delay_secs)).await;
            }
        }
    }

    /// 跑一次 Attempt，返回前保证会话资源已全部释放
    async fn run_attempt(&self) -> Result<()> {
        let session = BrowserSession::launch(&self.config).await?;
        let driver = PageDriver::new(
            session.page().clone(),
            Duration::from_secs(self.config.step_wait_timeout_secs),
        );
        let flow = BookingFlow::new(
            &self.config,
            self.credentials.clone(),
            self.status.clone(),
            self.relay.clone(),
        );

        let result = flow.run(&driver).await;
        session.close().await;
        result
    }
}
