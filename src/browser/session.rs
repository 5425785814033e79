//! 浏览器会话
//!
//! 一次 Attempt 对应一个会话：浏览器进程、事件处理任务、页面
//! 全部在这里创建，也全部在 `close` 里释放，绝不跨 Attempt 复用。

use chromiumoxide::cdp::browser_protocol::emulation::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// 伪装的 User-Agent，与真实 Chrome 一致
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/120 Safari/537.36";

/// 隐藏 navigator.webdriver，避免被站点识别为自动化
const STEALTH_SCRIPT: &str =
    "Object.defineProperty(navigator,'webdriver',{get:()=>undefined});";

/// 浏览器会话
///
/// 职责：
/// - 启动全新的无头浏览器并创建页面
/// - 应用伪装设置（UA、Accept-Language、webdriver 隐藏）
/// - 持有事件处理任务的句柄，关闭时一并回收
pub struct BrowserSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
    page: Page,
}

impl BrowserSession {
    /// 启动无头浏览器并导航前的全部准备
    pub async fn launch(config: &Config) -> AppResult<Self> {
        info!("🚀 启动无头浏览器...");

        let browser_config = BrowserConfig::builder()
            .new_headless_mode()
            .request_timeout(Duration::from_secs(config.step_wait_timeout_secs))
            .args(vec![
                "--disable-gpu",
                "--no-sandbox",            // 禁用沙盒，防止权限问题导致的崩溃
                "--disable-dev-shm-usage", // 防止共享内存不足
            ])
            .build()
            .map_err(AppError::browser_config_failed)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(AppError::browser_launch_failed)?;
        debug!("无头浏览器启动成功");

        // 在后台处理浏览器事件
        let handler_task = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        // 添加短暂延迟以等待浏览器状态同步
        sleep(Duration::from_millis(300)).await;

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(AppError::page_creation_failed)?;

        Self::apply_stealth(&page).await?;
        debug!("会话环境设置完成");

        Ok(Self {
            browser,
            handler_task,
            page,
        })
    }

    /// 应用伪装设置
    async fn apply_stealth(page: &Page) -> AppResult<()> {
        let ua = SetUserAgentOverrideParams::builder()
            .user_agent(USER_AGENT)
            .accept_language("en-US,en;q=0.9")
            .build()
            .map_err(AppError::browser_config_failed)?;
        page.execute(ua)
            .await
            .map_err(AppError::session_setup_failed)?;

        let script = AddScriptToEvaluateOnNewDocumentParams::builder()
            .source(STEALTH_SCRIPT)
            .build()
            .map_err(AppError::browser_config_failed)?;
        page.execute(script)
            .await
            .map_err(AppError::session_setup_failed)?;

        Ok(())
    }

    /// 本次会话的页面
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 关闭会话，释放本次 Attempt 的全部浏览器资源
    ///
    /// 消耗 self：关闭之后任何句柄都不可能再被复用
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("⚠️ 关闭浏览器失败: {}", e);
            self.handler_task.abort();
            return;
        }
        let _ = self.handler_task.await;
        debug!("浏览器会话已关闭");
    }
}
