//! 页面驱动 - 基础设施层
//!
//! 持有唯一的 page 资源，只暴露页面能力：
//! 导航、点击、输入、等待、执行 JS、截图。
//! 不认识预约流程，也不关心步骤顺序。

use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use serde_json::Value as JsonValue;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::error::{AppError, AppResult};

/// 等待循环的重试间隔
const WAIT_RETRY_INTERVAL: Duration = Duration::from_millis(250);

/// 页面驱动
pub struct PageDriver {
    page: Page,
    wait_timeout: Duration,
}

impl PageDriver {
    /// 创建新的页面驱动
    pub fn new(page: Page, wait_timeout: Duration) -> Self {
        Self { page, wait_timeout }
    }

    /// 获取 page 的引用（用于其他操作）
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 导航到指定 URL
    pub async fn goto(&self, url: &str) -> AppResult<()> {
        debug!("导航到: {}", url);
        self.page
            .goto(url)
            .await
            .map_err(|e| AppError::navigation_failed(url, e))?;
        Ok(())
    }

    /// 当前页面 URL
    pub async fn current_url(&self) -> String {
        self.page.url().await.ok().flatten().unwrap_or_default()
    }

    /// 点击匹配选择器的第一个元素
    pub async fn click(&self, selector: &str) -> AppResult<()> {
        debug!("点击: {}", selector);
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| AppError::element_not_found(selector))?;
        element
            .click()
            .await
            .map_err(|e| AppError::interaction_failed(selector, e))?;
        Ok(())
    }

    /// 点击匹配选择器且文本命中的元素
    ///
    /// 优先精确匹配（trim 后相等），其次包含匹配，
    /// 对应下拉选项和 `has-text` 类定位
    pub async fn click_by_text(&self, selector: &str, text: &str) -> AppResult<()> {
        debug!("按文本点击: {} >> {}", selector, text);
        let js = format!(
            r#"
            (() => {{
                const want = {text};
                const nodes = Array.from(document.querySelectorAll({selector}));
                const hit = nodes.find(n => (n.textContent || '').trim() === want)
                    || nodes.find(n => (n.textContent || '').includes(want));
                if (!hit) return false;
                hit.click();
                return true;
            }})()
            "#,
            selector = serde_json::to_string(selector)?,
            text = serde_json::to_string(text)?,
        );
        let clicked: bool = serde_json::from_value(self.eval(js).await?)?;
        if clicked {
            Ok(())
        } else {
            Err(AppError::text_not_found(selector, text))
        }
    }

    /// 在输入框中键入文本
    pub async fn fill(&self, selector: &str, value: &str) -> AppResult<()> {
        debug!("输入: {} (长度 {})", selector, value.len());
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| AppError::element_not_found(selector))?;
        element
            .click()
            .await
            .map_err(|e| AppError::interaction_failed(selector, e))?;
        element
            .type_str(value)
            .await
            .map_err(|e| AppError::interaction_failed(selector, e))?;
        Ok(())
    }

    /// 勾选复选框（已勾选则不动）
    pub async fn check(&self, selector: &str) -> AppResult<()> {
        debug!("勾选: {}", selector);
        let js = format!(
            r#"
            (() => {{
                const el = document.querySelector({selector});
                if (!el) return false;
                if (!el.checked) el.click();
                return true;
            }})()
            "#,
            selector = serde_json::to_string(selector)?,
        );
        let found: bool = serde_json::from_value(self.eval(js).await?)?;
        if found {
            Ok(())
        } else {
            Err(AppError::element_not_found(selector))
        }
    }

    /// 等待元素出现，超出上限则报错
    pub async fn wait_for_selector(&self, selector: &str) -> AppResult<()> {
        let deadline = Instant::now() + self.wait_timeout;
        loop {
            if self.page.find_element(selector).await.is_ok() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(AppError::wait_timeout(selector, self.wait_timeout.as_secs()));
            }
            sleep(WAIT_RETRY_INTERVAL).await;
        }
    }

    /// 等待 DOM 加载完成（readyState 到达 interactive/complete）
    pub async fn wait_for_dom_ready(&self) -> AppResult<()> {
        let deadline = Instant::now() + self.wait_timeout;
        loop {
            let state: String = serde_json::from_value(
                self.eval("document.readyState").await?,
            )?;
            if state == "interactive" || state == "complete" {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(AppError::wait_timeout(
                    "DOM 加载完成",
                    self.wait_timeout.as_secs(),
                ));
            }
            sleep(WAIT_RETRY_INTERVAL).await;
        }
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> AppResult<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        let json_value = result.into_value()?;
        Ok(json_value)
    }

    /// 会话是否仍然可用（能执行最小的 JS 即视为存活）
    pub async fn is_alive(&self) -> bool {
        self.page.evaluate("1 + 1").await.is_ok()
    }

    /// 整页截图
    pub async fn screenshot(&self) -> AppResult<Vec<u8>> {
        let bytes = self
            .page
            .screenshot(ScreenshotParams::builder().build())
            .await
            .map_err(AppError::screenshot_failed)?;
        Ok(bytes)
    }

    /// 元素截图；元素不存在时返回 None
    pub async fn screenshot_element(&self, selector: &str) -> AppResult<Option<Vec<u8>>> {
        let Ok(element) = self.page.find_element(selector).await else {
            return Ok(None);
        };
        let bytes = element
            .screenshot(CaptureScreenshotFormat::Png)
            .await
            .map_err(AppError::screenshot_failed)?;
        Ok(Some(bytes))
    }
}
