//! 日期槽位探测服务 - 业务能力层
//!
//! 只负责"看页面上有哪些可选日期"，不关心流程

use anyhow::Result;
use tracing::debug;

use crate::infrastructure::PageDriver;

/// 可选日期按钮的选择器：未禁用的日期单元格里未禁用的按钮
pub const SLOT_SELECTOR: &str =
    "td.datepicker__day:not(.is-disabled) button.datepicker__button:not([disabled])";

/// 日期槽位探测服务
pub struct SlotDetector;

impl SlotDetector {
    /// 创建新的探测服务
    pub fn new() -> Self {
        Self
    }

    /// 返回当前页面所有可选日期按钮的文本，按页面顺序
    ///
    /// 空列表表示没有放出的名额。
    /// 一次 JS 取回全部文本，避免逐元素往返。
    pub async fn detect(&self, driver: &PageDriver) -> Result<Vec<String>> {
        let js = format!(
            r#"
            (() => {{
                const nodes = document.querySelectorAll({selector});
                return Array.from(nodes).map(n => (n.innerText || '').trim());
            }})()
            "#,
            selector = serde_json::to_string(SLOT_SELECTOR)?,
        );
        let labels: Vec<String> = serde_json::from_value(driver.eval(js).await?)?;
        debug!("探测到 {} 个可选日期", labels.len());
        Ok(labels)
    }
}

impl Default for SlotDetector {
    fn default() -> Self {
        Self::new()
    }
}
