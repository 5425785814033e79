//! 截图写入服务 - 业务能力层
//!
//! 只负责落盘截图产物，不关心流程：
//! - latest.png: 滚动覆盖的最新进度截图
//! - date_<时间戳>.png: 发现名额时的唯一命名命中截图

use anyhow::{Context, Result};
use chrono::Local;
use std::path::PathBuf;
use tracing::debug;

use crate::config::Config;
use crate::infrastructure::PageDriver;

/// 截图写入服务
pub struct ShotWriter {
    static_dir: PathBuf,
}

impl ShotWriter {
    /// 创建新的截图写入服务
    pub fn new(config: &Config) -> Self {
        Self {
            static_dir: PathBuf::from(&config.static_dir),
        }
    }

    /// 使用自定义目录创建
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            static_dir: dir.into(),
        }
    }

    /// 覆盖写入 latest.png
    ///
    /// 先写临时文件再改名，仪表盘刷新时不会读到半张图
    pub async fn write_latest(&self, driver: &PageDriver) -> Result<()> {
        let bytes = driver.screenshot().await?;
        let tmp = self
            .static_dir
            .join(format!("temp_{}.png", Local::now().timestamp()));
        let latest = self.static_dir.join("latest.png");
        tokio::fs::write(&tmp, &bytes)
            .await
            .with_context(|| format!("写入临时截图失败: {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &latest)
            .await
            .with_context(|| format!("替换 latest.png 失败: {}", latest.display()))?;
        Ok(())
    }

    /// 写入唯一命名的命中截图，返回路径
    pub async fn write_hit(&self, driver: &PageDriver) -> Result<PathBuf> {
        let name = format!("date_{}.png", Local::now().format("%Y-%m-%d_%H-%M-%S"));
        let path = self.static_dir.join(name);
        let bytes = driver.screenshot().await?;
        tokio::fs::write(&path, &bytes)
            .await
            .with_context(|| format!("写入命中截图失败: {}", path.display()))?;
        debug!("命中截图已保存: {}", path.display());
        Ok(path)
    }
}
