//! 验证码接力服务 - 业务能力层
//!
//! 单槽信箱：引擎发布挑战图片后阻塞等待，
//! 外部（人工，经由仪表盘）写入答案后引擎继续。
//! 同一时刻最多一个挑战在途。

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::sleep;
use tracing::info;

use crate::config::Config;

/// 验证码接力服务
pub struct CaptchaRelay {
    mailbox: Mutex<Option<String>>,
    image_path: PathBuf,
    poll_interval: Duration,
}

impl CaptchaRelay {
    /// 创建新的验证码接力服务
    pub fn new(config: &Config) -> Self {
        Self::with_settings(
            config.captcha_image_path(),
            Duration::from_secs(config.captcha_poll_secs),
        )
    }

    /// 使用自定义路径和轮询间隔创建（测试用）
    pub fn with_settings(image_path: PathBuf, poll_interval: Duration) -> Self {
        Self {
            mailbox: Mutex::new(None),
            image_path,
            poll_interval,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<String>> {
        self.mailbox.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// 发布新的验证码挑战
    ///
    /// 写入挑战图片（如有），并清空上一轮残留的答案，
    /// 避免旧答案被误用到新挑战上
    pub async fn publish(&self, image: Option<&[u8]>) -> Result<()> {
        if let Some(bytes) = image {
            tokio::fs::write(&self.image_path, bytes)
                .await
                .with_context(|| {
                    format!("写入验证码图片失败: {}", self.image_path.display())
                })?;
        }
        self.lock().take();
        Ok(())
    }

    /// 阻塞等待答案
    ///
    /// 按固定间隔轮询信箱直到出现非空答案；读取但不清除，
    /// 下一次 publish 负责清除。没有超时：人工解题可能需要任意长的时间。
    pub async fn await_solution(&self) -> String {
        loop {
            if let Some(solution) = self.lock().clone() {
                if !solution.is_empty() {
                    return solution;
                }
            }
            sleep(self.poll_interval).await;
        }
    }

    /// 外部提交答案（仪表盘调用）
    ///
    /// 答案先 trim，空白提交直接忽略
    pub fn submit(&self, solution: &str) {
        let solution = solution.trim();
        if solution.is_empty() {
            return;
        }
        info!("🔑 收到验证码答案: {}", solution);
        *self.lock() = Some(solution.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn create_test_relay(dir: &TempDir) -> CaptchaRelay {
        CaptchaRelay::with_settings(
            dir.path().join("captcha.png"),
            Duration::from_millis(10),
        )
    }

    #[tokio::test]
    async fn test_await_returns_submitted_solution_without_removing() {
        let dir = TempDir::new().unwrap();
        let relay = create_test_relay(&dir);
        relay.submit("AB12");
        assert_eq!(relay.await_solution().await, "AB12");
        // 读取不清除，再次等待立即返回同一个值
        assert_eq!(relay.await_solution().await, "AB12");
    }

    #[tokio::test]
    async fn test_publish_clears_stale_solution() {
        let dir = TempDir::new().unwrap();
        let relay = Arc::new(create_test_relay(&dir));
        relay.submit("OLD");
        relay.publish(None).await.unwrap();
        assert!(relay.lock().is_none());

        // 新挑战只接受新答案
        let relay_clone = relay.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(30)).await;
            relay_clone.submit("AB12");
        });
        assert_eq!(relay.await_solution().await, "AB12");
    }

    #[tokio::test]
    async fn test_await_blocks_until_write() {
        let dir = TempDir::new().unwrap();
        let relay = Arc::new(create_test_relay(&dir));
        let relay_clone = relay.clone();
        let writer = tokio::spawn(async move {
            sleep(Duration::from_millis(50)).await;
            relay_clone.submit("XY99");
        });
        let solution = relay.await_solution().await;
        assert_eq!(solution, "XY99");
        writer.await.unwrap();
    }

    #[test]
    fn test_submit_trims_and_ignores_blank() {
        let dir = TempDir::new().unwrap();
        let relay = create_test_relay(&dir);
        relay.submit("   ");
        assert!(relay.lock().is_none());
        relay.submit("  AB12  ");
        assert_eq!(relay.lock().clone(), Some("AB12".to_string()));
    }

    #[test]
    fn test_publish_writes_challenge_image() {
        let dir = TempDir::new().unwrap();
        let relay = create_test_relay(&dir);
        tokio_test::block_on(relay.publish(Some(b"png-bytes".as_slice()))).unwrap();
        let written = std::fs::read(dir.path().join("captcha.png")).unwrap();
        assert_eq!(written, b"png-bytes");
    }
}
