//! 监控循环 - 流程层
//!
//! 进入 Monitor 阶段后的无限轮询：等页面就绪、探测可选日期、
//! 落盘进度截图、更新状态与日志。循环内部没有终点，
//! 只有会话本身不可用这类越过瞬态守卫的错误才会跳出并上抛。

use anyhow::Result;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error};

use crate::config::Config;
use crate::infrastructure::PageDriver;
use crate::models::LogKind;
use crate::services::{ShotWriter, SlotDetector, StatusStore};

/// 未发现名额时的可合并消息
pub(crate) const NO_SLOTS_MSG: &str = "ℹ️ 暂无可预约日期";

/// 监控循环
///
/// 瞬态错误：记录进状态和日志、短退避、继续轮询；
/// 会话失效：带上下文上抛，交给监督者重启整个 Attempt。
/// 无论哪个分支，每轮结尾都固定等待一个轮询间隔。
pub async fn monitor_loop(
    driver: &PageDriver,
    status: &StatusStore,
    detector: &SlotDetector,
    shots: &ShotWriter,
    config: &Config,
) -> Result<()> {
    loop {
        if let Err(e) = monitor_tick(driver, status, detector, shots).await {
            if !driver.is_alive().await {
                return Err(e.context("浏览器会话已不可用"));
            }
            status.update(|s| s.error = Some(format!("{:#}", e)));
            if let Err(log_err) =
                status.record(LogKind::Event, format!("⚠️ 监控出错: {:#}", e))
            {
                error!("记录监控错误失败: {}", log_err);
            }
            sleep(Duration::from_secs(config.monitor_backoff_secs)).await;
        }
        sleep(Duration::from_secs(config.poll_interval_secs)).await;
    }
}

/// 单轮监控
async fn monitor_tick(
    driver: &PageDriver,
    status: &StatusStore,
    detector: &SlotDetector,
    shots: &ShotWriter,
) -> Result<()> {
    driver.wait_for_dom_ready().await?;
    let labels = detector.detect(driver).await?;
    shots.write_latest(driver).await?;
    if !labels.is_empty() {
        let hit_path = shots.write_hit(driver).await?;
        debug!("命中截图: {}", hit_path.display());
    }
    apply_detection(status, &labels)
}

/// 把一次探测结果应用到状态与日志
///
/// 与页面交互解耦，命中/未命中两个分支的状态语义都在这里
pub(crate) fn apply_detection(status: &StatusStore, labels: &[String]) -> Result<()> {
    if labels.is_empty() {
        status.update(|s| {
            s.date_found = false;
            s.date_matches.clear();
        });
        status.record(LogKind::NoSlots, NO_SLOTS_MSG)
    } else {
        status.update(|s| {
            s.date_found = true;
            s.date_matches = labels.to_vec();
        });
        status.record(LogKind::Event, format!("🔔 发现可预约日期! {:?}", labels))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, StatusStore) {
        let dir = TempDir::new().unwrap();
        let store = StatusStore::with_paths(
            dir.path().join("status.json"),
            dir.path().join("logs.txt"),
        );
        (dir, store)
    }

    #[test]
    fn test_five_empty_polls_keep_single_log_line() {
        let (_dir, store) = create_test_store();
        for _ in 0..5 {
            apply_detection(&store, &[]).unwrap();
        }
        assert_eq!(store.log_tail().lines().count(), 1);
        let snap = store.snapshot();
        assert!(!snap.date_found);
        assert!(snap.date_matches.is_empty());
    }

    #[test]
    fn test_hit_appends_new_line_and_updates_status() {
        let (_dir, store) = create_test_store();
        apply_detection(&store, &[]).unwrap();
        let labels = vec!["12 Jan".to_string(), "15 Jan".to_string()];
        apply_detection(&store, &labels).unwrap();

        // 命中不与之前的"暂无"合并
        assert_eq!(store.log_tail().lines().count(), 2);
        assert!(store.log_tail().contains("12 Jan"));

        let snap = store.snapshot();
        assert!(snap.date_found);
        assert_eq!(snap.date_matches, labels);
    }

    #[test]
    fn test_empty_after_hit_resets_status() {
        let (_dir, store) = create_test_store();
        apply_detection(&store, &["12 Jan".to_string()]).unwrap();
        apply_detection(&store, &[]).unwrap();
        let snap = store.snapshot();
        assert!(!snap.date_found);
        assert!(snap.date_matches.is_empty());
    }
}
