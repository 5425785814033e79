//! 状态存储服务 - 业务能力层
//!
//! 持久化当前会话快照和最多 3 条的日志尾部，
//! 引擎侧写入，仪表盘只读快照。
//!
//! 职责：
//! - record: 追加/合并日志，盖时间戳，把快照和日志尾部作为一个逻辑单元落盘
//! - update: 只改状态字段，不产生日志行
//! - snapshot / log_tail: 对外只读访问

use anyhow::{Context, Result};
use chrono::Local;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::info;

use crate::config::Config;
use crate::models::{LogEntry, LogKind, Phase, SessionState};

/// 日志尾部最多保留的条数
pub(crate) const LOG_TAIL_CAP: usize = 3;

struct StoreInner {
    state: SessionState,
    tail: VecDeque<LogEntry>,
}

/// 状态存储服务
pub struct StatusStore {
    inner: Mutex<StoreInner>,
    status_path: PathBuf,
    log_path: PathBuf,
}

impl StatusStore {
    /// 创建新的状态存储，确保产物目录存在
    pub fn new(config: &Config) -> Result<Self> {
        fs::create_dir_all(&config.static_dir)
            .with_context(|| format!("创建产物目录失败: {}", config.static_dir))?;
        Ok(Self::with_paths(config.status_path(), config.log_path()))
    }

    /// 使用自定义路径创建（测试用）
    pub fn with_paths(status_path: PathBuf, log_path: PathBuf) -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                state: SessionState::default(),
                tail: VecDeque::new(),
            }),
            status_path,
            log_path,
        }
    }

    /// 锁中毒时继续使用内部值：状态只做整值覆盖，半写状态不存在
    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// 记录一条日志并落盘
    ///
    /// 合并规则：新消息与尾部最后一条同属可合并类别时，
    /// 原位替换最后一条（位置不变，时间戳更新），否则正常追加。
    /// 快照和日志尾部在同一把锁内先后写出，读回时反映同一事件。
    pub fn record(&self, kind: LogKind, message: impl Into<String>) -> Result<()> {
        let message = message.into();
        let ts = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let line = format!("[{}] {}", ts, message);
        info!("{}", message);

        let mut inner = self.lock();

        let replace = kind.coalesces()
            && inner.tail.back().map(|e| e.kind == kind).unwrap_or(false);
        if replace {
            if let Some(last) = inner.tail.back_mut() {
                last.line = line;
            }
        } else {
            inner.tail.push_back(LogEntry::new(kind, line));
            if inner.tail.len() > LOG_TAIL_CAP {
                inner.tail.pop_front();
            }
        }
        inner.state.last_update = ts;

        let log_text = render_tail(&inner.tail);
        let status_json =
            serde_json::to_string(&inner.state).context("序列化状态快照失败")?;

        write_atomic(&self.log_path, log_text.as_bytes())?;
        write_atomic(&self.status_path, status_json.as_bytes())?;

        Ok(())
    }

    /// 只修改状态字段，不产生日志行
    ///
    /// 每次 update 在实践中都配对一次描述同一事件的 record 调用
    pub fn update(&self, f: impl FnOnce(&mut SessionState)) {
        let mut inner = self.lock();
        f(&mut inner.state);
    }

    /// 设置当前阶段
    pub fn set_phase(&self, phase: Phase) {
        self.update(|s| s.phase = phase);
    }

    /// 当前会话快照
    pub fn snapshot(&self) -> SessionState {
        self.lock().state.clone()
    }

    /// 当前日志尾部（换行拼接，最多 3 条）
    pub fn log_tail(&self) -> String {
        render_tail(&self.lock().tail)
    }
}

fn render_tail(tail: &VecDeque<LogEntry>) -> String {
    tail.iter()
        .map(|e| e.line.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// 先写临时文件再改名覆盖，读方永远看不到半写的内容
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes).with_context(|| format!("写入临时文件失败: {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("替换文件失败: {}", path.display()))?;
    Ok(())
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
    fn test_log_tail_never_exceeds_cap() {
        let (_dir, store) = create_test_store();
        for i in 0..5 {
            store.record(LogKind::Event, format!("事件 {}", i)).unwrap();
            assert!(store.log_tail().lines().count() <= LOG_TAIL_CAP);
        }
        let tail = store.log_tail();
        assert_eq!(tail.lines().count(), 3);
        // 最旧的两条已被淘汰
        assert!(!tail.contains("事件 0"));
        assert!(!tail.contains("事件 1"));
        assert!(tail.contains("事件 4"));
    }

    #[test]
    fn test_consecutive_no_slots_coalesce_into_one() {
        let (_dir, store) = create_test_store();
        for _ in 0..5 {
            store.record(LogKind::NoSlots, "ℹ️ 暂无可预约日期").unwrap();
        }
        assert_eq!(store.log_tail().lines().count(), 1);
    }

    #[test]
    fn test_non_matching_event_always_appends() {
        let (_dir, store) = create_test_store();
        store.record(LogKind::NoSlots, "ℹ️ 暂无可预约日期").unwrap();
        store.record(LogKind::Event, "✅ 其他事件").unwrap();
        // 被普通事件隔开之后，新的 NoSlots 是新条目
        store.record(LogKind::NoSlots, "ℹ️ 暂无可预约日期").unwrap();
        assert_eq!(store.log_tail().lines().count(), 3);
    }

    #[test]
    fn test_coalesced_entry_keeps_position() {
        let (_dir, store) = create_test_store();
        store.record(LogKind::Event, "✅ 第一条").unwrap();
        store.record(LogKind::NoSlots, "ℹ️ 暂无可预约日期").unwrap();
        store.record(LogKind::NoSlots, "ℹ️ 暂无可预约日期").unwrap();
        let tail = store.log_tail();
        assert_eq!(tail.lines().count(), 2);
        assert!(tail.lines().next().unwrap().contains("第一条"));
        assert!(tail.lines().last().unwrap().contains("暂无可预约日期"));
    }

    #[test]
    fn test_record_persists_status_and_log_together() {
        let (dir, store) = create_test_store();
        store.update(|s| s.phase = Phase::Monitor);
        store.record(LogKind::Event, "🕒 开始监控").unwrap();

        let status_text = fs::read_to_string(dir.path().join("status.json")).unwrap();
        let state: SessionState = serde_json::from_str(&status_text).unwrap();
        assert_eq!(state.phase, Phase::Monitor);
        assert!(!state.last_update.is_empty());

        let log_text = fs::read_to_string(dir.path().join("logs.txt")).unwrap();
        assert_eq!(log_text, store.log_tail());
        assert!(log_text.contains("开始监控"));
        // 日志时间戳与快照时间戳来自同一事件
        assert!(log_text.contains(&state.last_update));
    }

    #[test]
    fn test_update_does_not_emit_log_line() {
        let (_dir, store) = create_test_store();
        store.update(|s| {
            s.date_found = true;
            s.date_matches = vec!["12 Jan".to_string()];
        });
        assert!(store.log_tail().is_empty());
        let snap = store.snapshot();
        assert!(snap.date_found);
        assert_eq!(snap.date_matches, vec!["12 Jan".to_string()]);
    }

    #[test]
    fn test_log_lines_have_timestamp_prefix() {
        let (_dir, store) = create_test_store();
        store.record(LogKind::Event, "✅ 事件").unwrap();
        let tail = store.log_tail();
        // [YYYY-MM-DD HH:MM:SS] 前缀
        assert!(tail.starts_with('['));
        assert_eq!(tail.find(']'), Some(20));
    }
}
