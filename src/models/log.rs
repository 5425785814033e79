//! 日志条目模型
//!
//! 仪表盘日志尾部最多保留 3 条，超出时淘汰最旧的一条。
//! 合并规则按类别判断，而不是比较消息字符串，
//! 以便将来有其他重复性消息时可以统一合并。

/// 日志类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    /// 普通事件：总是追加为新条目
    Event,
    /// 轮询未发现日期：连续出现时原位替换，只保留最新时间戳
    NoSlots,
}

impl LogKind {
    /// 该类别的连续条目是否应合并为一条
    pub fn coalesces(self) -> bool {
        matches!(self, LogKind::NoSlots)
    }
}

/// 单条日志
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// 类别（用于合并判断）
    pub kind: LogKind,
    /// 已渲染的整行文本，含 `[YYYY-MM-DD HH:MM:SS]` 前缀
    pub line: String,
}

impl LogEntry {
    pub fn new(kind: LogKind, line: impl Into<String>) -> Self {
        Self {
            kind,
            line: line.into(),
        }
    }
}
