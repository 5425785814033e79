//! 步骤描述符
//!
//! 失败策略由统一的步骤执行器按种类机械应用，
//! 不在每个步骤里各写一套错误处理。

/// 步骤种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// 必需步骤：任何交互失败（元素不存在、超时、导航失败）
    /// 都是致命错误，终止整次 Attempt
    Required,
    /// 尽力而为步骤（例如不一定弹出的确认框）：
    /// 失败就地记录日志，流程继续
    Optional,
}
