//! 日志初始化
//!
//! tracing 日志面向运行终端，与仪表盘的 3 条日志尾部是两回事：
//! 每次写入日志尾部时也会同时打一条 tracing 日志。

use tracing_subscriber::EnvFilter;

/// 初始化 tracing 日志
///
/// 默认 info 级别，可通过 RUST_LOG 环境变量覆盖
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
