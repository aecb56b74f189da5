//! 日志初始化

use tracing_subscriber::EnvFilter;

/// 安装全局 fmt subscriber，过滤规则取自 `RUST_LOG`，未设置时为 `info`
///
/// 已存在全局 subscriber 时不做任何事并返回 `false`
pub fn init_tracing() -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}
