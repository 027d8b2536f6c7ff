// ==========================================
// 包装线称重控制 - 日志系统初始化
// ==========================================
// tracing + tracing-subscriber，RUST_LOG 控制过滤
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 未设置 RUST_LOG 时的默认过滤器
pub const DEFAULT_FILTER: &str = "info";

/// 构建过滤器: RUST_LOG 优先，否则使用 fallback
fn env_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// 初始化日志系统
///
/// # 环境变量
/// - RUST_LOG: 例如 `RUST_LOG=packaging_weight_control=debug`
///
/// 日志写到 stderr，stdout 留给命令行的 JSON 输出
pub fn init() {
    fmt()
        .with_env_filter(env_filter(DEFAULT_FILTER))
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();
}

/// 初始化测试环境的日志系统（debug 级别，可重复调用）
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
