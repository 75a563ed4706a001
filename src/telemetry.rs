use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::LocalTime;

/// 默认日志级别
const DEFAULT_FILTER: &str = "info";

/// 初始化日志输出
///
/// 日志级别取自 `RUST_LOG`，未设置时为 `info`。重复调用不会报错。
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(LocalTime::rfc_3339())
        .with_writer(std::io::stderr)
        .try_init();
}
