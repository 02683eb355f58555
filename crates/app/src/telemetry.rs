use kizashi_core::config::LogConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// # Summary
/// 初始化全局日志。
///
/// # Logic
/// 1. `RUST_LOG` 优先，否则使用配置中的 `log.level`。
/// 2. 始终输出到终端。
/// 3. 配置了 `log.dir` 时，额外按天滚动写入 `kizashi.log` (非阻塞)。
///
/// # Returns
/// 文件输出的 guard，进程存活期间必须持有，否则缓冲日志会丢失。
pub fn init(log: &LogConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false));

    match &log.dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "kizashi.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            registry
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .init();
            Some(guard)
        }
        None => {
            registry.init();
            None
        }
    }
}
