mod settings;
mod telemetry;
mod wiring;

use std::sync::Arc;

use kizashi_api::server::{AppState, start_server};
use kizashi_cache::mem::MemCache;
use kizashi_core::common::time::{RealTimeProvider, TimeProvider};
use kizashi_core::common::tls::install_crypto_provider;
use kizashi_notify::dispatcher::AlertDispatcher;
use kizashi_scanner::{Scheduler, SnapshotStore};
use tracing::{error, info};

/// # Summary
/// 应用启动入口，纯粹的 DI 容器。
/// 负责实例化所有具体实现组件并通过 Arc<dyn Trait> 注入到调度器。
///
/// # Logic
/// 1. 加载并校验配置，初始化全局日志与 TLS 后端。
/// 2. 实例化基础设施层（缓存、Feed、通知渠道）。
/// 3. 构造调度器与快照存储，挂载告警分发与只读 API。
/// 4. 运行扫描循环，直到收到退出信号。
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 配置与日志
    let extra = std::env::var(settings::CONFIG_PATH_ENV).ok();
    let config = settings::load(extra.as_deref())?;
    let _log_guard = telemetry::init(&config.log);
    install_crypto_provider();
    info!(
        "Kizashi starting: {} symbols, interval {}s",
        config.scanner.watchlist.len(),
        config.scanner.interval_secs
    );

    // 2. 基础设施层
    let clock: Arc<dyn TimeProvider> = Arc::new(RealTimeProvider);
    let cache = Arc::new(MemCache::new());
    let bindings = wiring::build_bindings(&config, cache, clock.clone())?;
    let notifiers = wiring::build_notifiers(&config.notify)?;

    // 3. 调度器、快照与外围服务
    let store = Arc::new(SnapshotStore::new(clock.now()));
    let mut scheduler = Scheduler::new(&config.scanner, bindings, store.clone(), clock);

    let dispatcher = AlertDispatcher::new(notifiers);
    if dispatcher.is_empty() {
        info!("No notification channel configured, alerts stay in the snapshot only");
    } else {
        tokio::spawn(dispatcher.run(store.subscribe()));
    }

    if config.server.enabled {
        let state = AppState { store: store.clone() };
        let addr = format!("{}:{}", config.server.host, config.server.port);
        tokio::spawn(async move {
            if let Err(e) = start_server(state, &addr).await {
                error!("API server stopped: {}", e);
            }
        });
    }

    // 4. 扫描循环与退出信号
    tokio::select! {
        _ = scheduler.run() => {}
        res = tokio::signal::ctrl_c() => {
            res?;
            info!("Shutdown signal received after cycle {}. Exiting...", store.latest().cycle);
        }
    }

    Ok(())
}
