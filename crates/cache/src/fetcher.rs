use dashmap::DashMap;
use kizashi_core::cache::entity::CacheEntry;
use kizashi_core::cache::port::{Cache, CacheExt};
use kizashi_core::common::time::TimeProvider;
use kizashi_core::signal::error::FetchError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// # Summary
/// 带 TTL 的读穿缓存，包裹单一类别的上游调用。
///
/// # Invariants
/// - 同一个 key 的读写互斥：并发的同键抓取只会触发一次上游调用。
/// - 不同 key 之间不争用同一把锁。
/// - 上游失败时绝不覆盖已有条目，过期旧值仍可通过 `last_known` 读取。
pub struct CachedFetcher {
    // 条目存储
    cache: Arc<dyn Cache>,
    // 过期判断所用时钟
    clock: Arc<dyn TimeProvider>,
    // 本实例写入条目的存活时长
    ttl: Duration,
    // 按键划分的异步互斥锁
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl CachedFetcher {
    /// # Summary
    /// 创建读穿缓存。
    ///
    /// # Arguments
    /// * `cache`: 底层条目存储，可与其他来源共享。
    /// * `clock`: 时钟。
    /// * `ttl`: 由配置按来源类别决定的存活时长。
    pub fn new(cache: Arc<dyn Cache>, clock: Arc<dyn TimeProvider>, ttl: Duration) -> Self {
        Self {
            cache,
            clock,
            ttl,
            locks: DashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// # Summary
    /// 读取 key 对应的值，必要时调用上游。
    ///
    /// # Logic
    /// 1. 获取该 key 的互斥锁。
    /// 2. 若存在未过期条目，直接返回其值，不触发上游调用。
    /// 3. 否则执行 `upstream`：成功则以当前时间写入新条目并返回；失败则原样传播错误，旧条目保留。
    /// 4. 缓存读写自身的故障只记录日志，按未命中处理。
    ///
    /// # Arguments
    /// * `key`: 缓存键。
    /// * `upstream`: 上游调用。
    ///
    /// # Returns
    /// 命中或上游成功返回值，上游失败返回 `FetchError`。
    pub async fn fetch<T, F, Fut>(&self, key: &str, upstream: F) -> Result<T, FetchError>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<T, FetchError>> + Send,
    {
        let lock = self.locks.entry(key.to_string()).or_default().clone();
        let _guard = lock.lock().await;

        let now = self.clock.now();
        match self.cache.get::<T>(key).await {
            Ok(Some(entry)) if entry.is_live(now) => {
                debug!("cache hit for {} (fetched at {})", key, entry.fetched_at);
                return Ok(entry.value);
            }
            Ok(_) => {}
            Err(e) => warn!("cache read failed for {}: {}", key, e),
        }

        let value = upstream().await?;
        if let Err(e) = self.cache.set(key, &value, self.clock.now(), self.ttl).await {
            warn!("cache write failed for {}: {}", key, e);
        }
        Ok(value)
    }

    /// # Summary
    /// 读取最后一次成功写入的条目，不论是否过期。
    ///
    /// # Returns
    /// 不存在或无法解码时返回 None。
    pub async fn last_known<T: DeserializeOwned + Send>(&self, key: &str) -> Option<CacheEntry<T>> {
        match self.cache.get::<T>(key).await {
            Ok(entry) => entry,
            Err(e) => {
                warn!("cache read failed for {}: {}", key, e);
                None
            }
        }
    }
}
