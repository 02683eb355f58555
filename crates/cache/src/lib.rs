//! # `kizashi-cache` - 上游调用缓存
//!
//! `MemCache` 提供基于 DashMap 的条目存储，`CachedFetcher` 在其上实现按键串行的 TTL 读穿缓存。

pub mod fetcher;
pub mod mem;
