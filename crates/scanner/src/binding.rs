use crate::error::ScannerError;
use kizashi_cache::fetcher::CachedFetcher;
use kizashi_core::common::Symbol;
use kizashi_core::signal::entity::{RawPayload, SourceKind, SourceScope};
use kizashi_core::signal::error::FetchError;
use kizashi_core::signal::port::{SignalFeed, SignalSource};
use std::sync::Arc;

/// # Summary
/// 一个来源类别的完整装配：抓取器 + 求值器 + 该类别专属的读穿缓存。
///
/// # Invariants
/// - 抓取器与求值器的 `kind` 相同。
/// - 缓存键为 `"{kind}:{symbol}"`，全局来源为 `"{kind}:*"`。
pub struct SourceBinding {
    feed: Arc<dyn SignalFeed>,
    source: Arc<dyn SignalSource>,
    fetcher: Arc<CachedFetcher>,
}

impl SourceBinding {
    pub fn new(
        feed: Arc<dyn SignalFeed>,
        source: Arc<dyn SignalSource>,
        fetcher: Arc<CachedFetcher>,
    ) -> Result<Self, ScannerError> {
        if feed.kind() != source.kind() {
            return Err(ScannerError::KindMismatch {
                feed: feed.kind(),
                evaluator: source.kind(),
            });
        }
        Ok(Self {
            feed,
            source,
            fetcher,
        })
    }

    pub fn kind(&self) -> SourceKind {
        self.feed.kind()
    }

    pub fn scope(&self) -> SourceScope {
        self.feed.scope()
    }

    pub fn source(&self) -> &dyn SignalSource {
        self.source.as_ref()
    }

    pub fn cache_key(&self, symbol: Option<&Symbol>) -> String {
        format!("{}:{}", self.kind(), symbol.map(Symbol::as_str).unwrap_or("*"))
    }

    /// # Summary
    /// 经缓存抓取载荷：TTL 内复用，过期才调用上游。
    pub async fn fetch(&self, symbol: Option<&Symbol>) -> Result<RawPayload, FetchError> {
        let key = self.cache_key(symbol);
        self.fetcher
            .fetch(&key, || self.feed.fetch(symbol))
            .await
    }

    /// 最后一次成功抓取的载荷，不论是否过期
    pub async fn last_known(&self, symbol: Option<&Symbol>) -> Option<RawPayload> {
        self.fetcher
            .last_known::<RawPayload>(&self.cache_key(symbol))
            .await
            .map(|entry| entry.value)
    }
}
