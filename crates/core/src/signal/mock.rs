//! 测试替身：可脚本化的抓取端口与直通求值器。

use crate::common::Symbol;
use crate::signal::entity::{RawPayload, SignalContribution, SourceKind, SourceScope};
use crate::signal::error::{FetchError, SourceError};
use crate::signal::port::{SignalFeed, SignalSource};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const GLOBAL_KEY: &str = "*";

/// # Summary
/// 脚本化响应。
#[derive(Debug, Clone)]
pub enum MockResponse {
    // 立即返回载荷
    Payload(RawPayload),
    // 延迟后返回载荷，用于触发超时
    Delayed(Duration, RawPayload),
    // 返回抓取错误
    Fail(FetchError),
}

/// # Summary
/// 按标的预设响应的抓取端口，并统计上游调用次数。
///
/// # Invariants
/// - 未预设响应的标的返回 `FetchError::Unavailable`。
pub struct MockFeed {
    kind: SourceKind,
    scope: SourceScope,
    responses: DashMap<String, MockResponse>,
    calls: AtomicUsize,
}

impl MockFeed {
    pub fn new(kind: SourceKind, scope: SourceScope) -> Self {
        Self {
            kind,
            scope,
            responses: DashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    /// 预设某标的 (全局来源传 `None`) 的响应，覆盖旧值。
    pub fn respond(&self, symbol: Option<&str>, response: MockResponse) {
        self.responses
            .insert(symbol.unwrap_or(GLOBAL_KEY).to_string(), response);
    }

    /// 累计上游调用次数。
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SignalFeed for MockFeed {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn scope(&self) -> SourceScope {
        self.scope
    }

    async fn fetch(&self, symbol: Option<&Symbol>) -> Result<RawPayload, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let key = symbol.map(Symbol::as_str).unwrap_or(GLOBAL_KEY);
        let response = self.responses.get(key).map(|r| r.value().clone());
        match response {
            Some(MockResponse::Payload(p)) => Ok(p),
            Some(MockResponse::Delayed(d, p)) => {
                tokio::time::sleep(d).await;
                Ok(p)
            }
            Some(MockResponse::Fail(e)) => Err(e),
            None => Err(FetchError::Unavailable(format!("no scripted response for {}", key))),
        }
    }
}

/// # Summary
/// 直通求值器：载荷为数字时对所有标的生效，为对象时按标的键取数字。
pub struct MockSource {
    kind: SourceKind,
    bounds: (Decimal, Decimal),
}

impl MockSource {
    pub fn new(kind: SourceKind) -> Self {
        Self {
            kind,
            bounds: (Decimal::from(-2), Decimal::from(2)),
        }
    }
}

impl SignalSource for MockSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn bounds(&self) -> (Decimal, Decimal) {
        self.bounds
    }

    fn evaluate(
        &self,
        symbol: &Symbol,
        payload: &RawPayload,
        as_of: DateTime<Utc>,
    ) -> Result<SignalContribution, SourceError> {
        let number = match payload {
            RawPayload::Number(n) => n.clone(),
            RawPayload::Object(map) => match map.get(symbol.as_str()) {
                Some(RawPayload::Number(n)) => n.clone(),
                Some(_) => return Err(SourceError::Malformed("value is not a number".into())),
                None => return Err(SourceError::NoData(symbol.to_string())),
            },
            _ => return Err(SourceError::Malformed("unexpected payload".into())),
        };
        let value = Decimal::from_str(&number.to_string())
            .map_err(|e| SourceError::Malformed(e.to_string()))?;
        Ok(SignalContribution::bounded(
            self.kind,
            symbol.clone(),
            value,
            self.bounds,
            as_of,
        ))
    }
}
