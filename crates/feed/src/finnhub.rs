use crate::http::{build_client, send_json};
use crate::window::shift_days;
use async_trait::async_trait;
use chrono::NaiveDate;
use kizashi_core::common::Symbol;
use kizashi_core::common::time::TimeProvider;
use kizashi_core::signal::entity::{RawPayload, SourceKind, SourceScope};
use kizashi_core::signal::error::FetchError;
use kizashi_core::signal::port::SignalFeed;
use reqwest::Client;
use std::sync::Arc;

const BASE_URL: &str = "https://finnhub.io/api/v1";

/// # Summary
/// Finnhub REST 客户端，新闻情绪、财报日历、IPO 日历与公司概况共用。
///
/// # Invariants
/// - 每个请求都携带 `token` 查询参数。
#[derive(Clone)]
pub struct FinnhubClient {
    client: Client,
    base_url: String,
    token: String,
}

impl FinnhubClient {
    pub fn new(token: impl Into<String>) -> Result<Self, FetchError> {
        Self::with_base_url(BASE_URL, token)
    }

    /// 指定接口根地址，便于指向代理或测试桩
    pub fn with_base_url(
        base_url: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, FetchError> {
        Ok(Self {
            client: build_client()?,
            base_url: base_url.into(),
            token: token.into(),
        })
    }

    /// # Summary
    /// 以 GET 调用某个接口。
    ///
    /// # Arguments
    /// * `path`: 相对路径，例如 `news-sentiment`。
    /// * `query`: 除 token 外的查询参数。
    pub async fn get(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<RawPayload, FetchError> {
        let url = format!("{}/{}", self.base_url, path);
        let request = self
            .client
            .get(&url)
            .query(query)
            .query(&[("token", self.token.as_str())]);
        send_json(request).await
    }

    /// 公司概况 (`stock/profile2`)，股本与市值单位为百万
    pub async fn profile(&self, symbol: &Symbol) -> Result<RawPayload, FetchError> {
        self.get("stock/profile2", &[("symbol", symbol.to_string())])
            .await
    }
}

fn ymd(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn require_symbol(symbol: Option<&Symbol>, kind: SourceKind) -> Result<&Symbol, FetchError> {
    symbol.ok_or_else(|| FetchError::Unavailable(format!("{} feed needs a symbol", kind)))
}

/// # Summary
/// 个股新闻情绪 (`news-sentiment`)。
pub struct FinnhubNewsFeed {
    api: FinnhubClient,
}

impl FinnhubNewsFeed {
    pub fn new(api: FinnhubClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl SignalFeed for FinnhubNewsFeed {
    fn kind(&self) -> SourceKind {
        SourceKind::News
    }

    fn scope(&self) -> SourceScope {
        SourceScope::PerSymbol
    }

    async fn fetch(&self, symbol: Option<&Symbol>) -> Result<RawPayload, FetchError> {
        let symbol = require_symbol(symbol, self.kind())?;
        self.api
            .get("news-sentiment", &[("symbol", symbol.to_string())])
            .await
    }
}

/// # Summary
/// 个股财报日历 (`calendar/earnings`)，回溯 `lookback_days` 天。
pub struct FinnhubEarningsFeed {
    api: FinnhubClient,
    clock: Arc<dyn TimeProvider>,
    lookback_days: i64,
}

impl FinnhubEarningsFeed {
    pub fn new(api: FinnhubClient, clock: Arc<dyn TimeProvider>, lookback_days: i64) -> Self {
        Self {
            api,
            clock,
            lookback_days,
        }
    }
}

#[async_trait]
impl SignalFeed for FinnhubEarningsFeed {
    fn kind(&self) -> SourceKind {
        SourceKind::Earnings
    }

    fn scope(&self) -> SourceScope {
        SourceScope::PerSymbol
    }

    async fn fetch(&self, symbol: Option<&Symbol>) -> Result<RawPayload, FetchError> {
        let symbol = require_symbol(symbol, self.kind())?;
        let today = self.clock.now().date_naive();
        let from = shift_days(today, -self.lookback_days)?;
        self.api
            .get(
                "calendar/earnings",
                &[
                    ("from", ymd(from)),
                    ("to", ymd(today)),
                    ("symbol", symbol.to_string()),
                ],
            )
            .await
    }
}

/// # Summary
/// IPO 日历 (`calendar/ipo`)，全局抓取，覆盖回溯窗口。
pub struct FinnhubIpoFeed {
    api: FinnhubClient,
    clock: Arc<dyn TimeProvider>,
    window_days: i64,
}

impl FinnhubIpoFeed {
    pub fn new(api: FinnhubClient, clock: Arc<dyn TimeProvider>, window_days: i64) -> Self {
        Self {
            api,
            clock,
            window_days,
        }
    }
}

#[async_trait]
impl SignalFeed for FinnhubIpoFeed {
    fn kind(&self) -> SourceKind {
        SourceKind::Ipo
    }

    fn scope(&self) -> SourceScope {
        SourceScope::Global
    }

    async fn fetch(&self, _symbol: Option<&Symbol>) -> Result<RawPayload, FetchError> {
        let today = self.clock.now().date_naive();
        let from = shift_days(today, -self.window_days)?;
        self.api
            .get("calendar/ipo", &[("from", ymd(from)), ("to", ymd(today))])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use kizashi_core::common::time::FakeClockProvider;

    fn api() -> FinnhubClient {
        kizashi_core::common::tls::install_crypto_provider();
        FinnhubClient::with_base_url("http://127.0.0.1:9", "demo").unwrap()
    }

    #[test]
    fn test_feed_scopes() {
        let clock = Arc::new(FakeClockProvider::new(
            Utc.with_ymd_and_hms(2025, 7, 16, 0, 0, 0).unwrap(),
        ));
        assert_eq!(FinnhubNewsFeed::new(api()).scope(), SourceScope::PerSymbol);
        assert_eq!(
            FinnhubEarningsFeed::new(api(), clock.clone(), 120).scope(),
            SourceScope::PerSymbol
        );
        let ipo = FinnhubIpoFeed::new(api(), clock, 30);
        assert_eq!(ipo.scope(), SourceScope::Global);
        assert_eq!(ipo.kind(), SourceKind::Ipo);
    }

    #[tokio::test]
    async fn test_per_symbol_feed_rejects_missing_symbol() {
        let result = FinnhubNewsFeed::new(api()).fetch(None).await;
        assert!(matches!(result, Err(FetchError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let result = FinnhubNewsFeed::new(api())
            .fetch(Some(&Symbol::from("AAPL")))
            .await;
        assert!(matches!(
            result,
            Err(FetchError::Network(_) | FetchError::Timeout(_))
        ));
    }

    /// # Summary
    /// 窗口超出日期范围时在发请求前失败，不 panic。
    #[tokio::test]
    async fn test_unrepresentable_window_fails_before_request() {
        let clock = Arc::new(FakeClockProvider::new(
            Utc.with_ymd_and_hms(2025, 7, 16, 0, 0, 0).unwrap(),
        ));
        let ipo = FinnhubIpoFeed::new(api(), clock.clone(), 1_000_000_000);
        assert!(matches!(ipo.fetch(None).await, Err(FetchError::Unavailable(_))));

        let earnings = FinnhubEarningsFeed::new(api(), clock, i64::MAX);
        let result = earnings.fetch(Some(&Symbol::from("AAPL"))).await;
        assert!(matches!(result, Err(FetchError::Unavailable(_))));
    }
}
