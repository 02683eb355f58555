use crate::http::{build_client, send_json};
use crate::window::shift_days;
use async_trait::async_trait;
use kizashi_core::common::Symbol;
use kizashi_core::common::time::TimeProvider;
use kizashi_core::signal::entity::{RawPayload, SourceKind, SourceScope};
use kizashi_core::signal::error::FetchError;
use kizashi_core::signal::port::SignalFeed;
use reqwest::Client;
use std::sync::Arc;

const BASE_URL: &str = "https://api.tradingeconomics.com";

/// # Summary
/// TradingEconomics 经济日历抓取器 (全局)。
///
/// # Invariants
/// - 使用 HTTP Basic 认证。
/// - 请求范围为 `[today, today + window]`，窗口内精确过滤由宏观求值器完成。
pub struct TradingEconomicsFeed {
    client: Client,
    base_url: String,
    user: String,
    pass: String,
    countries: Vec<String>,
    clock: Arc<dyn TimeProvider>,
    window_days: i64,
}

impl TradingEconomicsFeed {
    pub fn new(
        user: impl Into<String>,
        pass: impl Into<String>,
        countries: Vec<String>,
        clock: Arc<dyn TimeProvider>,
        window_days: i64,
    ) -> Result<Self, FetchError> {
        Ok(Self {
            client: build_client()?,
            base_url: BASE_URL.to_string(),
            user: user.into(),
            pass: pass.into(),
            countries,
            clock,
            window_days,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// # Summary
    /// 拼出日历查询地址：`/calendar/country/{countries}/{from}/{to}`。
    pub fn calendar_url(&self) -> Result<String, FetchError> {
        let today = self.clock.now().date_naive();
        let to = shift_days(today, self.window_days)?;
        Ok(format!(
            "{}/calendar/country/{}/{}/{}",
            self.base_url,
            self.countries.join(","),
            today.format("%Y-%m-%d"),
            to.format("%Y-%m-%d"),
        ))
    }
}

#[async_trait]
impl SignalFeed for TradingEconomicsFeed {
    fn kind(&self) -> SourceKind {
        SourceKind::Macro
    }

    fn scope(&self) -> SourceScope {
        SourceScope::Global
    }

    async fn fetch(&self, _symbol: Option<&Symbol>) -> Result<RawPayload, FetchError> {
        if self.countries.is_empty() {
            return Err(FetchError::Unavailable("no macro countries configured".into()));
        }
        let request = self
            .client
            .get(self.calendar_url()?)
            .basic_auth(&self.user, Some(&self.pass))
            .query(&[("format", "json")]);
        send_json(request).await
    }
}
