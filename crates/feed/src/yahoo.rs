use crate::finnhub::FinnhubClient;
use crate::http::{build_client, send_json};
use async_trait::async_trait;
use crate::window::rewind_seconds;
use kizashi_core::common::time::TimeProvider;
use kizashi_core::common::{Symbol, TimeFrame};
use kizashi_core::signal::entity::{RawPayload, SourceKind, SourceScope};
use kizashi_core::signal::error::FetchError;
use kizashi_core::signal::port::SignalFeed;
use reqwest::Client;
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// # Summary
/// Yahoo Finance 报价抓取器。
///
/// # Invariants
/// - 载荷形如 `{"chart": <Yahoo chart 响应>, "profile": <Finnhub profile2 或 null>}`。
/// - 图表是主数据，失败即整体失败；公司概况是附加数据，失败只记录日志。
pub struct YahooQuoteFeed {
    client: Client,
    base_url: String,
    profile: Option<FinnhubClient>,
    clock: Arc<dyn TimeProvider>,
    timeframe: TimeFrame,
    lookback_bars: u32,
}

impl YahooQuoteFeed {
    /// # Summary
    /// 创建报价抓取器。
    ///
    /// # Arguments
    /// * `profile`: 可选的 Finnhub 客户端，用于补充股本与市值。
    /// * `timeframe`: K 线粒度。
    /// * `lookback_bars`: 回溯的 K 线根数，决定动量窗口长度。
    pub fn new(
        profile: Option<FinnhubClient>,
        clock: Arc<dyn TimeProvider>,
        timeframe: TimeFrame,
        lookback_bars: u32,
    ) -> Result<Self, FetchError> {
        Ok(Self {
            client: build_client()?,
            base_url: CHART_URL.to_string(),
            profile,
            clock,
            timeframe,
            lookback_bars,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// # Summary
    /// 计算请求参数。
    ///
    /// # Logic
    /// 1. 映射 TimeFrame 为 Yahoo 识别的 interval。
    /// 2. 起点 = 当前时间 - 回溯根数 × 周期秒数。
    pub fn chart_query(&self, symbol: &Symbol) -> Result<Vec<(&'static str, String)>, FetchError> {
        let interval = match self.timeframe {
            TimeFrame::Minute1 => "1m",
            TimeFrame::Minute5 => "5m",
            TimeFrame::Minute15 => "15m",
            TimeFrame::Hour1 => "60m",
            TimeFrame::Day1 => "1d",
        };
        let end = self.clock.now();
        let span = self.timeframe.seconds() * i64::from(self.lookback_bars);
        let start = rewind_seconds(end, span)?;

        Ok(vec![
            ("symbol", symbol.to_string()),
            ("period1", start.timestamp().to_string()),
            ("period2", end.timestamp().to_string()),
            ("interval", interval.to_string()),
        ])
    }
}

#[async_trait]
impl SignalFeed for YahooQuoteFeed {
    fn kind(&self) -> SourceKind {
        SourceKind::Quote
    }

    fn scope(&self) -> SourceScope {
        SourceScope::PerSymbol
    }

    async fn fetch(&self, symbol: Option<&Symbol>) -> Result<RawPayload, FetchError> {
        let symbol =
            symbol.ok_or_else(|| FetchError::Unavailable("quote feed needs a symbol".into()))?;
        let url = format!("{}/{}", self.base_url, symbol);
        let request = self.client.get(&url).query(&self.chart_query(symbol)?);
        let chart = send_json(request).await?;

        let profile = match &self.profile {
            Some(api) => match api.profile(symbol).await {
                Ok(p) => p,
                Err(e) => {
                    warn!("profile fetch failed for {}: {}", symbol, e);
                    RawPayload::Null
                }
            },
            None => RawPayload::Null,
        };

        Ok(json!({ "chart": chart, "profile": profile }))
    }
}
