use crate::decode;
use chrono::{DateTime, Utc};
use kizashi_core::common::Symbol;
use kizashi_core::signal::entity::{
    QuoteSummary, RawPayload, SignalContribution, SourceDetail, SourceKind,
};
use kizashi_core::signal::error::SourceError;
use kizashi_core::signal::port::SignalSource;
use rust_decimal::Decimal;
use serde::Deserialize;

// Finnhub profile2 中股本与市值的单位均为百万
const MILLION: f64 = 1_000_000.0;

/// # Summary
/// 报价源的组合载荷：Yahoo 图表 + 可选的 Finnhub 公司概况。
#[derive(Deserialize, Debug)]
struct QuotePayload {
    chart: YahooResponse,
    #[serde(default)]
    profile: Option<CompanyProfile>,
}

/// # Summary
/// Yahoo v8 chart 接口响应。
#[derive(Deserialize, Debug)]
struct YahooResponse {
    chart: YahooChart,
}

#[derive(Deserialize, Debug)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
}

#[derive(Deserialize, Debug)]
struct YahooResult {
    meta: Option<YahooMeta>,
    indicators: YahooIndicators,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct YahooMeta {
    regular_market_price: Option<f64>,
    regular_market_volume: Option<f64>,
}

#[derive(Deserialize, Debug)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
}

#[derive(Deserialize, Debug)]
struct YahooQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct CompanyProfile {
    share_outstanding: Option<f64>,
    market_capitalization: Option<f64>,
}

impl QuotePayload {
    fn result(&self) -> Option<&YahooResult> {
        self.chart.chart.result.as_ref()?.first()
    }

    fn quote(&self) -> Option<&YahooQuote> {
        self.result()?.indicators.quote.first()
    }

    /// 窗口内全部非空收盘价
    fn closes(&self) -> Vec<f64> {
        self.quote()
            .map(|q| q.close.iter().flatten().copied().collect())
            .unwrap_or_default()
    }

    /// # Summary
    /// 提取展示字段。
    ///
    /// # Logic
    /// 1. 价格优先取 `regularMarketPrice`，缺失时退回最后一个收盘价。
    /// 2. 成交量同理，退回最后一个非空成交量。
    /// 3. 市值优先取公司概况，缺失时以价格 × 股本估算。
    fn summary(&self) -> QuoteSummary {
        let meta = self.result().and_then(|r| r.meta.as_ref());
        let price = meta
            .and_then(|m| m.regular_market_price)
            .or_else(|| self.closes().last().copied());
        let volume = meta.and_then(|m| m.regular_market_volume).or_else(|| {
            self.quote()
                .and_then(|q| q.volume.iter().rev().flatten().next().copied())
        });

        let shares_outstanding = self
            .profile
            .as_ref()
            .and_then(|p| p.share_outstanding)
            .map(|s| s * MILLION);
        let market_cap = self
            .profile
            .as_ref()
            .and_then(|p| p.market_capitalization)
            .map(|m| m * MILLION)
            .or_else(|| Some(price? * shares_outstanding?));

        QuoteSummary {
            price,
            volume,
            shares_outstanding,
            market_cap,
        }
    }
}

/// # Summary
/// 报价动量信号源。
///
/// # Invariants
/// - 比较窗口内首个与最后一个收盘价的涨跌幅。
/// - 涨幅严格大于阈值得 +1，跌幅严格大于阈值得 -1，否则为 0。
/// - 驱动因子平局时优先级最低。
pub struct QuoteSource {
    threshold_pct: f64,
}

impl QuoteSource {
    pub fn new(threshold_pct: f64) -> Self {
        Self { threshold_pct }
    }
}

impl SignalSource for QuoteSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Quote
    }

    fn bounds(&self) -> (Decimal, Decimal) {
        (Decimal::NEGATIVE_ONE, Decimal::ONE)
    }

    fn evaluate(
        &self,
        symbol: &Symbol,
        payload: &RawPayload,
        as_of: DateTime<Utc>,
    ) -> Result<SignalContribution, SourceError> {
        let parsed: QuotePayload = decode(payload)?;
        let closes = parsed.closes();
        let (first, last) = match (closes.first(), closes.last()) {
            (Some(&first), Some(&last)) if closes.len() >= 2 && first > 0.0 => (first, last),
            _ => return Err(SourceError::NoData(symbol.to_string())),
        };

        let change_pct = (last - first) / first * 100.0;
        let vote = if change_pct > self.threshold_pct {
            Decimal::ONE
        } else if change_pct < -self.threshold_pct {
            Decimal::NEGATIVE_ONE
        } else {
            Decimal::ZERO
        };

        Ok(SignalContribution::bounded(
            self.kind(),
            symbol.clone(),
            vote,
            self.bounds(),
            as_of,
        ))
    }

    fn detail(&self, payload: &RawPayload, _as_of: DateTime<Utc>) -> Option<SourceDetail> {
        let parsed: QuotePayload = decode(payload).ok()?;
        Some(SourceDetail::Quote(parsed.summary()))
    }
}
