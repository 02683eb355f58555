use crate::decode;
use chrono::{DateTime, Utc};
use kizashi_core::common::Symbol;
use kizashi_core::signal::entity::{RawPayload, SignalContribution, SourceKind};
use kizashi_core::signal::error::SourceError;
use kizashi_core::signal::port::SignalSource;
use rust_decimal::Decimal;
use serde::Deserialize;

/// # Summary
/// 新闻情绪接口响应 (Finnhub `news-sentiment`)。
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct NewsSentimentPayload {
    sentiment: Option<SentimentBreakdown>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct SentimentBreakdown {
    bullish_percent: Option<f64>,
    bearish_percent: Option<f64>,
}

/// # Summary
/// 新闻情绪信号源。
///
/// # Invariants
/// - 极性 = 看多占比 - 看空占比。
/// - 极性严格大于阈值得 +1，严格小于负阈值得 -1，否则为 0。
pub struct NewsSource {
    threshold: f64,
}

impl NewsSource {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl SignalSource for NewsSource {
    fn kind(&self) -> SourceKind {
        SourceKind::News
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
        let parsed: NewsSentimentPayload = decode(payload)?;
        let (bullish, bearish) = parsed
            .sentiment
            .and_then(|s| Some((s.bullish_percent?, s.bearish_percent?)))
            .ok_or_else(|| SourceError::NoData(symbol.to_string()))?;

        let polarity = bullish - bearish;
        let vote = if polarity > self.threshold {
            Decimal::ONE
        } else if polarity < -self.threshold {
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn eval(payload: RawPayload) -> Result<SignalContribution, SourceError> {
        NewsSource::new(0.2).evaluate(&Symbol::from("PYPL"), &payload, Utc::now())
    }

    #[test]
    fn test_polarity_thresholds() {
        let bullish = json!({"sentiment": {"bullishPercent": 0.75, "bearishPercent": 0.25}});
        let bearish = json!({"sentiment": {"bullishPercent": 0.3, "bearishPercent": 0.7}});
        let flat = json!({"sentiment": {"bullishPercent": 0.55, "bearishPercent": 0.45}});
        assert_eq!(eval(bullish).unwrap().value, dec!(1));
        assert_eq!(eval(bearish).unwrap().value, dec!(-1));
        assert_eq!(eval(flat).unwrap().value, dec!(0));
    }

    #[test]
    fn test_threshold_is_exclusive() {
        // 极性恰好等于阈值不计为看多
        let edge = json!({"sentiment": {"bullishPercent": 0.75, "bearishPercent": 0.5}});
        let c = NewsSource::new(0.25).evaluate(&Symbol::from("A"), &edge, Utc::now());
        assert_eq!(c.unwrap().value, dec!(0));
    }

    #[test]
    fn test_missing_sentiment_is_no_data() {
        let empty = json!({"buzz": {}, "sectorAverageBullishPercent": 0.6});
        assert!(matches!(eval(empty), Err(SourceError::NoData(_))));
    }

    #[test]
    fn test_wrong_shape_is_malformed() {
        assert!(matches!(eval(json!([1, 2, 3])), Err(SourceError::Malformed(_))));
    }
}
