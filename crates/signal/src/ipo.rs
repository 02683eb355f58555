use crate::decode;
use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use kizashi_core::common::Symbol;
use kizashi_core::signal::entity::{RawPayload, SignalContribution, SourceKind};
use kizashi_core::signal::error::SourceError;
use kizashi_core::signal::port::SignalSource;
use rust_decimal::Decimal;
use serde::Deserialize;

/// # Summary
/// IPO 日历接口响应 (Finnhub `calendar/ipo`)。
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct IpoCalendarPayload {
    ipo_calendar: Vec<IpoRecord>,
}

#[derive(Deserialize, Debug)]
struct IpoRecord {
    date: Option<String>,
    symbol: Option<String>,
}

/// # Summary
/// IPO 日历信号源 (全局抓取，逐标的求值)。
///
/// # Invariants
/// - 标的在回溯窗口 `[as_of - window, as_of]` 内出现在日历中得 +1，否则为 0。
/// - 日期无法解析的记录被忽略。
pub struct IpoSource {
    window_days: i64,
}

impl IpoSource {
    pub fn new(window_days: i64) -> Self {
        Self { window_days }
    }
}

impl SignalSource for IpoSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Ipo
    }

    fn bounds(&self) -> (Decimal, Decimal) {
        (Decimal::ZERO, Decimal::ONE)
    }

    fn evaluate(
        &self,
        symbol: &Symbol,
        payload: &RawPayload,
        as_of: DateTime<Utc>,
    ) -> Result<SignalContribution, SourceError> {
        let parsed: IpoCalendarPayload = decode(payload)?;
        let today = as_of.date_naive();
        let window_start = TimeDelta::try_days(self.window_days)
            .and_then(|w| today.checked_sub_signed(w))
            .ok_or_else(|| {
                SourceError::Malformed(format!("ipo window of {} days", self.window_days))
            })?;

        let listed = parsed.ipo_calendar.iter().any(|r| {
            let matches_symbol = r
                .symbol
                .as_deref()
                .is_some_and(|s| s.eq_ignore_ascii_case(symbol.as_str()));
            let in_window = r
                .date
                .as_deref()
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
                .is_some_and(|d| d >= window_start && d <= today);
            matches_symbol && in_window
        });

        let vote = if listed { Decimal::ONE } else { Decimal::ZERO };
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
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn payload() -> RawPayload {
        json!({"ipoCalendar": [
            {"date": "2025-07-01", "exchange": "NASDAQ", "name": "Arm Holdings", "symbol": "ARM", "status": "priced"},
            {"date": "2025-03-02", "exchange": "NYSE", "name": "Old Co", "symbol": "OLDC", "status": "priced"},
            {"date": "2025-07-10", "exchange": "NYSE", "name": "Unnamed", "symbol": null, "status": "expected"}
        ]})
    }

    #[test]
    fn test_symbol_in_window_scores_one() {
        let as_of = Utc.with_ymd_and_hms(2025, 7, 16, 12, 0, 0).unwrap();
        let source = IpoSource::new(30);
        let arm = source.evaluate(&Symbol::from("ARM"), &payload(), as_of).unwrap();
        let nvda = source.evaluate(&Symbol::from("NVDA"), &payload(), as_of).unwrap();
        assert_eq!(arm.value, dec!(1));
        assert_eq!(nvda.value, dec!(0));
    }

    #[test]
    fn test_listing_outside_window_scores_zero() {
        let as_of = Utc.with_ymd_and_hms(2025, 7, 16, 12, 0, 0).unwrap();
        let c = IpoSource::new(30)
            .evaluate(&Symbol::from("OLDC"), &payload(), as_of)
            .unwrap();
        assert_eq!(c.value, dec!(0));
    }

    #[test]
    fn test_unrepresentable_window_is_error_not_panic() {
        let as_of = Utc.with_ymd_and_hms(2025, 7, 16, 12, 0, 0).unwrap();
        let result = IpoSource::new(i64::MAX).evaluate(&Symbol::from("ARM"), &payload(), as_of);
        assert!(matches!(result, Err(SourceError::Malformed(_))));
    }
}
