use crate::decode;
use chrono::{DateTime, NaiveDate, Utc};
use kizashi_core::common::Symbol;
use kizashi_core::signal::entity::{RawPayload, SignalContribution, SourceKind};
use kizashi_core::signal::error::SourceError;
use kizashi_core::signal::port::SignalSource;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::cmp::Ordering;

/// # Summary
/// 财报日历接口响应 (Finnhub `calendar/earnings`)。
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct EarningsCalendarPayload {
    earnings_calendar: Vec<EarningsRecord>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct EarningsRecord {
    date: String,
    symbol: String,
    eps_actual: Option<f64>,
    eps_estimate: Option<f64>,
}

/// # Summary
/// 财报超预期信号源。
///
/// # Invariants
/// - 只看评估日之前 (含当日) 最近一期同时具备实际值与预期值的记录。
/// - 实际 EPS 高于预期得 +1，低于得 -1，相等为 0。
pub struct EarningsSource;

impl SignalSource for EarningsSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Earnings
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
        let parsed: EarningsCalendarPayload = decode(payload)?;
        let today = as_of.date_naive();

        let latest = parsed
            .earnings_calendar
            .iter()
            .filter(|r| r.symbol.eq_ignore_ascii_case(symbol.as_str()))
            .filter_map(|r| {
                let date = NaiveDate::parse_from_str(&r.date, "%Y-%m-%d").ok()?;
                Some((date, r.eps_actual?, r.eps_estimate?))
            })
            .filter(|(date, _, _)| *date <= today)
            .max_by_key(|(date, _, _)| *date)
            .ok_or_else(|| SourceError::NoData(symbol.to_string()))?;

        let (_, actual, estimate) = latest;
        let vote = match actual.partial_cmp(&estimate) {
            Some(Ordering::Greater) => Decimal::ONE,
            Some(Ordering::Less) => Decimal::NEGATIVE_ONE,
            Some(Ordering::Equal) => Decimal::ZERO,
            None => return Err(SourceError::Malformed("EPS is not a number".into())),
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
