use crate::decode;
use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use kizashi_core::common::Symbol;
use kizashi_core::signal::entity::{
    MacroEvent, RawPayload, SignalContribution, SourceDetail, SourceKind,
};
use kizashi_core::signal::error::SourceError;
use kizashi_core::signal::port::SignalSource;
use rust_decimal::Decimal;
use serde::Deserialize;

// 高重要度事件扣 1 分
const HIGH_IMPORTANCE: u8 = 3;
// 中重要度事件扣 0.5 分
const MEDIUM_IMPORTANCE: u8 = 2;

/// # Summary
/// 宏观日历单条记录 (TradingEconomics `calendar`)。
#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct CalendarRecord {
    #[serde(alias = "date")]
    date: Option<String>,
    #[serde(alias = "country")]
    country: Option<String>,
    #[serde(alias = "event")]
    event: Option<String>,
    #[serde(alias = "importance")]
    importance: Option<u8>,
}

/// # Summary
/// 宏观风险信号源 (全局抓取，对所有标的施加同一惩罚)。
///
/// # Invariants
/// - 只统计 `[as_of, as_of + window]` 内的事件。
/// - 惩罚 = -1 × 高重要度数量 - 0.5 × 中重要度数量，裁剪到 [-2, 0]。
pub struct MacroRiskSource {
    window_days: i64,
}

impl MacroRiskSource {
    pub fn new(window_days: i64) -> Self {
        Self { window_days }
    }

    /// # Summary
    /// 解析并过滤出前瞻窗口内的事件，按时间升序。
    ///
    /// # Logic
    /// 1. 载荷必须是事件数组，否则视为格式错误。
    /// 2. 缺少日期或重要度、日期无法解析的记录被跳过。
    /// 3. 窗口超出可表示的时间范围时返回格式错误，不 panic。
    fn upcoming(
        &self,
        payload: &RawPayload,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<MacroEvent>, SourceError> {
        let records: Vec<CalendarRecord> = decode(payload)?;
        let horizon = TimeDelta::try_days(self.window_days)
            .and_then(|w| as_of.checked_add_signed(w))
            .ok_or_else(|| {
                SourceError::Malformed(format!("macro window of {} days", self.window_days))
            })?;

        let mut events: Vec<MacroEvent> = records
            .into_iter()
            .filter_map(|r| {
                let date = parse_calendar_date(r.date.as_deref()?)?;
                Some(MacroEvent {
                    date,
                    country: r.country.unwrap_or_default(),
                    event: r.event.unwrap_or_default(),
                    importance: r.importance?,
                })
            })
            .filter(|e| e.date >= as_of && e.date <= horizon)
            .collect();
        events.sort_by_key(|e| e.date);
        Ok(events)
    }
}

/// 日历时间不带时区时按 UTC 解释。
fn parse_calendar_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|n| n.and_utc())
}

impl SignalSource for MacroRiskSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Macro
    }

    fn bounds(&self) -> (Decimal, Decimal) {
        (Decimal::from(-2), Decimal::ZERO)
    }

    fn evaluate(
        &self,
        symbol: &Symbol,
        payload: &RawPayload,
        as_of: DateTime<Utc>,
    ) -> Result<SignalContribution, SourceError> {
        let events = self.upcoming(payload, as_of)?;
        let high = events.iter().filter(|e| e.importance == HIGH_IMPORTANCE).count();
        let medium = events.iter().filter(|e| e.importance == MEDIUM_IMPORTANCE).count();

        let penalty = -Decimal::from(high) - Decimal::new(5, 1) * Decimal::from(medium);
        Ok(SignalContribution::bounded(
            self.kind(),
            symbol.clone(),
            penalty,
            self.bounds(),
            as_of,
        ))
    }

    fn detail(&self, payload: &RawPayload, as_of: DateTime<Utc>) -> Option<SourceDetail> {
        self.upcoming(payload, as_of)
            .ok()
            .map(SourceDetail::MacroCalendar)
    }
}
