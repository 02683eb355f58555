use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use kizashi_core::signal::error::FetchError;

/// # Summary
/// 请求窗口的日期偏移。
///
/// # Logic
/// 1. 正数向后、负数向前偏移 `days` 天。
/// 2. 超出 chrono 可表示范围时返回 `FetchError::Unavailable`，不 panic。
pub fn shift_days(date: NaiveDate, days: i64) -> Result<NaiveDate, FetchError> {
    TimeDelta::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .ok_or_else(|| out_of_range(format!("{} days from {}", days, date)))
}

/// 向前回溯 `seconds` 秒，溢出时同 `shift_days`
pub fn rewind_seconds(end: DateTime<Utc>, seconds: i64) -> Result<DateTime<Utc>, FetchError> {
    TimeDelta::try_seconds(seconds)
        .and_then(|delta| end.checked_sub_signed(delta))
        .ok_or_else(|| out_of_range(format!("{} seconds before {}", seconds, end)))
}

fn out_of_range(what: String) -> FetchError {
    FetchError::Unavailable(format!("request window out of range: {}", what))
}
