//! 快照行的展示格式化，缺失值一律显示为 `-`。

const MISSING: &str = "-";
const MILLION: f64 = 1e6;
const BILLION: f64 = 1e9;
const TRILLION: f64 = 1e12;

pub fn price(value: Option<f64>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| format!("{:.2}", v))
}

/// 以百万为单位，例如 `12.34M`
pub fn millions(value: Option<f64>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| format!("{:.2}M", v / MILLION))
}

/// # Summary
/// 市值按量级选择 T/B/M 后缀。
pub fn market_cap(value: Option<f64>) -> String {
    match value {
        None => MISSING.to_string(),
        Some(v) if v.abs() >= TRILLION => format!("{:.2}T", v / TRILLION),
        Some(v) if v.abs() >= BILLION => format!("{:.2}B", v / BILLION),
        Some(v) => format!("{:.2}M", v / MILLION),
    }
}
