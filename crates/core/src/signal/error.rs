use std::time::Duration;
use thiserror::Error;

/// # Summary
/// 上游不可达错误：网络、超时、鉴权或 HTTP 状态失败。
///
/// # Invariants
/// - 只在信号源/缓存边界内处理，绝不中止整个评估周期。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    // 网络层错误
    #[error("Network error: {0}")]
    Network(String),
    // 单次抓取超时
    #[error("Timed out after {0:?}")]
    Timeout(Duration),
    // 凭证缺失或被拒绝
    #[error("Auth error: {0}")]
    Auth(String),
    // 非成功状态码
    #[error("HTTP status {0}")]
    Status(u16),
    // 响应体无法读取为 JSON
    #[error("Decode error: {0}")]
    Decode(String),
    // 抓取任务未能执行 (并发闸门关闭等)
    #[error("Unavailable: {0}")]
    Unavailable(String),
}

/// # Summary
/// 上游可达但载荷不可用的错误。
///
/// # Invariants
/// - 聚合器视其为"本周期无贡献"，而非零票。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    // 载荷结构不符合预期
    #[error("Malformed payload: {0}")]
    Malformed(String),
    // 载荷合法但不含该标的可用数据
    #[error("No data for {0}")]
    NoData(String),
}
