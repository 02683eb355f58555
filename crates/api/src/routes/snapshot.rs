use axum::Json;
use axum::extract::{Path, Query, State};

use kizashi_core::score::entity::{AlertEvent, Sentiment, Snapshot, SnapshotRow};

use crate::error::ApiError;
use crate::server::AppState;
use crate::types::{ApiErrorResponse, ApiResponse, SnapshotQuery};

/// # Summary
/// 解析情绪过滤参数 (大小写不敏感)。
fn parse_sentiment(raw: &str) -> Result<Sentiment, ApiError> {
    match raw.to_ascii_lowercase().as_str() {
        "bullish" => Ok(Sentiment::Bullish),
        "bearish" => Ok(Sentiment::Bearish),
        "neutral" => Ok(Sentiment::Neutral),
        "unavailable" => Ok(Sentiment::Unavailable),
        _ => Err(ApiError::UnknownSentiment(raw.to_string())),
    }
}

/// 获取最新快照
///
/// # Logic
/// 1. 读取最新发布的快照 (周期 0 表示首个周期尚未完成)。
/// 2. 若给出 `sentiment` 参数，只保留该标签的行，告警与宏观事件原样返回。
#[utoipa::path(
    get,
    path = "/api/v1/snapshot",
    tag = "快照 (Snapshot)",
    params(SnapshotQuery),
    responses(
        (status = 200, description = "最新快照", body = ApiResponse<Snapshot>),
        (status = 400, description = "未知的情绪标签", body = ApiErrorResponse)
    )
)]
pub async fn get_snapshot(
    State(state): State<AppState>,
    Query(query): Query<SnapshotQuery>,
) -> Result<Json<ApiResponse<Snapshot>>, ApiError> {
    let latest = state.store.latest();
    let Some(raw) = query.sentiment else {
        return Ok(Json(ApiResponse::ok(latest.as_ref().clone())));
    };

    let wanted = parse_sentiment(&raw)?;
    let mut snapshot = latest.as_ref().clone();
    snapshot.rows.retain(|row| row.sentiment == wanted);
    Ok(Json(ApiResponse::ok(snapshot)))
}

/// 获取单个标的的快照行
#[utoipa::path(
    get,
    path = "/api/v1/snapshot/{symbol}",
    tag = "快照 (Snapshot)",
    params(
        ("symbol" = String, Path, description = "股票代码，如 AAPL (大小写不敏感)")
    ),
    responses(
        (status = 200, description = "标的评分行", body = ApiResponse<SnapshotRow>),
        (status = 404, description = "标的不在观察列表中", body = ApiErrorResponse)
    )
)]
pub async fn get_symbol_row(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<ApiResponse<SnapshotRow>>, ApiError> {
    let latest = state.store.latest();
    let row = latest
        .row(&symbol)
        .cloned()
        .ok_or(ApiError::UnknownSymbol(symbol))?;
    Ok(Json(ApiResponse::ok(row)))
}

/// 获取最新周期产生的告警
#[utoipa::path(
    get,
    path = "/api/v1/alerts",
    tag = "快照 (Snapshot)",
    responses(
        (status = 200, description = "最新周期的评分变动告警", body = ApiResponse<Vec<AlertEvent>>)
    )
)]
pub async fn get_alerts(State(state): State<AppState>) -> Json<ApiResponse<Vec<AlertEvent>>> {
    Json(ApiResponse::ok(state.store.latest().alerts.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sentiment_is_case_insensitive() {
        assert_eq!(parse_sentiment("Bullish").unwrap(), Sentiment::Bullish);
        assert_eq!(parse_sentiment("bearish").unwrap(), Sentiment::Bearish);
        assert!(matches!(parse_sentiment("sideways"), Err(ApiError::UnknownSentiment(_))));
    }
}
