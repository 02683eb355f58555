use axum::Json;
use axum::extract::State;

use crate::server::AppState;
use crate::types::{ApiResponse, HealthResponse};

/// 健康检查
///
/// 返回最近发布的周期编号与发布时间，可用于判断扫描循环是否仍在推进。
#[utoipa::path(
    get,
    path = "/health",
    tag = "系统 (System)",
    responses(
        (status = 200, description = "服务存活", body = ApiResponse<HealthResponse>)
    )
)]
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let latest = state.store.latest();
    Json(ApiResponse::ok(HealthResponse {
        status: "ok".to_string(),
        cycle: latest.cycle,
        published_at: latest.published_at,
        symbols: latest.rows.len(),
    }))
}
