//! # API 统一错误处理
//!
//! 查询接口只有两类失败：标的不在观察列表中，或过滤参数无法识别。

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::types::ApiErrorResponse;

#[derive(Error, Debug)]
pub enum ApiError {
    /// 404
    #[error("symbol {0} is not on the watch-list")]
    UnknownSymbol(String),

    /// 400
    #[error("unknown sentiment filter: {0}")]
    UnknownSentiment(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::UnknownSymbol(_) => StatusCode::NOT_FOUND,
            ApiError::UnknownSentiment(_) => StatusCode::BAD_REQUEST,
        };
        (status, Json(ApiErrorResponse::from_msg(self.to_string()))).into_response()
    }
}
