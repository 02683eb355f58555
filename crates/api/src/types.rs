//! # DTO (Data Transfer Object) 层
//!
//! 快照相关实体已派生 `ToSchema`，直接作为响应体；这里只定义包装器与少量专用 DTO。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

// ============================================================
//  通用响应 DTO
// ============================================================

/// 统一 API 响应包装器
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T: Serialize + ToSchema> {
    /// 是否成功
    pub success: bool,
    /// 数据载荷 (成功时)
    pub data: Option<T>,
    /// 错误信息 (失败时)
    pub error: Option<String>,
}

impl<T: Serialize + ToSchema> ApiResponse<T> {
    /// 构建成功响应
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// 构建失败响应 (不含泛型载荷)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 固定为 false
    pub success: bool,
    /// 错误描述信息
    pub error: String,
}

impl ApiErrorResponse {
    /// 从错误信息构建
    pub fn from_msg(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: msg.into(),
        }
    }
}

// ============================================================
//  快照查询 DTO
// ============================================================

/// 快照列表过滤参数
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct SnapshotQuery {
    /// 只返回该情绪标签的行 (bullish / bearish / neutral / unavailable)
    #[param(example = "bullish")]
    pub sentiment: Option<String>,
}

/// 健康检查响应
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// 固定为 "ok"
    #[schema(example = "ok")]
    pub status: String,
    /// 最近发布的周期编号，0 表示尚未发布
    #[schema(example = 42)]
    pub cycle: u64,
    /// 最近发布时间
    pub published_at: DateTime<Utc>,
    /// 快照行数
    #[schema(example = 10)]
    pub symbols: usize,
}
