//! # `kizashi-api` - 只读 HTTP API
//!
//! 使用 `axum` 构建路由，通过 `utoipa` 自动生成 OpenAPI 3.0 Swagger 文档。
//!
//! ## 架构职责
//! - 读取 `SnapshotStore` 中最新发布的快照
//! - 将快照、单个标的行与本周期告警以统一的 JSON 包装返回
//! - 不修改任何扫描状态

pub mod error;
pub mod routes;
pub mod server;
pub mod types;
