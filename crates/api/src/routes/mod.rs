//! # 路由控制器

pub mod health;
pub mod snapshot;
