//! # `kizashi-core` - 领域核心
//!
//! 定义信号扫描系统的实体、错误枚举与端口 (Trait)。
//! 本 crate 不包含任何 I/O 实现，所有适配器 crate 仅依赖此处的抽象。

pub mod cache;
pub mod common;
pub mod config;
pub mod notify;
pub mod score;
pub mod signal;
