//! # `kizashi-feed` - 上游数据抓取适配器
//!
//! 每个 `SignalFeed` 实现只负责 HTTP 调用并返回原始 JSON 载荷，
//! 解释工作留给 `kizashi-signal` 中对应的求值器。

pub mod finnhub;
pub mod http;
pub mod static_feed;
pub mod trading_economics;
pub mod window;
pub mod yahoo;
