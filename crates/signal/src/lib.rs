//! # `kizashi-signal` - 信号源求值
//!
//! 每个来源类别一个 `SignalSource` 实现：把上游原始载荷映射为有界贡献值。
//! 本 crate 不做任何 I/O，全部逻辑可在单元测试中以固定载荷验证。

pub mod earnings;
pub mod ipo;
pub mod macro_risk;
pub mod manual;
pub mod news;
pub mod quote;

use kizashi_core::config::SourcesConfig;
use kizashi_core::signal::entity::{RawPayload, SourceKind};
use kizashi_core::signal::error::SourceError;
use kizashi_core::signal::port::SignalSource;
use serde::Deserialize;
use std::sync::Arc;

/// # Summary
/// 按来源类别构造求值器。
///
/// # Arguments
/// * `kind`: 来源类别。
/// * `config`: 信号源参数 (阈值、时间窗口)。
pub fn build_source(kind: SourceKind, config: &SourcesConfig) -> Arc<dyn SignalSource> {
    match kind {
        SourceKind::News => Arc::new(news::NewsSource::new(config.news_threshold)),
        SourceKind::Earnings => Arc::new(earnings::EarningsSource),
        SourceKind::Ipo => Arc::new(ipo::IpoSource::new(config.ipo_window_days)),
        SourceKind::Macro => Arc::new(macro_risk::MacroRiskSource::new(config.macro_window_days)),
        SourceKind::Quote => Arc::new(quote::QuoteSource::new(config.quote_threshold_pct)),
        SourceKind::Options | SourceKind::Cot | SourceKind::Geo => {
            Arc::new(manual::ManualSource::new(kind))
        }
    }
}

/// 将原始载荷解码为来源自身的结构，失败映射为 `SourceError::Malformed`。
pub(crate) fn decode<'a, T: Deserialize<'a>>(payload: &'a RawPayload) -> Result<T, SourceError> {
    T::deserialize(payload).map_err(|e| SourceError::Malformed(e.to_string()))
}
