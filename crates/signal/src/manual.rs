use crate::decode;
use chrono::{DateTime, Utc};
use kizashi_core::common::Symbol;
use kizashi_core::config::ManualBias;
use kizashi_core::signal::entity::{RawPayload, SignalContribution, SourceKind};
use kizashi_core::signal::error::SourceError;
use kizashi_core::signal::port::SignalSource;
use rust_decimal::Decimal;

/// # Summary
/// 人工偏向信号源 (期权、COT、地缘)。
///
/// # Invariants
/// - 载荷为 `ManualBias` 列表，只看与自身类别相同的项。
/// - 按声明顺序取首个覆盖该标的的项；`symbols` 缺省表示覆盖全部标的。
/// - 无匹配项时返回 `NoData`，该来源不参与本周期。
pub struct ManualSource {
    kind: SourceKind,
}

impl ManualSource {
    pub fn new(kind: SourceKind) -> Self {
        Self { kind }
    }
}

impl SignalSource for ManualSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn bounds(&self) -> (Decimal, Decimal) {
        (Decimal::NEGATIVE_ONE, Decimal::ONE)
    }

    fn evaluate(
        &self,
        symbol: &Symbol,
        payload: &RawPayload,
        as_of: DateTime<Utc>,
    ) -> Result<SignalContribution, SourceError> {
        let biases: Vec<ManualBias> = decode(payload)?;
        let bias = biases
            .iter()
            .filter(|b| b.kind == self.kind)
            .find(|b| match &b.symbols {
                None => true,
                Some(list) => list.iter().any(|s| s.eq_ignore_ascii_case(symbol.as_str())),
            })
            .ok_or_else(|| SourceError::NoData(format!("{} bias for {}", self.kind, symbol)))?;

        Ok(SignalContribution::bounded(
            self.kind,
            symbol.clone(),
            bias.value,
            self.bounds(),
            as_of,
        ))
    }
}
