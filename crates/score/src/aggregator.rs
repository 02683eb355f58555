use kizashi_core::common::Symbol;
use kizashi_core::score::entity::{CompositeScore, ScoreStatus};
use kizashi_core::signal::entity::{SignalContribution, SourceKind};
use rust_decimal::Decimal;

/// # Summary
/// 综合评分计算器，无状态。
///
/// # Invariants
/// - `Fresh` 评分的 `total` 恰好等于该标的本周期全部贡献值之和。
/// - 驱动因子为绝对值最大的单项贡献，平局按 `SourceKind::priority` 裁决。
#[derive(Debug, Default, Clone, Copy)]
pub struct ScoreAggregator;

impl ScoreAggregator {
    pub fn new() -> Self {
        Self
    }

    /// # Summary
    /// 合成单个标的在本周期的综合评分。
    ///
    /// # Logic
    /// 1. 只保留属于 `symbol` 的贡献。
    /// 2. 有贡献时求和并选出驱动因子，状态为 `Fresh`。
    /// 3. 无贡献但有上一周期总分时沿用之，状态为 `CarriedForward`。
    /// 4. 两者皆无时总分记为 0，状态为 `Unavailable`。
    ///
    /// # Arguments
    /// * `symbol`: 标的。
    /// * `contributions`: 本周期收到的贡献，可包含其他标的。
    /// * `previous`: 上一周期已提交的总分。
    /// * `cycle`: 当前周期编号。
    pub fn aggregate(
        &self,
        symbol: &Symbol,
        contributions: &[SignalContribution],
        previous: Option<Decimal>,
        cycle: u64,
    ) -> CompositeScore {
        let own: Vec<&SignalContribution> =
            contributions.iter().filter(|c| &c.symbol == symbol).collect();

        if own.is_empty() {
            let (total, status) = match previous {
                Some(total) => (total, ScoreStatus::CarriedForward),
                None => (Decimal::ZERO, ScoreStatus::Unavailable),
            };
            return CompositeScore {
                symbol: symbol.clone(),
                total,
                driver: None,
                cycle,
                status,
            };
        }

        let total = own.iter().map(|c| c.value).sum();
        CompositeScore {
            symbol: symbol.clone(),
            total,
            driver: driver_of(&own),
            cycle,
            status: ScoreStatus::Fresh,
        }
    }
}

/// 全部贡献为零时没有驱动因子。
fn driver_of(contributions: &[&SignalContribution]) -> Option<SourceKind> {
    contributions
        .iter()
        .filter(|c| !c.value.is_zero())
        .min_by(|a, b| {
            b.value
                .abs()
                .cmp(&a.value.abs())
                .then(a.source.priority().cmp(&b.source.priority()))
        })
        .map(|c| c.source)
}
