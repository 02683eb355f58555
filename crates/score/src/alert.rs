use kizashi_core::common::Symbol;
use kizashi_core::score::entity::{AlertEvent, CompositeScore, ScoreStatus};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::debug;

/// # Summary
/// 变动检测器，独占上一周期已提交的总分表。
///
/// # Invariants
/// - `diff` 只读，`commit` 是唯一的写入点。
/// - 调用方必须先对整批评分完成 `diff` 再 `commit`，周期 N 的比对总是看到周期 N-1 的提交结果。
/// - `Unavailable` 评分既不参与比对也不写入，避免无数据时产生伪告警或基线。
#[derive(Debug, Default)]
pub struct AlertTracker {
    previous: HashMap<Symbol, Decimal>,
}

impl AlertTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 上一周期已提交的总分
    pub fn previous(&self, symbol: &Symbol) -> Option<Decimal> {
        self.previous.get(symbol).copied()
    }

    /// # Summary
    /// 比对本周期评分与上一周期提交值。
    ///
    /// # Logic
    /// 1. 首次出现的标的没有基线，跳过。
    /// 2. 总分不同则产生一条告警，`previous` 取提交值原样。
    ///
    /// # Returns
    /// 按输入顺序排列的告警列表。
    pub fn diff(&self, cycle: u64, scores: &[CompositeScore]) -> Vec<AlertEvent> {
        scores
            .iter()
            .filter(|s| s.status != ScoreStatus::Unavailable)
            .filter_map(|s| {
                let previous = self.previous(&s.symbol)?;
                (previous != s.total).then(|| AlertEvent {
                    symbol: s.symbol.clone(),
                    previous,
                    current: s.total,
                    cycle,
                })
            })
            .collect()
    }

    /// # Summary
    /// 以本周期评分覆盖提交表，首次出现的标的在此建立基线。
    pub fn commit(&mut self, scores: &[CompositeScore]) {
        for score in scores.iter().filter(|s| s.status != ScoreStatus::Unavailable) {
            self.previous.insert(score.symbol.clone(), score.total);
        }
        debug!("committed {} scores", self.previous.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn score(symbol: &str, total: Decimal, status: ScoreStatus) -> CompositeScore {
        CompositeScore {
            symbol: Symbol::from(symbol),
            total,
            driver: None,
            cycle: 0,
            status,
        }
    }

    #[test]
    fn test_first_observation_never_alerts() {
        let tracker = AlertTracker::new();
        let alerts = tracker.diff(1, &[score("AAA", dec!(2), ScoreStatus::Fresh)]);
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_diff_does_not_mutate_until_commit() {
        let mut tracker = AlertTracker::new();
        tracker.commit(&[score("AAA", dec!(2), ScoreStatus::Fresh)]);

        let next = [score("AAA", dec!(0), ScoreStatus::Fresh)];
        assert_eq!(tracker.diff(2, &next).len(), 1);
        // 未提交前重复比对结果不变
        assert_eq!(tracker.diff(2, &next).len(), 1);
        assert_eq!(tracker.previous(&Symbol::from("AAA")), Some(dec!(2)));

        tracker.commit(&next);
        assert!(tracker.diff(3, &next).is_empty());
    }

    #[test]
    fn test_unavailable_is_neither_diffed_nor_seeded() {
        let mut tracker = AlertTracker::new();
        tracker.commit(&[score("ZZZ", dec!(0), ScoreStatus::Unavailable)]);
        assert_eq!(tracker.previous(&Symbol::from("ZZZ")), None);

        tracker.commit(&[score("AAA", dec!(1), ScoreStatus::Fresh)]);
        let alerts = tracker.diff(2, &[score("AAA", dec!(0), ScoreStatus::Unavailable)]);
        assert!(alerts.is_empty());
    }
}
