use crate::common::Symbol;
use crate::signal::entity::{MacroEvent, QuoteSummary, SourceKind};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// # Summary
/// 综合评分的数据来源状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScoreStatus {
    // 本周期至少有一个贡献
    Fresh,
    // 本周期无贡献，沿用上一周期总分
    CarriedForward,
    // 本周期无贡献且没有历史总分
    Unavailable,
}

/// # Summary
/// 某标的在一个周期内的综合评分。
///
/// # Invariants
/// - `cycle` 等于调度器当前周期计数。
/// - `Fresh` 时 `total` 等于本周期全部贡献值之和。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CompositeScore {
    pub symbol: Symbol,
    #[schema(value_type = f64, example = 2.0)]
    pub total: Decimal,
    // 主导来源，无贡献或全部为零时为 None
    pub driver: Option<SourceKind>,
    pub cycle: u64,
    pub status: ScoreStatus,
}

/// # Summary
/// 评分变动告警。
///
/// # Invariants
/// - 仅当标的存在上一周期已提交的总分且 `current != previous` 时产生。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AlertEvent {
    pub symbol: Symbol,
    #[schema(value_type = f64, example = 2.0)]
    pub previous: Decimal,
    #[schema(value_type = f64, example = 0.0)]
    pub current: Decimal,
    pub cycle: u64,
}

/// # Summary
/// 面向展示层的情绪标签。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Sentiment {
    Bullish,
    Bearish,
    Neutral,
    Unavailable,
}

impl Sentiment {
    /// # Summary
    /// 由综合评分推导标签。
    ///
    /// # Logic
    /// 1. `Unavailable` 状态直接映射为 Unavailable。
    /// 2. 总分大于零为 Bullish，小于零为 Bearish，等于零为 Neutral。
    pub fn of(score: &CompositeScore) -> Self {
        if score.status == ScoreStatus::Unavailable {
            return Sentiment::Unavailable;
        }
        if score.total > Decimal::ZERO {
            Sentiment::Bullish
        } else if score.total < Decimal::ZERO {
            Sentiment::Bearish
        } else {
            Sentiment::Neutral
        }
    }
}

/// # Summary
/// 快照中的一行。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SnapshotRow {
    pub symbol: Symbol,
    pub score: CompositeScore,
    pub sentiment: Sentiment,
    // 原始报价字段，报价源从未成功时为 None
    pub quote: Option<QuoteSummary>,
    // 以下为格式化后的展示字段，缺失时为 "-"
    #[schema(example = "172.35")]
    pub price: String,
    #[schema(example = "12.34M")]
    pub volume: String,
    #[schema(example = "2430.00M")]
    pub float: String,
    #[schema(example = "4.21T")]
    pub market_cap: String,
}

/// # Summary
/// 一个周期发布的完整结果，展示层唯一可见的产物。
///
/// # Invariants
/// - 每周期整体替换，绝不局部更新。
/// - `rows` 保持观察列表顺序。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Snapshot {
    pub cycle: u64,
    pub published_at: DateTime<Utc>,
    pub rows: Vec<SnapshotRow>,
    pub alerts: Vec<AlertEvent>,
    // 前瞻窗口内的宏观事件
    pub macro_events: Vec<MacroEvent>,
}

impl Snapshot {
    /// 首个周期发布前的空快照。
    pub fn empty(at: DateTime<Utc>) -> Self {
        Self {
            cycle: 0,
            published_at: at,
            rows: Vec::new(),
            alerts: Vec::new(),
            macro_events: Vec::new(),
        }
    }

    /// 按代码查找行，大小写不敏感；标的按配置原样保存，不做规范化。
    pub fn row(&self, symbol: &str) -> Option<&SnapshotRow> {
        self.rows
            .iter()
            .find(|r| r.symbol.as_str().eq_ignore_ascii_case(symbol))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn score(total: Decimal, status: ScoreStatus) -> CompositeScore {
        CompositeScore {
            symbol: Symbol::from("AAA"),
            total,
            driver: None,
            cycle: 1,
            status,
        }
    }

    #[test]
    fn test_row_lookup_ignores_case() {
        let mut snapshot = Snapshot::empty(chrono::Utc::now());
        let mut lower = score(dec!(1), ScoreStatus::Fresh);
        lower.symbol = Symbol::from("brk.b");
        snapshot.rows.push(SnapshotRow {
            symbol: lower.symbol.clone(),
            sentiment: Sentiment::of(&lower),
            score: lower,
            quote: None,
            price: "-".into(),
            volume: "-".into(),
            float: "-".into(),
            market_cap: "-".into(),
        });

        assert!(snapshot.row("brk.b").is_some());
        assert!(snapshot.row("BRK.B").is_some());
        assert!(snapshot.row("BRK").is_none());
    }

    #[test]
    fn test_sentiment_labels() {
        assert_eq!(Sentiment::of(&score(dec!(2), ScoreStatus::Fresh)), Sentiment::Bullish);
        assert_eq!(Sentiment::of(&score(dec!(-0.5), ScoreStatus::Fresh)), Sentiment::Bearish);
        assert_eq!(Sentiment::of(&score(dec!(0), ScoreStatus::CarriedForward)), Sentiment::Neutral);
        assert_eq!(
            Sentiment::of(&score(dec!(0), ScoreStatus::Unavailable)),
            Sentiment::Unavailable
        );
    }
}
