use crate::common::Symbol;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// # Summary
/// 上游原始载荷。信号源自行解析，调度器与缓存层不关心其结构。
pub type RawPayload = serde_json::Value;

/// # Summary
/// 信号来源类别。
///
/// # Invariants
/// - 声明顺序即驱动因子平局时的优先级：News 最高，Quote 最低。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    // 个股新闻情绪
    News,
    // 财报超预期
    Earnings,
    // IPO 日历
    Ipo,
    // 期权偏向 (人工配置)
    Options,
    // 宏观日历风险
    Macro,
    // 持仓报告 COT (人工配置)
    Cot,
    // 地缘风险 (人工配置)
    Geo,
    // 报价动量
    Quote,
}

impl SourceKind {
    pub const ALL: [SourceKind; 8] = [
        SourceKind::News,
        SourceKind::Earnings,
        SourceKind::Ipo,
        SourceKind::Options,
        SourceKind::Macro,
        SourceKind::Cot,
        SourceKind::Geo,
        SourceKind::Quote,
    ];

    /// # Summary
    /// 平局裁决优先级，数值越小越优先。
    pub fn priority(self) -> u8 {
        match self {
            SourceKind::News => 0,
            SourceKind::Earnings => 1,
            SourceKind::Ipo => 2,
            SourceKind::Options => 3,
            SourceKind::Macro => 4,
            SourceKind::Cot => 5,
            SourceKind::Geo => 6,
            SourceKind::Quote => 7,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::News => "news",
            SourceKind::Earnings => "earnings",
            SourceKind::Ipo => "ipo",
            SourceKind::Options => "options",
            SourceKind::Macro => "macro",
            SourceKind::Cot => "cot",
            SourceKind::Geo => "geo",
            SourceKind::Quote => "quote",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SourceKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown SourceKind: {}", s))
    }
}

/// # Summary
/// 信号源的抓取粒度。
///
/// # Invariants
/// - `Global` 源每周期只抓取一次，再对每个标的分别求值 (宏观、IPO 日历)。
/// - `PerSymbol` 源对每个 (标的, 来源) 组合独立抓取。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceScope {
    Global,
    PerSymbol,
}

/// # Summary
/// 单个信号源在一个周期内对某标的的有界投票。
///
/// # Invariants
/// - `value` 已被裁剪到来源自身的取值区间内。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SignalContribution {
    pub source: SourceKind,
    pub symbol: Symbol,
    #[schema(value_type = f64, example = 1.0)]
    pub value: Decimal,
    pub as_of: DateTime<Utc>,
}

impl SignalContribution {
    /// # Summary
    /// 构造贡献值并裁剪到给定区间。
    ///
    /// # Arguments
    /// * `bounds`: 闭区间 `(min, max)`。
    pub fn bounded(
        source: SourceKind,
        symbol: Symbol,
        raw: Decimal,
        bounds: (Decimal, Decimal),
        as_of: DateTime<Utc>,
    ) -> Self {
        let (min, max) = bounds;
        Self {
            source,
            symbol,
            value: raw.clamp(min, max),
            as_of,
        }
    }
}

/// # Summary
/// 报价源提取出的展示字段。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct QuoteSummary {
    // 最新价
    pub price: Option<f64>,
    // 成交量
    pub volume: Option<f64>,
    // 流通股本
    pub shares_outstanding: Option<f64>,
    // 总市值
    pub market_cap: Option<f64>,
}

/// # Summary
/// 宏观日历中的单条事件。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MacroEvent {
    pub date: DateTime<Utc>,
    pub country: String,
    pub event: String,
    // 重要度：3 高，2 中，1 低
    pub importance: u8,
}

/// # Summary
/// 信号源从载荷中附带提取的展示信息，不参与评分。
#[derive(Debug, Clone, PartialEq)]
pub enum SourceDetail {
    Quote(QuoteSummary),
    MacroCalendar(Vec<MacroEvent>),
}
