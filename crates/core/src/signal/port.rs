use crate::common::Symbol;
use crate::signal::entity::{RawPayload, SignalContribution, SourceDetail, SourceKind, SourceScope};
use crate::signal::error::{FetchError, SourceError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// # Summary
/// 上游数据抓取接口 (Port)，每个来源类别一个实现。
///
/// # Invariants
/// - 只负责 I/O，返回未经解释的原始载荷。
/// - `Global` 作用域的实现以 `symbol = None` 调用，`PerSymbol` 实现必须收到 `Some`。
#[async_trait]
pub trait SignalFeed: Send + Sync {
    /// 所属来源类别。
    fn kind(&self) -> SourceKind;

    /// 抓取粒度。
    fn scope(&self) -> SourceScope;

    /// # Summary
    /// 执行一次上游调用。
    ///
    /// # Arguments
    /// * `symbol`: 逐标的来源的目标标的，全局来源为 `None`。
    ///
    /// # Returns
    /// 成功返回原始载荷，失败返回 `FetchError`。
    async fn fetch(&self, symbol: Option<&Symbol>) -> Result<RawPayload, FetchError>;
}

/// # Summary
/// 信号源求值接口：原始载荷到有界贡献值的纯函数。
///
/// # Invariants
/// - 求值是确定性的，不做 I/O，不 panic。
/// - 载荷异常时返回 `SourceError`，由调用方降级为"无贡献"。
pub trait SignalSource: Send + Sync {
    /// 所属来源类别。
    fn kind(&self) -> SourceKind;

    /// 贡献值闭区间 `(min, max)`。
    fn bounds(&self) -> (Decimal, Decimal);

    /// # Summary
    /// 将载荷映射为该标的本周期的贡献值。
    ///
    /// # Arguments
    /// * `symbol`: 目标标的。
    /// * `payload`: 上游原始载荷。
    /// * `as_of`: 本周期的评估时间，时间窗口过滤以它为基准。
    fn evaluate(
        &self,
        symbol: &Symbol,
        payload: &RawPayload,
        as_of: DateTime<Utc>,
    ) -> Result<SignalContribution, SourceError>;

    /// # Summary
    /// 从载荷提取展示信息 (报价字段、宏观事件列表)。默认无。
    fn detail(&self, _payload: &RawPayload, _as_of: DateTime<Utc>) -> Option<SourceDetail> {
        None
    }
}
