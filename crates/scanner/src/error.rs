use kizashi_core::signal::entity::SourceKind;
use thiserror::Error;

/// # Summary
/// 调度器装配阶段的错误。
#[derive(Error, Debug, PartialEq)]
pub enum ScannerError {
    // 抓取器与求值器的来源类别不一致
    #[error("Feed kind {feed} does not match evaluator kind {evaluator}")]
    KindMismatch {
        feed: SourceKind,
        evaluator: SourceKind,
    },
}
