use async_trait::async_trait;
use kizashi_core::common::Symbol;
use kizashi_core::config::ManualBias;
use kizashi_core::signal::entity::{RawPayload, SourceKind, SourceScope};
use kizashi_core::signal::error::FetchError;
use kizashi_core::signal::port::SignalFeed;

/// # Summary
/// 人工偏向的"抓取器"：没有上游，直接返回配置中属于该类别的偏向列表。
///
/// # Invariants
/// - 全局作用域，载荷为 `ManualBias` 数组。
pub struct StaticFeed {
    kind: SourceKind,
    biases: Vec<ManualBias>,
}

impl StaticFeed {
    pub fn new(kind: SourceKind, biases: &[ManualBias]) -> Self {
        Self {
            kind,
            biases: biases.iter().filter(|b| b.kind == kind).cloned().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.biases.is_empty()
    }
}

#[async_trait]
impl SignalFeed for StaticFeed {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn scope(&self) -> SourceScope {
        SourceScope::Global
    }

    async fn fetch(&self, _symbol: Option<&Symbol>) -> Result<RawPayload, FetchError> {
        serde_json::to_value(&self.biases).map_err(|e| FetchError::Decode(e.to_string()))
    }
}
