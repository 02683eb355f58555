use thiserror::Error;

/// # Summary
/// 缓存条目编解码失败。
///
/// # Invariants
/// - 内存缓存没有存储层故障，失败只可能来自载荷的 JSON 编解码。
/// - 读穿缓存把它当作未命中处理，不向评估周期传播。
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cannot encode entry '{key}': {reason}")]
    Encode { key: String, reason: String },

    #[error("cannot decode entry '{key}': {reason}")]
    Decode { key: String, reason: String },
}
