use crate::cache::entity::CacheEntry;
use crate::cache::error::CacheError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;

/// # Summary
/// 业务无关的异步条目存储接口 (Port)。
///
/// # Invariants
/// - 处理原始字节，确保 Trait 是对象安全的 (Object Safe)。
/// - 存储层只负责保存条目，过期判断由调用方结合时钟完成。
#[async_trait]
pub trait Cache: Send + Sync {
    /// # Summary
    /// 写入条目，同名键整体覆盖。
    ///
    /// # Arguments
    /// * `entry`: 待写入的原始字节条目。
    ///
    /// # Returns
    /// 成功返回 Ok，失败返回 `CacheError`。
    async fn put_raw(&self, entry: CacheEntry) -> Result<(), CacheError>;

    /// # Summary
    /// 读取条目，不论其是否过期。
    ///
    /// # Arguments
    /// * `key`: 唯一键。
    ///
    /// # Returns
    /// 存在则返回条目的克隆，否则返回 `None`。
    async fn get_raw(&self, key: &str) -> Result<Option<CacheEntry>, CacheError>;

    /// # Summary
    /// 删除指定键。
    async fn del(&self, key: &str) -> Result<(), CacheError>;
}

/// # Summary
/// 缓存泛型扩展接口，提供便捷的序列化支持。
///
/// # Invariants
/// - 自动为所有实现 `Cache` 的类型提供支持。
#[async_trait]
pub trait CacheExt: Cache {
    /// # Summary
    /// 存入强类型对象。
    ///
    /// # Logic
    /// 1. 使用 JSON 序列化对象。
    /// 2. 携带获取时间与 TTL 调用底层 `put_raw` 写入。
    async fn set<T: Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
        fetched_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(value).map_err(|e| CacheError::Encode {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        self.put_raw(CacheEntry {
            key: key.to_string(),
            value: bytes,
            fetched_at,
            ttl,
        })
        .await
    }

    /// # Summary
    /// 取出强类型条目。
    ///
    /// # Logic
    /// 1. 调用底层 `get_raw` 获取字节条目。
    /// 2. 使用 JSON 反序列化为目标类型，元数据原样保留。
    async fn get<T: DeserializeOwned + Send>(
        &self,
        key: &str,
    ) -> Result<Option<CacheEntry<T>>, CacheError> {
        match self.get_raw(key).await? {
            Some(entry) => {
                let value =
                    serde_json::from_slice(&entry.value).map_err(|e| CacheError::Decode {
                        key: key.to_string(),
                        reason: e.to_string(),
                    })?;
                Ok(Some(entry.map(|_| value)))
            }
            None => Ok(None),
        }
    }
}

impl<T: Cache + ?Sized> CacheExt for T {}
