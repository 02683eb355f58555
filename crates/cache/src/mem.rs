use async_trait::async_trait;
use dashmap::DashMap;
use kizashi_core::cache::entity::CacheEntry;
use kizashi_core::cache::error::CacheError;
use kizashi_core::cache::port::Cache;

/// # Summary
/// 基于 DashMap 的内存条目缓存实现。
///
/// # Invariants
/// - 所有操作均通过并发哈希表 `DashMap` 执行，不同键分布在不同分片上互不阻塞。
/// - 不主动淘汰过期条目，保留的旧条目可作为"最后已知值"读取。
pub struct MemCache {
    // 线程安全的条目容器
    storage: DashMap<String, CacheEntry>,
}

impl MemCache {
    /// # Summary
    /// 创建一个新的 MemCache 实例。
    pub fn new() -> Self {
        Self {
            storage: DashMap::new(),
        }
    }

    /// 当前条目数量。
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

impl Default for MemCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cache for MemCache {
    /// # Summary
    /// 写入条目。
    ///
    /// # Logic
    /// 以条目自身的 key 插入哈希表，若存在同名 Key 则整体覆盖。
    async fn put_raw(&self, entry: CacheEntry) -> Result<(), CacheError> {
        self.storage.insert(entry.key.clone(), entry);
        Ok(())
    }

    /// # Summary
    /// 读取条目。
    ///
    /// # Logic
    /// 检索 Key 对应的引用并克隆为独立的所有权对象返回，不做过期判断。
    async fn get_raw(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        Ok(self.storage.get(key).map(|v| v.value().clone()))
    }

    async fn del(&self, key: &str) -> Result<(), CacheError> {
        self.storage.remove(key);
        Ok(())
    }
}
