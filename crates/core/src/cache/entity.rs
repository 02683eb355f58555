use chrono::{DateTime, Utc};
use std::time::Duration;

/// # Summary
/// 缓存条目，记录一次成功上游调用的结果及其获取时间。
///
/// # Invariants
/// - `fetched_at` 为写入时的时钟读数，条目在 `now - fetched_at < ttl` 期间有效。
/// - 条目只会被新的成功结果整体替换，失败的上游调用不会改写它。
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V = Vec<u8>> {
    // 缓存键
    pub key: String,
    // 缓存值 (底层存储为原始字节)
    pub value: V,
    // 获取时间
    pub fetched_at: DateTime<Utc>,
    // 存活时长
    pub ttl: Duration,
}

impl<V> CacheEntry<V> {
    /// # Summary
    /// 判断条目在给定时刻是否仍然有效。
    ///
    /// # Logic
    /// 1. 计算条目年龄 `now - fetched_at`。
    /// 2. 年龄为负 (时钟回拨) 视为有效。
    /// 3. 否则年龄严格小于 TTL 才有效，TTL 为零的条目永远过期。
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        match (now - self.fetched_at).to_std() {
            Ok(age) => age < self.ttl,
            Err(_) => true,
        }
    }

    /// 转换条目值，保留元数据。
    pub fn map<U>(self, f: impl FnOnce(V) -> U) -> CacheEntry<U> {
        CacheEntry {
            key: self.key,
            value: f(self.value),
            fetched_at: self.fetched_at,
            ttl: self.ttl,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(ttl_secs: u64) -> CacheEntry<()> {
        CacheEntry {
            key: "news:AAPL".to_string(),
            value: (),
            fetched_at: Utc.with_ymd_and_hms(2025, 7, 16, 12, 0, 0).unwrap(),
            ttl: Duration::from_secs(ttl_secs),
        }
    }

    #[test]
    fn test_entry_liveness_boundary() {
        let e = entry(900);
        let t0 = e.fetched_at;
        assert!(e.is_live(t0));
        assert!(e.is_live(t0 + chrono::Duration::seconds(899)));
        assert!(!e.is_live(t0 + chrono::Duration::seconds(900)));
        assert!(e.is_live(t0 - chrono::Duration::seconds(5)));
    }

    #[test]
    fn test_zero_ttl_never_live() {
        let e = entry(0);
        assert!(!e.is_live(e.fetched_at));
    }
}
