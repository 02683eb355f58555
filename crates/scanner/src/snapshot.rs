use chrono::{DateTime, Utc};
use kizashi_core::score::entity::Snapshot;
use std::sync::Arc;
use tokio::sync::watch;

/// # Summary
/// 最新快照的持有者。
///
/// # Invariants
/// - 快照整体替换，读者只会看到上一份或下一份完整快照。
/// - 只有调度器写入，展示层与通知分发只读。
pub struct SnapshotStore {
    tx: watch::Sender<Arc<Snapshot>>,
}

impl SnapshotStore {
    /// 以空快照 (周期 0) 初始化
    pub fn new(at: DateTime<Utc>) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(Snapshot::empty(at)));
        Self { tx }
    }

    /// # Summary
    /// 原子替换当前快照并唤醒订阅者。
    ///
    /// # Logic
    /// 1. 使用 `send_replace`，即使暂无订阅者也会更新持有值。
    pub fn publish(&self, snapshot: Arc<Snapshot>) {
        drop(self.tx.send_replace(snapshot));
    }

    pub fn latest(&self) -> Arc<Snapshot> {
        self.tx.borrow().clone()
    }

    /// 订阅后续发布
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_replaces_whole_snapshot() {
        let store = SnapshotStore::new(Utc::now());
        assert_eq!(store.latest().cycle, 0);

        let mut rx = store.subscribe();
        let before = store.latest();

        let mut next = Snapshot::empty(Utc::now());
        next.cycle = 1;
        store.publish(Arc::new(next));

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().cycle, 1);
        assert_eq!(store.latest().cycle, 1);
        // 旧引用保持不变
        assert_eq!(before.cycle, 0);
    }
}
