use crate::render::render_alerts;
use kizashi_core::notify::port::Notifier;
use kizashi_core::score::entity::Snapshot;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

/// # Summary
/// 告警分发器：订阅快照发布，把每个周期的告警推送到所有通知渠道。
///
/// # Invariants
/// - 单个渠道失败只记录日志，不影响其他渠道，也不回传到评估周期。
/// - 分发慢于发布时只处理最新快照，中间快照的告警可能被跳过。
pub struct AlertDispatcher {
    notifiers: Vec<Arc<dyn Notifier>>,
}

impl AlertDispatcher {
    pub fn new(notifiers: Vec<Arc<dyn Notifier>>) -> Self {
        Self { notifiers }
    }

    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }

    /// # Summary
    /// 推送一个快照中的告警。
    ///
    /// # Returns
    /// 成功送达的渠道数；无告警时为 0。
    pub async fn dispatch(&self, snapshot: &Snapshot) -> usize {
        let Some((subject, content)) = render_alerts(snapshot.cycle, &snapshot.alerts) else {
            return 0;
        };

        let mut delivered = 0;
        for notifier in &self.notifiers {
            match notifier.notify(&subject, &content).await {
                Ok(()) => delivered += 1,
                Err(e) => warn!("{} notification failed: {}", notifier.channel(), e),
            }
        }
        info!(
            "cycle {}: {} alerts delivered to {}/{} channels",
            snapshot.cycle,
            snapshot.alerts.len(),
            delivered,
            self.notifiers.len()
        );
        delivered
    }

    /// # Summary
    /// 持续消费快照发布，直到发布端关闭。
    pub async fn run(self, mut rx: watch::Receiver<Arc<Snapshot>>) {
        while rx.changed().await.is_ok() {
            let snapshot = rx.borrow_and_update().clone();
            self.dispatch(&snapshot).await;
        }
    }
}
