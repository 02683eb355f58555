use crate::notify::error::NotifyError;
use async_trait::async_trait;

/// # Summary
/// 将评分变动告警推送到外部系统的接口定义。
///
/// # Invariants
/// - 实现必须是 `Send` 和 `Sync`，告警分发器会在后台任务中并发调用。
/// - 推送失败只影响本次通知，不得回传到评估周期。
#[async_trait]
pub trait Notifier: Send + Sync {
    /// # Summary
    /// 发送带有主题和内容的通知。
    ///
    /// # Arguments
    /// * `subject` - 通知标题。
    /// * `content` - 通知正文。
    ///
    /// # Returns
    /// * 成功返回 `Ok(())`，失败返回 `Err(NotifyError)`。
    async fn notify(&self, subject: &str, content: &str) -> Result<(), NotifyError>;

    /// 通知渠道名称，用于日志。
    fn channel(&self) -> &'static str;
}
