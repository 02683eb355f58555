use thiserror::Error;

/// # Summary
/// 告警投递失败。
///
/// # Invariants
/// - 只由通知渠道产生，分发器记录后丢弃，绝不影响评估周期。
#[derive(Error, Debug)]
pub enum NotifyError {
    /// 渠道配置无效 (地址格式、SMTP 主机等)，在构造时报告
    #[error("{channel} misconfigured: {reason}")]
    Config {
        channel: &'static str,
        reason: String,
    },

    /// 未能送达对端
    #[error("{channel} unreachable: {reason}")]
    Transport {
        channel: &'static str,
        reason: String,
    },

    /// 对端拒绝了消息
    #[error("{channel} rejected message ({status}): {body}")]
    Rejected {
        channel: &'static str,
        status: u16,
        body: String,
    },
}
