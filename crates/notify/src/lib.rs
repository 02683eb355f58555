//! # `kizashi-notify` - 告警通知
//!
//! `Notifier` 端口的 Telegram 与邮件实现，以及订阅快照并推送告警的分发器。

pub mod dispatcher;
pub mod email;
pub mod render;
pub mod telegram;
