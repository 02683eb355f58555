use async_trait::async_trait;
use kizashi_core::config::TelegramConfig;
use kizashi_core::notify::error::NotifyError;
use kizashi_core::notify::port::Notifier;
use serde::Serialize;
use std::time::Duration;

const API_BASE: &str = "https://api.telegram.org";
const CHANNEL: &str = "telegram";

/// # Summary
/// 通过 Telegram Bot API 推送告警。
///
/// # Invariants
/// * `bot_token` 必须有效，`chat_id` 必须对该机器人可见。
pub struct TelegramNotifier {
    bot_token: String,
    chat_id: String,
    client: reqwest::Client,
}

/// # Summary
/// `sendMessage` 请求体。纯文本发送，不设 `parse_mode`，标的中的 `_`、`*` 原样显示。
#[derive(Serialize)]
struct TelegramMessage<'a> {
    chat_id: &'a str,
    text: String,
}

impl TelegramNotifier {
    /// # Summary
    /// 由配置创建。
    ///
    /// # Returns
    /// HTTP 客户端构建失败时返回 `NotifyError::Config`。
    pub fn new(config: &TelegramConfig) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| NotifyError::Config {
                channel: CHANNEL,
                reason: format!("HTTP client: {}", e),
            })?;
        Ok(Self {
            bot_token: config.bot_token.clone(),
            chat_id: config.chat_id.clone(),
            client,
        })
    }

    /// 标题与正文之间以换行分隔
    fn message(&self, subject: &str, content: &str) -> TelegramMessage<'_> {
        TelegramMessage {
            chat_id: &self.chat_id,
            text: format!("{}\n{}", subject, content),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    /// # Summary
    /// 发送消息到配置的会话。
    ///
    /// # Logic
    /// 1. 以纯文本发送，标题与正文换行分隔。
    /// 2. 非成功状态码连同响应体一起作为 `Rejected` 返回。
    async fn notify(&self, subject: &str, content: &str) -> Result<(), NotifyError> {
        let url = format!("{}/bot{}/sendMessage", API_BASE, self.bot_token);
        let payload = self.message(subject, content);

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::Transport {
                channel: CHANNEL,
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                channel: CHANNEL,
                status,
                body,
            });
        }

        Ok(())
    }

    fn channel(&self) -> &'static str {
        CHANNEL
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kizashi_core::common::tls::install_crypto_provider;

    fn notifier() -> TelegramNotifier {
        install_crypto_provider();
        TelegramNotifier::new(&TelegramConfig {
            bot_token: "token".into(),
            chat_id: "42".into(),
        })
        .unwrap()
    }

    #[test]
    fn test_message_is_plain_text() {
        let body = serde_json::to_value(
            notifier().message("Sentiment change: BRK_B", "score 1 -> *-2* [x]"),
        )
        .unwrap();
        assert_eq!(body["chat_id"], "42");
        assert_eq!(body["text"], "Sentiment change: BRK_B\nscore 1 -> *-2* [x]");
        assert!(body.get("parse_mode").is_none());
    }
}
