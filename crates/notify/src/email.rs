use async_trait::async_trait;
use kizashi_core::config::EmailConfig;
use kizashi_core::notify::error::NotifyError;
use kizashi_core::notify::port::Notifier;
use lettre::message::{Mailbox, Message, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};

const CHANNEL: &str = "email";

/// # Summary
/// 通过 SMTP 发送告警邮件。
///
/// # Invariants
/// - 地址在构造时解析，发送时不再失败于地址格式。
/// - `AsyncSmtpTransport` 在多次发送间复用。
pub struct EmailNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailNotifier {
    /// # Summary
    /// 由配置创建。
    ///
    /// # Logic
    /// 1. 解析发件人与收件人地址。
    /// 2. 以 587 端口 STARTTLS 建立带认证的中继传输。
    pub fn new(config: &EmailConfig) -> Result<Self, NotifyError> {
        let misconfigured = |what: &str, e: &dyn std::fmt::Display| NotifyError::Config {
            channel: CHANNEL,
            reason: format!("invalid {}: {}", what, e),
        };
        let from = config
            .from
            .parse()
            .map_err(|e| misconfigured("from address", &e))?;
        let to = config
            .to
            .parse()
            .map_err(|e| misconfigured("to address", &e))?;

        let creds = Credentials::new(config.user.clone(), config.pass.clone());
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| misconfigured("SMTP host", &e))?
            .credentials(creds)
            .build();

        Ok(Self { mailer, from, to })
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn notify(&self, subject: &str, content: &str) -> Result<(), NotifyError> {
        let email = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(content.to_string())
            .map_err(|e| NotifyError::Transport {
                channel: CHANNEL,
                reason: format!("cannot build message: {}", e),
            })?;

        self.mailer
            .send(email)
            .await
            .map_err(|e| NotifyError::Transport {
                channel: CHANNEL,
                reason: e.to_string(),
            })?;

        Ok(())
    }

    fn channel(&self) -> &'static str {
        CHANNEL
    }
}
