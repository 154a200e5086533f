//! 邮件通知发送器模块
//!
//! 通过SMTP中继（默认Gmail）发送纯文本邮件

use crate::config::EmailConfig;
use crate::error::{ChannelKind, ChannelSendError, ConfigError};
use crate::notification::sender::{NotificationChannel, NotificationMessage};
use async_trait::async_trait;
use lettre::message::header::{self, ContentType};
use lettre::message::{Mailbox, Mailboxes};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info};

/// 服务商返回的认证失败标记
const AUTH_FAILURE_CODES: [&str; 2] = ["534", "535"];
const AUTH_FAILURE_MARKERS: [&str; 5] = [
    "eauth",
    "username and password not accepted",
    "invalid login",
    "badcredentials",
    "authentication failed",
];

/// 邮件通知发送器
pub struct EmailChannel {
    /// SMTP传输
    transport: AsyncSmtpTransport<Tokio1Executor>,
    /// 发件人
    from: Mailbox,
    /// 收件人，`EMAIL_TO` 可以用逗号分隔多个地址
    to: Mailboxes,
}

impl EmailChannel {
    /// 创建新的邮件发送器
    ///
    /// # 参数
    /// * `config` - 邮件渠道配置
    ///
    /// # 返回
    /// * `Result<Self, ConfigError>` - 地址或中继主机无效时返回配置错误
    pub fn new(config: &EmailConfig) -> Result<Self, ConfigError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| ConfigError::Invalid(format!("SMTP中继 {} 无效: {e}", config.smtp_host)))?
            .credentials(Credentials::new(
                config.user.clone(),
                config.password.clone(),
            ))
            .timeout(Some(config.timeout))
            .build();

        Self::with_transport(config, transport)
    }

    /// 使用已构建的SMTP传输创建发送器
    fn with_transport(
        config: &EmailConfig,
        transport: AsyncSmtpTransport<Tokio1Executor>,
    ) -> Result<Self, ConfigError> {
        let from: Mailbox = config
            .user
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("EMAIL_USER 不是有效的邮箱地址: {e}")))?;
        let to: Mailboxes = config
            .to
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("EMAIL_TO 不是有效的邮箱地址: {e}")))?;

        if to.iter().next().is_none() {
            return Err(ConfigError::Invalid("EMAIL_TO 没有任何收件人".to_string()));
        }

        Ok(Self {
            transport,
            from,
            to,
        })
    }

    /// 收件人列表
    pub fn recipients(&self) -> Vec<String> {
        self.to.iter().map(|m| m.email.to_string()).collect()
    }
}

/// 将SMTP错误归类，认证失败时改写为更明确的提示
///
/// # 参数
/// * `code` - SMTP响应码（如果有）
/// * `message` - 原始错误信息
pub fn classify_email_failure(code: Option<&str>, message: &str) -> ChannelSendError {
    let lowered = message.to_lowercase();
    let is_auth_failure = code.is_some_and(|c| AUTH_FAILURE_CODES.contains(&c))
        || AUTH_FAILURE_MARKERS.iter().any(|m| lowered.contains(m));

    if is_auth_failure {
        ChannelSendError::EmailAuth {
            raw: message.to_string(),
        }
    } else {
        ChannelSendError::send(ChannelKind::Email, message)
    }
}

#[async_trait]
impl NotificationChannel for EmailChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Email
    }

    async fn send(&self, message: &NotificationMessage) -> Result<(), ChannelSendError> {
        let email = Message::builder()
            .from(self.from.clone())
            .mailbox(header::To::from(self.to.clone()))
            .subject(message.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())
            .map_err(|e| ChannelSendError::send(ChannelKind::Email, e.to_string()))?;

        debug!("发送邮件到: {}", self.to);

        match self.transport.send(email).await {
            Ok(response) => {
                info!("邮件发送成功: {}", response.code());
                Ok(())
            }
            Err(e) => {
                let code = e.status().map(|c| c.to_string());
                Err(classify_email_failure(code.as_deref(), &e.to_string()))
            }
        }
    }
}
