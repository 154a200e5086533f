//! Telegram通知发送器模块
//!
//! 通过Bot API的 `sendMessage` 方法发送Markdown消息

use crate::config::TelegramConfig;
use crate::error::{ChannelKind, ChannelSendError, NetworkError};
use crate::notification::sender::{NotificationChannel, NotificationMessage};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

/// Telegram消息格式
const PARSE_MODE: &str = "Markdown";

/// `sendMessage` 请求体
#[derive(Debug, Serialize)]
struct SendMessageBody<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

/// Bot API的响应信封
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    description: Option<String>,
}

/// Telegram通知发送器
pub struct TelegramChannel {
    /// HTTP客户端
    client: Client,
    /// `sendMessage` 完整地址（包含token）
    endpoint: String,
    /// 目标会话ID
    chat_id: String,
}

impl TelegramChannel {
    /// 创建新的Telegram发送器
    ///
    /// # 参数
    /// * `config` - Telegram渠道配置
    ///
    /// # 返回
    /// * `Result<Self, NetworkError>` - 发送器实例
    pub fn new(config: &TelegramConfig) -> Result<Self, NetworkError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| NetworkError::Client(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}/bot{}/sendMessage", config.api_url, config.token),
            chat_id: config.chat_id.clone(),
        })
    }

    fn failure(message: impl Into<String>) -> ChannelSendError {
        ChannelSendError::send(ChannelKind::Telegram, message)
    }
}

#[async_trait]
impl NotificationChannel for TelegramChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Telegram
    }

    async fn send(&self, message: &NotificationMessage) -> Result<(), ChannelSendError> {
        let body = SendMessageBody {
            chat_id: &self.chat_id,
            text: &message.body,
            parse_mode: PARSE_MODE,
        };

        debug!("发送Telegram消息到会话: {}", self.chat_id);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            // 错误信息中的URL包含token，不能原样输出
            .map_err(|e| Self::failure(e.without_url().to_string()))?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let api_response = serde_json::from_str::<ApiResponse>(&text).ok();

        if status.is_success() && api_response.as_ref().is_none_or(|r| r.ok) {
            info!("Telegram消息发送成功");
            return Ok(());
        }

        let description = api_response
            .and_then(|r| r.description)
            .unwrap_or(text);
        error!("Telegram消息发送失败: {} - {}", status, description);
        Err(Self::failure(format!(
            "HTTP {}: {}",
            status.as_u16(),
            description
        )))
    }
}
