//! 通知分发模块
//!
//! 将一次检测结果同时发往邮件与Telegram两个渠道，等待两者都结束后再汇总结果

use crate::error::{ChannelSendError, NotificationError};
use crate::notification::sender::NotificationChannel;
use crate::notification::template::{AlertContext, MessageComposer};
use chrono::Utc;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, warn};

/// 单次通知事件的投递结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeliverySummary {
    /// 邮件是否发送成功
    pub email: bool,
    /// Telegram是否发送成功
    pub telegram: bool,
}

impl DeliverySummary {
    /// 至少一个渠道成功
    pub fn delivered(&self) -> bool {
        self.email || self.telegram
    }

    /// 所有渠道都成功
    pub fn all_delivered(&self) -> bool {
        self.email && self.telegram
    }
}

impl fmt::Display for DeliverySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = |ok: bool| if ok { "✓" } else { "✗" };
        write!(f, "email {} / telegram {}", mark(self.email), mark(self.telegram))
    }
}

/// 通知分发器
pub struct NotificationDispatcher {
    /// 邮件渠道
    email: Arc<dyn NotificationChannel>,
    /// Telegram渠道
    telegram: Arc<dyn NotificationChannel>,
    /// 消息生成器
    composer: MessageComposer,
    /// 监控的URL
    target_url: String,
}

impl NotificationDispatcher {
    /// 创建新的通知分发器
    ///
    /// # 参数
    /// * `email` - 邮件渠道
    /// * `telegram` - Telegram渠道
    /// * `composer` - 消息生成器
    /// * `target_url` - 监控的URL，写入通知内容
    pub fn new(
        email: Arc<dyn NotificationChannel>,
        telegram: Arc<dyn NotificationChannel>,
        composer: MessageComposer,
        target_url: impl Into<String>,
    ) -> Self {
        Self {
            email,
            telegram,
            composer,
            target_url: target_url.into(),
        }
    }

    /// 监控的URL
    pub fn target_url(&self) -> &str {
        &self.target_url
    }

    /// 发送通知
    ///
    /// 两个渠道并发发送且互不影响；只有两个渠道都失败时才返回错误。
    ///
    /// # 参数
    /// * `final_url` - 探测到的最终URL
    ///
    /// # 返回
    /// * `Result<DeliverySummary, NotificationError>` - 各渠道的发送结果
    pub async fn notify(&self, final_url: &str) -> Result<DeliverySummary, NotificationError> {
        let context = AlertContext::new(&self.target_url, final_url, Utc::now());
        let email_message = self.composer.email(&context)?;
        let telegram_message = self.composer.telegram(&context)?;

        let (email_result, telegram_result) = futures::join!(
            self.email.send(&email_message),
            self.telegram.send(&telegram_message)
        );

        let email_error = Self::settle(email_result);
        let telegram_error = Self::settle(telegram_result);

        let summary = DeliverySummary {
            email: email_error.is_none(),
            telegram: telegram_error.is_none(),
        };

        match (email_error, telegram_error) {
            (Some(email), Some(telegram)) => {
                Err(NotificationError::AllChannelsFailed { email, telegram })
            }
            _ => {
                if summary.all_delivered() {
                    info!("通知已发送: {}", summary);
                } else {
                    warn!("通知部分送达: {}", summary);
                }
                Ok(summary)
            }
        }
    }

    /// 记录单个渠道的失败，返回错误供汇总
    fn settle(result: Result<(), ChannelSendError>) -> Option<ChannelSendError> {
        match result {
            Ok(()) => None,
            Err(e) => {
                error!(channel = %e.channel(), "通知发送失败: {}", e);
                Some(e)
            }
        }
    }
}
