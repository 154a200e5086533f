//! 通知渠道模块
//!
//! 定义通知发送的trait和消息结构

use crate::error::{ChannelKind, ChannelSendError};
use async_trait::async_trait;

/// 通知消息结构，每个渠道各一份
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationMessage {
    /// 消息标题
    pub subject: String,
    /// 消息内容
    pub body: String,
}

/// 通知渠道trait
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// 渠道类型
    fn kind(&self) -> ChannelKind;

    /// 发送一条消息
    ///
    /// # 参数
    /// * `message` - 已渲染的通知消息
    ///
    /// # 返回
    /// * `Result<(), ChannelSendError>` - 发送结果
    async fn send(&self, message: &NotificationMessage) -> Result<(), ChannelSendError>;
}
