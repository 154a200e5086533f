//! 通知模块
//!
//! 提供邮件、Telegram通知渠道、消息模板和双渠道分发功能

pub mod dispatcher;
pub mod email;
pub mod sender;
pub mod telegram;
pub mod template;

// 重新导出主要类型
pub use dispatcher::{DeliverySummary, NotificationDispatcher};
pub use email::EmailChannel;
pub use sender::{NotificationChannel, NotificationMessage};
pub use telegram::TelegramChannel;
pub use template::{AlertContext, MessageComposer};
