//! Slot Watcher - 预约页面监控工具
//!
//! 定时请求预约页面，跟随重定向后与"无可用预约"页面比较，
//! 不一致时同时通过邮件和Telegram发送通知：
//! - 昼夜两档轮询间隔
//! - 出错后固定间隔重试
//! - 双渠道并发发送，允许部分失败
//! - 结构化日志记录

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod monitor;
pub mod notification;
pub mod probe;
pub mod schedule;

// 重新导出主要类型
pub use config::MonitorConfig;
pub use error::MonitorError;
pub use monitor::{Monitor, RunMode, RunReport};

/// 应用程序版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 应用程序名称
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// 应用程序描述
pub const APP_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
