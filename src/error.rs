//! 错误处理模块
//!
//! 定义应用程序的统一错误类型

use std::fmt;
use thiserror::Error;

/// Slot Watcher 单次轮询迭代的错误类型
#[derive(Error, Debug)]
pub enum MonitorError {
    /// 配置相关错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 探测请求错误
    #[error("网络错误: {0}")]
    Network(#[from] NetworkError),

    /// 通知相关错误
    #[error("通知错误: {0}")]
    Notification(#[from] NotificationError),
}

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 必需的环境变量缺失
    #[error("缺少环境变量: {}", vars.join(", "))]
    Missing { vars: Vec<String> },

    /// 配置验证错误
    #[error("配置验证失败: {0}")]
    Invalid(String),

    /// 配置文件解析错误
    #[error("配置文件解析失败: {0}")]
    Parse(String),

    /// 配置文件不存在
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    /// 环境变量替换错误
    #[error("环境变量替换失败: {var}")]
    EnvVar { var: String },
}

/// 探测请求错误类型
#[derive(Error, Debug)]
pub enum NetworkError {
    /// 请求超时
    #[error("请求超时: {url}")]
    Timeout { url: String },

    /// 连接失败
    #[error("连接失败: {url} ({reason})")]
    Connection { url: String, reason: String },

    /// 重定向次数超过上限
    #[error("重定向次数过多: {url}")]
    TooManyRedirects { url: String },

    /// 最终响应不是2xx
    #[error("HTTP {status}: {url}")]
    UnexpectedStatus { url: String, status: u16 },

    /// 其他传输层错误
    #[error("请求失败: {0}")]
    Request(String),

    /// HTTP客户端创建失败
    #[error("创建HTTP客户端失败: {0}")]
    Client(String),
}

/// 通知渠道
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// 邮件
    Email,
    /// Telegram 机器人
    Telegram,
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelKind::Email => write!(f, "email"),
            ChannelKind::Telegram => write!(f, "telegram"),
        }
    }
}

/// 单个渠道的发送错误
#[derive(Error, Debug)]
pub enum ChannelSendError {
    /// 邮件服务商拒绝了登录凭据
    #[error("邮件认证失败: 凭据无效，请重新生成应用专用密码并更新 EMAIL_PASS (原始错误: {raw})")]
    EmailAuth { raw: String },

    /// 其他发送失败，保留原始信息
    #[error("{channel} 发送失败: {message}")]
    Send { channel: ChannelKind, message: String },
}

impl ChannelSendError {
    /// 创建普通发送错误
    pub fn send(channel: ChannelKind, message: impl Into<String>) -> Self {
        Self::Send {
            channel,
            message: message.into(),
        }
    }

    /// 出错的渠道
    pub fn channel(&self) -> ChannelKind {
        match self {
            Self::EmailAuth { .. } => ChannelKind::Email,
            Self::Send { channel, .. } => *channel,
        }
    }
}

/// 通知错误类型
#[derive(Error, Debug)]
pub enum NotificationError {
    /// 所有渠道均发送失败
    #[error("所有通知渠道均发送失败 (email: {email}; telegram: {telegram})")]
    AllChannelsFailed {
        email: ChannelSendError,
        telegram: ChannelSendError,
    },

    /// 模板渲染错误
    #[error("模板渲染失败: {0}")]
    Template(String),
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, MonitorError>;
