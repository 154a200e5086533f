//! 配置管理模块
//!
//! 提供环境变量读取、配置文件解析和验证功能

pub mod loader;
pub mod types;

// 重新导出主要类型
pub use loader::{ConfigLoader, REQUIRED_ENV_VARS};
pub use types::{
    EmailConfig, MonitorConfig, MonitorSettings, ScheduleSettings, TargetSettings,
    TelegramConfig,
};
