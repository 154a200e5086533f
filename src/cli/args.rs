//! 命令行参数定义
//!
//! 使用clap定义应用程序的命令行接口

use crate::monitor::RunMode;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Slot Watcher - 预约页面监控工具
#[derive(Parser, Debug, Clone)]
#[command(
    name = "slot-watcher",
    version = crate::VERSION,
    about = crate::APP_DESCRIPTION,
    long_about = None
)]
pub struct Args {
    /// 探测一次并无条件发送测试通知，然后退出
    #[arg(long, help = "探测一次并无条件发送测试通知，然后退出")]
    pub self_test: bool,

    /// 探测一次，必要时发送通知，然后退出
    #[arg(long, help = "探测一次，必要时发送通知，然后退出")]
    pub check_once: bool,

    /// 配置文件路径
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "配置文件路径（可选，覆盖目标与调度配置）",
        env = "SLOT_WATCHER_CONFIG"
    )]
    pub config: Option<PathBuf>,

    /// 日志级别
    #[arg(
        short,
        long,
        value_enum,
        default_value = "info",
        help = "日志级别",
        env = "SLOT_WATCHER_LOG_LEVEL"
    )]
    pub log_level: LogLevel,

    /// 以JSON格式输出日志
    #[arg(long, help = "以JSON格式输出日志", env = "SLOT_WATCHER_JSON_LOGS")]
    pub json_logs: bool,
}

/// 日志级别枚举
#[derive(ValueEnum, Clone, Debug, PartialEq)]
pub enum LogLevel {
    /// 调试级别
    Debug,
    /// 信息级别
    Info,
    /// 警告级别
    Warn,
    /// 错误级别
    Error,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

impl Args {
    /// 解析运行模式，`--self-test` 优先于 `--check-once`
    pub fn run_mode(&self) -> RunMode {
        if self.self_test {
            RunMode::SelfTest
        } else if self.check_once {
            RunMode::CheckOnce
        } else {
            RunMode::Continuous
        }
    }
}
