//! 监控模块
//!
//! 提供探测、比较、通知、休眠的主循环

pub mod control_loop;

// 重新导出主要类型
pub use control_loop::{Clock, Monitor, Phase, RunMode, RunReport};
