//! 探测模块
//!
//! 提供目标页面的HTTP探测功能

pub mod prober;

// 重新导出主要类型
pub use prober::{HttpProber, ProbeResult, Prober};
