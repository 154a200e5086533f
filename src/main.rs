//! Slot Watcher 主程序入口
//!
//! 预约页面监控工具

use anyhow::{Context, Result};
use clap::Parser;
use slot_watcher::cli::Args;
use slot_watcher::config::ConfigLoader;
use slot_watcher::logging::{LogConfig, LoggingSystem};
use slot_watcher::monitor::{Monitor, RunMode, RunReport};
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // 解析命令行参数
    let args = Args::parse();

    // 初始化日志系统
    let log_config = LogConfig {
        level: args.log_level.clone().into(),
        json_format: args.json_logs,
        ..Default::default()
    };

    let logging = match LoggingSystem::setup_logging(log_config) {
        Ok(logging) => logging,
        Err(e) => {
            eprintln!("初始化日志系统失败: {e:#}");
            std::process::exit(1);
        }
    };

    info!(
        "Slot Watcher v{} 启动，日志级别: {}",
        slot_watcher::VERSION,
        logging.config().level
    );

    match execute(&args).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("运行失败: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// 加载配置并按运行模式执行，返回进程退出码
async fn execute(args: &Args) -> Result<i32> {
    let mode = args.run_mode();

    let config = ConfigLoader::new(true)
        .load(args.config.as_deref())
        .await
        .context("加载配置失败")?;

    info!(
        "配置加载完成，目标: {}，通知邮箱: {}",
        config.settings.target.url, config.email.to
    );

    let monitor = Monitor::from_config(&config).context("初始化监控器失败")?;

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

    // 设置Ctrl+C信号处理
    let shutdown_tx_clone = shutdown_tx.clone();
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                info!("收到中断信号，正在停止监控...");
                let _ = shutdown_tx_clone.send(());
            }
            Err(err) => {
                error!("监听中断信号失败: {}", err);
            }
        }
    });

    let report = monitor.run(mode, shutdown_rx).await;
    Ok(exit_code(mode, &report))
}

/// 根据运行模式和运行统计计算退出码
///
/// 自检模式下没有任何渠道送达时返回1，其余情况返回0
fn exit_code(mode: RunMode, report: &RunReport) -> i32 {
    if mode == RunMode::SelfTest && report.deliveries == 0 {
        warn!("自检失败：测试通知未能送达任何渠道");
        return 1;
    }

    0
}
