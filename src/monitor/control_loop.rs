//! 监控主循环
//!
//! 探测 → 比较 → 通知 → 休眠 的状态机。每次迭代都从 `Polling` 重新开始，
//! 迭代之间不保存任何状态。

use crate::config::{MonitorConfig, MonitorSettings};
use crate::error::MonitorError;
use crate::notification::{
    DeliverySummary, EmailChannel, MessageComposer, NotificationDispatcher, TelegramChannel,
};
use crate::probe::{HttpProber, ProbeResult, Prober};
use crate::schedule::SchedulePolicy;
use chrono::{DateTime, Local};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// 运行模式，启动时确定一次
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// 持续监控，直到进程被终止
    Continuous,
    /// 探测一次，按比较结果决定是否通知，然后退出
    CheckOnce,
    /// 探测一次并无条件发送通知，用于验证通知渠道，然后退出
    SelfTest,
}

impl RunMode {
    /// 是否为单次运行模式
    pub fn is_single_pass(&self) -> bool {
        !matches!(self, RunMode::Continuous)
    }
}

/// 循环的阶段
#[derive(Debug)]
pub enum Phase {
    /// 发起探测
    Polling,
    /// 将最终URL与封锁URL比较
    Comparing(ProbeResult),
    /// 发送通知
    Notifying { final_url: String },
    /// 按调度策略等待
    Sleeping(Duration),
    /// 探测或通知失败
    ErrorBackoff(MonitorError),
    /// 单次模式结束
    Done,
}

/// 运行统计
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    /// 探测次数
    pub probes: u32,
    /// 通知尝试次数
    pub notifications: u32,
    /// 至少一个渠道送达的通知次数
    pub deliveries: u32,
    /// 进入错误退避的次数
    pub errors: u32,
    /// 最近一次通知的投递结果
    pub last_delivery: Option<DeliverySummary>,
}

/// 本地时钟，决定每次迭代后的轮询间隔
pub type Clock = Arc<dyn Fn() -> DateTime<Local> + Send + Sync>;

/// 监控器
pub struct Monitor {
    /// 探测器
    prober: Arc<dyn Prober>,
    /// 通知分发器
    dispatcher: NotificationDispatcher,
    /// 表示无可用预约的URL
    blocked_url: String,
    /// 轮询间隔策略
    schedule: SchedulePolicy,
    /// 出错后的重试间隔
    error_retry_interval: Duration,
    /// 本地时钟
    clock: Clock,
}

impl Monitor {
    /// 创建新的监控器
    ///
    /// # 参数
    /// * `prober` - 探测器
    /// * `dispatcher` - 通知分发器
    /// * `settings` - 目标与调度配置
    pub fn new(
        prober: Arc<dyn Prober>,
        dispatcher: NotificationDispatcher,
        settings: &MonitorSettings,
    ) -> Self {
        Self {
            prober,
            dispatcher,
            blocked_url: settings.target.blocked_url.clone(),
            schedule: SchedulePolicy::from_settings(&settings.schedule),
            error_retry_interval: settings.schedule.error_retry_interval(),
            clock: Arc::new(Local::now),
        }
    }

    /// 替换本地时钟
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// 根据完整配置创建真实的探测器与通知渠道
    pub fn from_config(config: &MonitorConfig) -> Result<Self, MonitorError> {
        let prober = HttpProber::new(&config.settings.target)?;
        let email = EmailChannel::new(&config.email)?;
        let telegram = TelegramChannel::new(&config.telegram)?;
        let dispatcher = NotificationDispatcher::new(
            Arc::new(email),
            Arc::new(telegram),
            MessageComposer::new()?,
            config.settings.target.url.clone(),
        );

        Ok(Self::new(Arc::new(prober), dispatcher, &config.settings))
    }

    /// 最终URL是否为封锁页面（精确字符串比较）
    pub fn is_blocked(&self, final_url: &str) -> bool {
        final_url == self.blocked_url
    }

    /// 运行监控
    ///
    /// 持续模式下只在收到停止信号（或发送端全部关闭）时返回；
    /// 停止信号只会打断等待，不会中断进行中的探测或发送。
    ///
    /// # 参数
    /// * `mode` - 运行模式
    /// * `shutdown` - 停止信号接收器
    ///
    /// # 返回
    /// * `RunReport` - 运行统计
    pub async fn run(&self, mode: RunMode, mut shutdown: broadcast::Receiver<()>) -> RunReport {
        info!("监控已启动 ({:?})，目标: {}", mode, self.dispatcher.target_url());

        let mut report = RunReport::default();
        let mut phase = Phase::Polling;

        loop {
            phase = match phase {
                Phase::Done => break,
                Phase::Sleeping(delay) => {
                    if !Self::wait(delay, &mut shutdown).await {
                        break;
                    }
                    Phase::Polling
                }
                other => self.step(other, mode, &mut report).await,
            };
        }

        info!(
            "监控结束: 探测 {} 次，通知 {} 次，送达 {} 次，错误 {} 次",
            report.probes, report.notifications, report.deliveries, report.errors
        );
        report
    }

    /// 执行一次状态转换
    ///
    /// `Sleeping` 和 `Done` 由 [`Monitor::run`] 处理，这里原样返回。
    pub async fn step(&self, phase: Phase, mode: RunMode, report: &mut RunReport) -> Phase {
        match phase {
            Phase::Polling => {
                report.probes += 1;
                match self.prober.probe().await {
                    Ok(result) => {
                        info!(
                            "检测完成，最终URL: {} ({}ms)",
                            result.final_url,
                            result.response_time_ms()
                        );
                        Phase::Comparing(result)
                    }
                    Err(e) => Phase::ErrorBackoff(e.into()),
                }
            }
            Phase::Comparing(result) => {
                if mode == RunMode::SelfTest {
                    info!("自检模式: 忽略比较结果，发送测试通知");
                    Phase::Notifying {
                        final_url: result.final_url,
                    }
                } else if self.is_blocked(&result.final_url) {
                    debug!("最终URL与封锁页面一致，暂无可用预约");
                    self.after_iteration(mode)
                } else {
                    warn!("最终URL与封锁页面不同，立即发送通知");
                    Phase::Notifying {
                        final_url: result.final_url,
                    }
                }
            }
            Phase::Notifying { final_url } => {
                report.notifications += 1;
                match self.dispatcher.notify(&final_url).await {
                    Ok(summary) => {
                        report.deliveries += 1;
                        report.last_delivery = Some(summary);
                        self.after_iteration(mode)
                    }
                    Err(e) => Phase::ErrorBackoff(e.into()),
                }
            }
            Phase::ErrorBackoff(e) => {
                report.errors += 1;
                error!("网络/执行错误: {}", e);
                if mode.is_single_pass() {
                    Phase::Done
                } else {
                    warn!(
                        "等待 {} 秒后重试",
                        self.error_retry_interval.as_secs()
                    );
                    Phase::Sleeping(self.error_retry_interval)
                }
            }
            phase @ (Phase::Sleeping(_) | Phase::Done) => phase,
        }
    }

    /// 一次迭代正常结束后的下一阶段
    fn after_iteration(&self, mode: RunMode) -> Phase {
        if mode.is_single_pass() {
            return Phase::Done;
        }

        let delay = self.schedule.next_interval(&(self.clock)());
        info!("下一次检测将在 {} 秒后进行", delay.as_secs());
        Phase::Sleeping(delay)
    }

    /// 等待指定时间，收到停止信号时返回 `false`
    async fn wait(delay: Duration, shutdown: &mut broadcast::Receiver<()>) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(delay) => true,
            _ = shutdown.recv() => {
                info!("收到停止信号，退出监控循环");
                false
            }
        }
    }
}
