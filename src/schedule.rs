//! 轮询调度策略
//!
//! 根据本地时间的小时数决定下一次轮询前的等待时间

use crate::config::ScheduleSettings;
use chrono::Timelike;
use std::time::Duration;

/// 昼夜两档的轮询间隔策略
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulePolicy {
    night_interval: Duration,
    day_interval: Duration,
    night_start_hour: u32,
    night_end_hour: u32,
}

impl Default for SchedulePolicy {
    fn default() -> Self {
        Self::from_settings(&ScheduleSettings::default())
    }
}

impl SchedulePolicy {
    /// 从调度配置创建策略
    pub fn from_settings(settings: &ScheduleSettings) -> Self {
        Self {
            night_interval: Duration::from_secs(settings.night_interval_seconds),
            day_interval: Duration::from_secs(settings.day_interval_seconds),
            night_start_hour: settings.night_start_hour,
            night_end_hour: settings.night_end_hour,
        }
    }

    /// 小时数是否落在夜间时段 `[start, end)`
    pub fn is_night(&self, hour: u32) -> bool {
        (self.night_start_hour..self.night_end_hour).contains(&hour)
    }

    /// 计算下一次轮询前的等待时间
    ///
    /// # 参数
    /// * `now` - 当前时间，调用方负责传入本地时间
    ///
    /// # 返回
    /// * `Duration` - 夜间返回夜间间隔，否则返回白天间隔
    pub fn next_interval<T: Timelike>(&self, now: &T) -> Duration {
        if self.is_night(now.hour()) {
            self.night_interval
        } else {
            self.day_interval
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate, TimeZone};

    fn at_hour(hour: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(hour, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_night_and_day_boundaries() {
        let policy = SchedulePolicy::default();
        let night = Duration::from_secs(60);
        let day = Duration::from_secs(600);

        assert_eq!(policy.next_interval(&at_hour(0)), night);
        assert_eq!(policy.next_interval(&at_hour(6)), night);
        assert_eq!(policy.next_interval(&at_hour(7)), day);
        assert_eq!(policy.next_interval(&at_hour(12)), day);
        assert_eq!(policy.next_interval(&at_hour(23)), day);
    }

    #[test]
    fn test_every_hour_of_the_day() {
        let policy = SchedulePolicy::default();
        for hour in 0..24 {
            let expected = if hour < 7 { 60 } else { 600 };
            assert_eq!(
                policy.next_interval(&at_hour(hour)),
                Duration::from_secs(expected),
                "hour {hour}"
            );
        }
    }

    #[test]
    fn test_uses_hour_of_the_given_timezone() {
        let policy = SchedulePolicy::default();
        // 03:00 UTC-3 即 06:00 UTC，两者都属于夜间；09:00 UTC-3 为白天
        let buenos_aires = FixedOffset::west_opt(3 * 3600).unwrap();
        let early = buenos_aires.with_ymd_and_hms(2025, 3, 14, 3, 0, 0).unwrap();
        let morning = buenos_aires.with_ymd_and_hms(2025, 3, 14, 9, 0, 0).unwrap();

        assert_eq!(policy.next_interval(&early), Duration::from_secs(60));
        assert_eq!(policy.next_interval(&morning), Duration::from_secs(600));
    }

    #[test]
    fn test_custom_window() {
        let settings = ScheduleSettings {
            night_interval_seconds: 15,
            day_interval_seconds: 120,
            night_start_hour: 22,
            night_end_hour: 24,
            error_retry_interval_seconds: 60,
        };
        let policy = SchedulePolicy::from_settings(&settings);

        assert_eq!(policy.next_interval(&at_hour(21)), Duration::from_secs(120));
        assert_eq!(policy.next_interval(&at_hour(22)), Duration::from_secs(15));
        assert_eq!(policy.next_interval(&at_hour(23)), Duration::from_secs(15));
        assert_eq!(policy.next_interval(&at_hour(3)), Duration::from_secs(120));
    }
}
