//! 配置数据结构定义
//!
//! 定义监控目标、调度间隔和通知渠道的配置结构体及验证逻辑

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// 监控的预约页面
pub const DEFAULT_TARGET_URL: &str = "https://titulosvalidez.educacion.gob.ar/validez/detitulos/";

/// "没有可用预约"时最终跳转到的页面
pub const DEFAULT_BLOCKED_URL: &str = "https://titulosvalidez.educacion.gob.ar/validez/detitulos/noaccess.php?sinT=1&msj=Lamentablemente+no+hay+turnos+disponibles+debido+al+alto+nivel+de+demanda.%0APor+favor%2C+vuelva+a+intentar+en+otro+momento.";

/// 默认SMTP中继（Gmail）
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";

/// 默认Telegram Bot API地址
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// 应用专用密码清洗后的最小长度
pub const MIN_APP_PASSWORD_LEN: usize = 16;

/// 完整的运行配置，启动时构建一次，之后只读
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// 目标与调度（非敏感，可来自配置文件）
    pub settings: MonitorSettings,
    /// 邮件渠道
    pub email: EmailConfig,
    /// Telegram渠道
    pub telegram: TelegramConfig,
}

/// 非敏感配置，可通过TOML文件覆盖
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MonitorSettings {
    /// 探测目标
    #[serde(default)]
    pub target: TargetSettings,
    /// 轮询间隔
    #[serde(default)]
    pub schedule: ScheduleSettings,
}

/// 探测目标配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TargetSettings {
    /// 轮询的URL
    #[serde(default = "default_target_url")]
    pub url: String,
    /// 表示"无可用预约"的最终URL
    #[serde(default = "default_blocked_url")]
    pub blocked_url: String,
    /// 请求头
    #[serde(default = "default_headers")]
    pub headers: BTreeMap<String, String>,
    /// 最大重定向次数
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    /// 请求超时时间（秒）
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for TargetSettings {
    fn default() -> Self {
        Self {
            url: default_target_url(),
            blocked_url: default_blocked_url(),
            headers: default_headers(),
            max_redirects: default_max_redirects(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl TargetSettings {
    /// 请求超时
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

/// 轮询间隔配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScheduleSettings {
    /// 夜间轮询间隔（秒）
    #[serde(default = "default_night_interval")]
    pub night_interval_seconds: u64,
    /// 白天轮询间隔（秒）
    #[serde(default = "default_day_interval")]
    pub day_interval_seconds: u64,
    /// 夜间时段起点（含），本地时间小时
    #[serde(default)]
    pub night_start_hour: u32,
    /// 夜间时段终点（不含），本地时间小时
    #[serde(default = "default_night_end_hour")]
    pub night_end_hour: u32,
    /// 出错后的重试间隔（秒）
    #[serde(default = "default_error_retry_interval")]
    pub error_retry_interval_seconds: u64,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            night_interval_seconds: default_night_interval(),
            day_interval_seconds: default_day_interval(),
            night_start_hour: 0,
            night_end_hour: default_night_end_hour(),
            error_retry_interval_seconds: default_error_retry_interval(),
        }
    }
}

impl ScheduleSettings {
    /// 出错后的重试间隔
    pub fn error_retry_interval(&self) -> Duration {
        Duration::from_secs(self.error_retry_interval_seconds)
    }
}

/// 邮件渠道配置
#[derive(Clone)]
pub struct EmailConfig {
    /// 发件账号
    pub user: String,
    /// 清洗后的应用专用密码
    pub password: String,
    /// 收件地址
    pub to: String,
    /// SMTP中继主机
    pub smtp_host: String,
    /// 发送超时
    pub timeout: Duration,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("user", &self.user)
            .field("password", &"***")
            .field("to", &self.to)
            .field("smtp_host", &self.smtp_host)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Telegram渠道配置
#[derive(Clone)]
pub struct TelegramConfig {
    /// 机器人token
    pub token: String,
    /// 目标会话ID
    pub chat_id: String,
    /// Bot API基础地址
    pub api_url: String,
    /// 请求超时
    pub timeout: Duration,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"***")
            .field("chat_id", &self.chat_id)
            .field("api_url", &self.api_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

// 默认值函数
fn default_target_url() -> String {
    DEFAULT_TARGET_URL.to_string()
}
fn default_blocked_url() -> String {
    DEFAULT_BLOCKED_URL.to_string()
}
fn default_max_redirects() -> usize {
    10
}
fn default_request_timeout() -> u64 {
    20
}
fn default_night_interval() -> u64 {
    60
}
fn default_day_interval() -> u64 {
    600
}
fn default_night_end_hour() -> u32 {
    7
}
fn default_error_retry_interval() -> u64 {
    60
}

/// 模拟浏览器的默认请求头
pub fn default_headers() -> BTreeMap<String, String> {
    [
        (
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8",
        ),
        (
            "Accept-Language",
            "pt-BR,pt;q=0.9,en-US;q=0.8,en;q=0.7,es;q=0.6",
        ),
        ("Cache-Control", "no-cache"),
        ("Connection", "keep-alive"),
        ("Pragma", "no-cache"),
        ("Upgrade-Insecure-Requests", "1"),
        (
            "User-Agent",
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
        ),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// 清洗应用专用密码
///
/// 去掉字面量 `\n`、首尾空白，再去掉内部所有空白字符。
/// Gmail 展示的应用专用密码形如 `abcd efgh ijkl mnop`。
pub fn sanitize_app_password(raw: &str) -> String {
    raw.replace("\\n", "")
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// 配置验证函数
///
/// # 参数
/// * `settings` - 要验证的非敏感配置
///
/// # 返回
/// * `Result<(), String>` - 验证结果，错误时返回错误信息
pub fn validate_settings(settings: &MonitorSettings) -> Result<(), String> {
    let target = &settings.target;
    for (name, url) in [("target.url", &target.url), ("target.blocked_url", &target.blocked_url)] {
        reqwest::Url::parse(url).map_err(|e| format!("{name} 不是有效的URL: {e}"))?;
    }

    if target.max_redirects == 0 {
        return Err("最大重定向次数不能为0".to_string());
    }

    if target.request_timeout_seconds == 0 {
        return Err("请求超时时间不能为0".to_string());
    }

    for (key, value) in &target.headers {
        reqwest::header::HeaderName::from_bytes(key.as_bytes())
            .map_err(|_| format!("无效的请求头名称: {key}"))?;
        reqwest::header::HeaderValue::from_str(value)
            .map_err(|_| format!("请求头 {key} 的值无效"))?;
    }

    let schedule = &settings.schedule;
    if schedule.night_interval_seconds == 0 || schedule.day_interval_seconds == 0 {
        return Err("轮询间隔不能为0".to_string());
    }

    if schedule.error_retry_interval_seconds == 0 {
        return Err("错误重试间隔不能为0".to_string());
    }

    if schedule.night_start_hour >= schedule.night_end_hour || schedule.night_end_hour > 24 {
        return Err(format!(
            "夜间时段无效: [{}, {})",
            schedule.night_start_hour, schedule.night_end_hour
        ));
    }

    Ok(())
}

/// 验证邮件凭据
pub fn validate_email(email: &EmailConfig) -> Result<(), String> {
    if !email.user.contains('@') {
        return Err("EMAIL_USER 必须是完整的邮箱地址（包含 @）".to_string());
    }

    if email.password.chars().count() < MIN_APP_PASSWORD_LEN {
        return Err(format!(
            "EMAIL_PASS 清洗后长度不足 {MIN_APP_PASSWORD_LEN} 个字符，请使用应用专用密码"
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(user: &str, password: &str) -> EmailConfig {
        EmailConfig {
            user: user.to_string(),
            password: password.to_string(),
            to: "ops@example.com".to_string(),
            smtp_host: DEFAULT_SMTP_HOST.to_string(),
            timeout: Duration::from_secs(20),
        }
    }

    #[test]
    fn test_default_settings_are_valid() {
        let settings = MonitorSettings::default();
        assert!(validate_settings(&settings).is_ok());
        assert_eq!(settings.target.max_redirects, 10);
        assert_eq!(settings.target.request_timeout(), Duration::from_secs(20));
        assert_eq!(settings.schedule.error_retry_interval(), Duration::from_secs(60));
        assert_eq!(settings.target.headers.len(), 7);
    }

    #[test]
    fn test_sanitize_app_password() {
        assert_eq!(sanitize_app_password("abcd efgh ijkl mnop"), "abcdefghijklmnop");
        assert_eq!(sanitize_app_password("  abcd\\nefgh ijkl\tmnop\\n "), "abcdefghijklmnop");
        assert_eq!(sanitize_app_password("\\n"), "");
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email(&email("me@gmail.com", "abcdefghijklmnop")).is_ok());
        assert!(validate_email(&email("me.gmail.com", "abcdefghijklmnop")).is_err());
        assert!(validate_email(&email("me@gmail.com", "short")).is_err());
    }

    #[test]
    fn test_invalid_night_window() {
        let mut settings = MonitorSettings::default();
        settings.schedule.night_start_hour = 7;
        settings.schedule.night_end_hour = 7;
        assert!(validate_settings(&settings).is_err());

        settings.schedule.night_start_hour = 22;
        settings.schedule.night_end_hour = 25;
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_zero_values_rejected() {
        let mut settings = MonitorSettings::default();
        settings.target.max_redirects = 0;
        assert!(validate_settings(&settings).is_err());

        let mut settings = MonitorSettings::default();
        settings.schedule.error_retry_interval_seconds = 0;
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_debug_hides_secrets() {
        let rendered = format!("{:?}", email("me@gmail.com", "abcdefghijklmnop"));
        assert!(!rendered.contains("abcdefghijklmnop"));
    }
}
