//! 配置加载器实现
//!
//! 从环境变量读取凭据，从可选的TOML文件读取目标与调度配置，
//! 支持 `${VAR}` 形式的环境变量替换

use crate::config::types::{
    sanitize_app_password, validate_email, validate_settings, EmailConfig, MonitorConfig,
    MonitorSettings, TelegramConfig, DEFAULT_SMTP_HOST, DEFAULT_TELEGRAM_API_URL,
};
use crate::error::ConfigError;
use regex::Regex;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// 必需的环境变量
pub const REQUIRED_ENV_VARS: [&str; 5] = [
    "EMAIL_USER",
    "EMAIL_PASS",
    "EMAIL_TO",
    "TELEGRAM_TOKEN",
    "TELEGRAM_CHAT_ID",
];

/// 通知渠道的发送超时
const CHANNEL_TIMEOUT: Duration = Duration::from_secs(20);

/// 配置加载器
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// 是否启用环境变量替换
    enable_env_substitution: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ConfigLoader {
    /// 创建新的配置加载器
    ///
    /// # 参数
    /// * `enable_env_substitution` - 是否在配置文件中启用环境变量替换
    pub fn new(enable_env_substitution: bool) -> Self {
        Self {
            enable_env_substitution,
        }
    }

    /// 加载完整配置
    ///
    /// 先读取 `.env`（如果存在），再读取进程环境变量和可选的配置文件。
    ///
    /// # 参数
    /// * `path` - 可选的TOML配置文件路径
    ///
    /// # 返回
    /// * `Result<MonitorConfig, ConfigError>` - 验证后的配置
    pub async fn load(&self, path: Option<&Path>) -> Result<MonitorConfig, ConfigError> {
        if let Ok(env_file) = dotenvy::dotenv() {
            debug!("已加载环境文件: {}", env_file.display());
        }

        let settings = match path {
            Some(path) => self.load_settings_from_file(path).await?,
            None => MonitorSettings::default(),
        };

        Self::build_config(settings, |name| std::env::var(name).ok())
    }

    /// 从文件加载非敏感配置
    pub async fn load_settings_from_file(&self, path: &Path) -> Result<MonitorSettings, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            });
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ConfigError::Parse(format!("读取文件失败: {e}")))?;

        let settings = self.load_settings_from_str(&content)?;
        info!("成功加载配置文件: {}", path.display());
        Ok(settings)
    }

    /// 从字符串解析非敏感配置
    pub fn load_settings_from_str(&self, content: &str) -> Result<MonitorSettings, ConfigError> {
        let processed = self.substitute_env_vars(content)?;

        let settings: MonitorSettings = toml::from_str(&processed)
            .map_err(|e| ConfigError::Parse(format!("TOML解析失败: {e}")))?;

        validate_settings(&settings).map_err(ConfigError::Invalid)?;
        debug!("配置内容: {:?}", settings);
        Ok(settings)
    }

    /// 组合非敏感配置与环境中的凭据
    ///
    /// # 参数
    /// * `settings` - 已验证的非敏感配置
    /// * `lookup` - 变量查找函数，生产环境为 `std::env::var`
    ///
    /// # 返回
    /// * `Result<MonitorConfig, ConfigError>` - 完整配置；缺失的变量一次性全部报告
    pub fn build_config<F>(settings: MonitorSettings, lookup: F) -> Result<MonitorConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // 只含空白的值与未设置同样视为缺失
        let value = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let missing: Vec<String> = REQUIRED_ENV_VARS
            .iter()
            .filter(|name| value(name).is_none())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::Missing { vars: missing });
        }

        let required = |name: &str| value(name).unwrap_or_default().trim().to_string();

        let email = EmailConfig {
            user: required("EMAIL_USER"),
            password: sanitize_app_password(&required("EMAIL_PASS")),
            to: required("EMAIL_TO"),
            smtp_host: value("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
            timeout: CHANNEL_TIMEOUT,
        };
        validate_email(&email).map_err(ConfigError::Invalid)?;

        let telegram = TelegramConfig {
            token: required("TELEGRAM_TOKEN"),
            chat_id: required("TELEGRAM_CHAT_ID"),
            api_url: value("TELEGRAM_API_URL")
                .unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            timeout: CHANNEL_TIMEOUT,
        };

        Ok(MonitorConfig {
            settings,
            email,
            telegram,
        })
    }

    /// 替换字符串中的环境变量
    ///
    /// # 参数
    /// * `content` - 要处理的字符串
    ///
    /// # 返回
    /// * `Result<String, ConfigError>` - 替换后的字符串或错误
    fn substitute_env_vars(&self, content: &str) -> Result<String, ConfigError> {
        if !self.enable_env_substitution {
            return Ok(content.to_string());
        }

        // 匹配 ${VAR_NAME} 格式的环境变量
        let env_var_regex = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
            .map_err(|e| ConfigError::Parse(format!("正则表达式错误: {e}")))?;

        let mut missing = None;
        let result = env_var_regex.replace_all(content, |captures: &regex::Captures<'_>| {
            let var_name = &captures[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    missing.get_or_insert_with(|| var_name.to_string());
                    String::new()
                }
            }
        });

        match missing {
            Some(var) => Err(ConfigError::EnvVar { var }),
            None => Ok(result.into_owned()),
        }
    }
}
