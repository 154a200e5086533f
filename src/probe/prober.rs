//! HTTP探测器实现
//!
//! 对目标页面发起一次GET请求，跟随重定向，返回最终落地的URL

use crate::config::TargetSettings;
use crate::error::NetworkError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{redirect, Client};
use std::time::{Duration, Instant};
use tracing::debug;

/// 单次探测的结果
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResult {
    /// 跟随重定向后的最终URL
    pub final_url: String,
    /// 最终响应的状态码
    pub status_code: u16,
    /// 响应时间
    pub response_time: Duration,
}

impl ProbeResult {
    /// 获取响应时间（毫秒）
    pub fn response_time_ms(&self) -> u64 {
        self.response_time.as_millis() as u64
    }
}

/// 探测器trait，定义探测接口
#[async_trait]
pub trait Prober: Send + Sync {
    /// 执行一次探测
    ///
    /// # 返回
    /// * `Result<ProbeResult, NetworkError>` - 探测结果，网络错误原样上报
    async fn probe(&self) -> Result<ProbeResult, NetworkError>;
}

/// 基于reqwest的HTTP探测器
pub struct HttpProber {
    /// HTTP客户端
    client: Client,
    /// 目标URL
    url: String,
}

impl HttpProber {
    /// 创建新的HTTP探测器
    ///
    /// # 参数
    /// * `target` - 目标配置（URL、请求头、超时、重定向上限）
    ///
    /// # 返回
    /// * `Result<Self, NetworkError>` - 探测器实例
    pub fn new(target: &TargetSettings) -> Result<Self, NetworkError> {
        let mut headers = HeaderMap::new();
        for (key, value) in &target.headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| NetworkError::Client(format!("无效的请求头 {key}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| NetworkError::Client(format!("无效的请求头值 {key}: {e}")))?;
            headers.insert(name, value);
        }

        let client = Client::builder()
            .redirect(redirect::Policy::limited(target.max_redirects))
            .timeout(target.request_timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| NetworkError::Client(e.to_string()))?;

        Ok(Self {
            client,
            url: target.url.clone(),
        })
    }

    /// 将reqwest错误归类为网络错误，保留原始信息
    fn classify_error(&self, error: reqwest::Error) -> NetworkError {
        let url = error
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|| self.url.clone());

        if error.is_timeout() {
            NetworkError::Timeout { url }
        } else if error.is_redirect() {
            NetworkError::TooManyRedirects { url }
        } else if error.is_connect() {
            NetworkError::Connection {
                url,
                reason: error_chain(&error),
            }
        } else if let Some(status) = error.status() {
            NetworkError::UnexpectedStatus {
                url,
                status: status.as_u16(),
            }
        } else {
            NetworkError::Request(error_chain(&error))
        }
    }
}

/// 拼接错误链，reqwest的顶层信息通常不包含DNS/TLS等根因
fn error_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self) -> Result<ProbeResult, NetworkError> {
        let start_time = Instant::now();

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.classify_error(e))?;

        let response_time = start_time.elapsed();
        let status = response.status();
        let final_url = response.url().to_string();

        debug!(
            "探测响应: HTTP {} {} ({}ms)",
            status.as_u16(),
            final_url,
            response_time.as_millis()
        );

        if !status.is_success() {
            return Err(NetworkError::UnexpectedStatus {
                url: final_url,
                status: status.as_u16(),
            });
        }

        Ok(ProbeResult {
            final_url,
            status_code: status.as_u16(),
            response_time,
        })
    }
}
