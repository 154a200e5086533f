//! 消息模板模块
//!
//! 使用Handlebars渲染邮件与Telegram的通知内容

use crate::error::NotificationError;
use crate::notification::sender::NotificationMessage;
use chrono::{DateTime, SecondsFormat, Utc};
use handlebars::Handlebars;
use serde::Serialize;

const EMAIL_SUBJECT: &str = "email_subject";
const EMAIL_BODY: &str = "email_body";
const TELEGRAM_TEXT: &str = "telegram_text";

/// 通知标题
pub const ALERT_HEADLINE: &str = "🚨 Possível turno disponível!";

/// 模板上下文数据
#[derive(Debug, Clone, Serialize)]
pub struct AlertContext {
    /// 监控的URL
    pub target_url: String,
    /// 探测到的最终URL
    pub final_url: String,
    /// 检测时间（ISO-8601，UTC）
    pub detected_at: String,
    /// 标题
    pub headline: String,
}

impl AlertContext {
    /// 创建模板上下文
    pub fn new(target_url: &str, final_url: &str, detected_at: DateTime<Utc>) -> Self {
        Self {
            target_url: target_url.to_string(),
            final_url: final_url.to_string(),
            detected_at: detected_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            headline: ALERT_HEADLINE.to_string(),
        }
    }
}

/// 默认的邮件正文模板
pub fn default_email_template() -> String {
    r#"A URL final retornada foi diferente da URL de bloqueio.

URL monitorada: {{target_url}}
URL final: {{final_url}}

Detectado em: {{detected_at}}"#
        .to_string()
}

/// 默认的Telegram消息模板（Markdown）
pub fn default_telegram_template() -> String {
    r#"🚨 *Possível turno disponível!*

A URL final retornada foi diferente da URL de bloqueio.
URL monitorada: {{target_url}}
URL final: {{final_url}}
Detectado em: {{detected_at}}"#
        .to_string()
}

/// 通知消息生成器
pub struct MessageComposer {
    registry: Handlebars<'static>,
}

impl MessageComposer {
    /// 使用默认模板创建生成器
    pub fn new() -> Result<Self, NotificationError> {
        Self::with_templates(&default_email_template(), &default_telegram_template())
    }

    /// 使用自定义模板创建生成器
    ///
    /// # 参数
    /// * `email_body` - 邮件正文模板
    /// * `telegram_text` - Telegram消息模板
    ///
    /// # 返回
    /// * `Result<Self, NotificationError>` - 模板语法错误时返回错误
    pub fn with_templates(email_body: &str, telegram_text: &str) -> Result<Self, NotificationError> {
        let mut registry = Handlebars::new();
        // 纯文本与Markdown，不做HTML转义
        registry.register_escape_fn(handlebars::no_escape);
        registry.set_strict_mode(true);

        for (name, template) in [
            (EMAIL_SUBJECT, "{{headline}}"),
            (EMAIL_BODY, email_body),
            (TELEGRAM_TEXT, telegram_text),
        ] {
            registry
                .register_template_string(name, template)
                .map_err(|e| NotificationError::Template(e.to_string()))?;
        }

        Ok(Self { registry })
    }

    fn render(&self, name: &str, context: &AlertContext) -> Result<String, NotificationError> {
        self.registry
            .render(name, context)
            .map_err(|e| NotificationError::Template(e.to_string()))
    }

    /// 生成邮件消息
    pub fn email(&self, context: &AlertContext) -> Result<NotificationMessage, NotificationError> {
        Ok(NotificationMessage {
            subject: self.render(EMAIL_SUBJECT, context)?,
            body: self.render(EMAIL_BODY, context)?,
        })
    }

    /// 生成Telegram消息，标题已包含在正文中
    pub fn telegram(&self, context: &AlertContext) -> Result<NotificationMessage, NotificationError> {
        Ok(NotificationMessage {
            subject: context.headline.clone(),
            body: self.render(TELEGRAM_TEXT, context)?,
        })
    }
}
