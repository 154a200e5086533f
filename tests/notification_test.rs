//! 通知链路集成测试
//!
//! 使用mock服务器同时模拟预约页面和Telegram Bot API，验证从探测到发送的完整流程

use async_trait::async_trait;
use slot_watcher::config::{MonitorSettings, TelegramConfig};
use slot_watcher::error::{ChannelKind, ChannelSendError};
use slot_watcher::monitor::{Monitor, RunMode};
use slot_watcher::notification::{
    MessageComposer, NotificationChannel, NotificationDispatcher, NotificationMessage,
    TelegramChannel,
};
use slot_watcher::probe::HttpProber;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// 始终失败的邮件渠道，模拟SMTP不可用
struct BrokenMailer;

#[async_trait]
impl NotificationChannel for BrokenMailer {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Email
    }

    async fn send(&self, _message: &NotificationMessage) -> Result<(), ChannelSendError> {
        Err(ChannelSendError::send(ChannelKind::Email, "connection refused"))
    }
}

fn monitor_for(server: &mockito::Server) -> Monitor {
    let mut settings = MonitorSettings::default();
    settings.target.url = format!("{}/turnos/", server.url());
    settings.target.blocked_url = format!("{}/turnos/noaccess.php", server.url());
    settings.target.request_timeout_seconds = 5;

    let prober = HttpProber::new(&settings.target).unwrap();
    let telegram = TelegramChannel::new(&TelegramConfig {
        token: "123:abc".to_string(),
        chat_id: "42".to_string(),
        api_url: server.url(),
        timeout: Duration::from_secs(5),
    })
    .unwrap();

    let dispatcher = NotificationDispatcher::new(
        Arc::new(BrokenMailer),
        Arc::new(telegram),
        MessageComposer::new().unwrap(),
        settings.target.url.clone(),
    );

    Monitor::new(Arc::new(prober), dispatcher, &settings)
}

#[tokio::test]
async fn test_open_page_reaches_telegram_when_email_fails() {
    let mut server = mockito::Server::new_async().await;
    let agenda = format!("{}/turnos/agenda.php", server.url());

    let _target = server
        .mock("GET", "/turnos/")
        .with_status(302)
        .with_header("location", &agenda)
        .create_async()
        .await;
    let _agenda = server
        .mock("GET", "/turnos/agenda.php")
        .with_status(200)
        .with_body("<html>agenda</html>")
        .create_async()
        .await;
    let telegram = server
        .mock("POST", "/bot123:abc/sendMessage")
        .match_body(mockito::Matcher::PartialJsonString(
            r#"{"chat_id":"42","parse_mode":"Markdown"}"#.to_string(),
        ))
        .with_status(200)
        .with_body(r#"{"ok":true,"result":{}}"#)
        .expect(1)
        .create_async()
        .await;

    let monitor = monitor_for(&server);
    let (_tx, rx) = broadcast::channel(1);
    let report = monitor.run(RunMode::CheckOnce, rx).await;

    telegram.assert_async().await;
    assert_eq!(report.probes, 1);
    assert_eq!(report.notifications, 1);
    assert_eq!(report.deliveries, 1);
    assert_eq!(report.errors, 0);
    let delivery = report.last_delivery.unwrap();
    assert!(!delivery.email);
    assert!(delivery.telegram);
}

#[tokio::test]
async fn test_blocked_page_sends_nothing() {
    let mut server = mockito::Server::new_async().await;
    let blocked = format!("{}/turnos/noaccess.php", server.url());

    let _target = server
        .mock("GET", "/turnos/")
        .with_status(302)
        .with_header("location", &blocked)
        .create_async()
        .await;
    let _blocked = server
        .mock("GET", "/turnos/noaccess.php")
        .with_status(200)
        .with_body("sin turnos")
        .create_async()
        .await;
    let telegram = server
        .mock("POST", "/bot123:abc/sendMessage")
        .expect(0)
        .create_async()
        .await;

    let monitor = monitor_for(&server);
    let (_tx, rx) = broadcast::channel(1);
    let report = monitor.run(RunMode::CheckOnce, rx).await;

    telegram.assert_async().await;
    assert_eq!(report.probes, 1);
    assert_eq!(report.notifications, 0);
}

#[tokio::test]
async fn test_telegram_rejection_counts_as_failed_delivery() {
    let mut server = mockito::Server::new_async().await;

    let _target = server
        .mock("GET", "/turnos/")
        .with_status(200)
        .with_body("<html>agenda</html>")
        .create_async()
        .await;
    let _telegram = server
        .mock("POST", "/bot123:abc/sendMessage")
        .with_status(400)
        .with_body(r#"{"ok":false,"description":"Bad Request: chat not found"}"#)
        .create_async()
        .await;

    let monitor = monitor_for(&server);
    let (_tx, rx) = broadcast::channel(1);
    let report = monitor.run(RunMode::SelfTest, rx).await;

    assert_eq!(report.notifications, 1);
    assert_eq!(report.deliveries, 0);
    assert_eq!(report.errors, 1);
}
