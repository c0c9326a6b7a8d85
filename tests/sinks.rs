//! Integration tests for toast sinks

use std::{collections::HashMap, time::Duration};

use chrono::Utc;
use streamwatch::{
    config::{HttpRetryConfig, JitterSetting},
    http_client::HttpClientPool,
    models::{
        AlertSinkConfig, Notification, NotificationDetails, NotificationId, NotificationKind,
        Toast, WebhookSinkConfig,
    },
    sinks::{AlertDispatcher, AlertSink, WebhookSink},
    test_helpers::create_test_http_client,
};
use url::Url;

fn toast() -> Toast {
    Toast {
        title: "Object Detected".to_string(),
        notification: Notification {
            id: NotificationId(42),
            message: "Detected knife (91.0%) in alice".to_string(),
            timestamp: Utc::now(),
            read: false,
            kind: NotificationKind::Detection,
            image_url: None,
            stream_key: "https://chaturbate.com/alice".to_string(),
            details: NotificationDetails {
                streamer_name: "alice".to_string(),
                agent_name: "Unassigned".to_string(),
                ..Default::default()
            },
        },
    }
}

fn webhook_config(url: &str, retry_policy: HttpRetryConfig) -> WebhookSinkConfig {
    WebhookSinkConfig {
        url: Url::parse(url).unwrap(),
        headers: Some(HashMap::from([("X-Console".to_string(), "ops".to_string())])),
        retry_policy,
    }
}

#[tokio::test]
async fn test_webhook_delivers_toast_json() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/hook")
        .match_header("content-type", "application/json")
        .match_header("x-console", "ops")
        .match_body(mockito::Matcher::PartialJsonString(
            r#"{"title": "Object Detected", "notification": {"id": 42, "type": "detection"}}"#
                .to_string(),
        ))
        .with_status(200)
        .create_async()
        .await;

    let sink = WebhookSink::new(
        webhook_config(&format!("{}/hook", server.url()), HttpRetryConfig::default()),
        create_test_http_client(),
    )
    .unwrap();

    let result = sink.deliver(&toast()).await;

    assert!(result.is_ok());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_webhook_reports_non_success_status() {
    let mut server = mockito::Server::new_async().await;
    let mock = server.mock("POST", "/hook").with_status(400).create_async().await;

    let sink = WebhookSink::new(
        webhook_config(&format!("{}/hook", server.url()), HttpRetryConfig::default()),
        create_test_http_client(),
    )
    .unwrap();

    let result = sink.deliver(&toast()).await;

    assert!(result.is_err());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_webhook_retries_transient_errors() {
    let mut server = mockito::Server::new_async().await;
    let retry_policy = HttpRetryConfig {
        max_retries: 2,
        initial_backoff_ms: Duration::from_millis(10),
        max_backoff_secs: Duration::from_secs(1),
        jitter: JitterSetting::None,
        ..Default::default()
    };

    let failing = server.mock("POST", "/hook").with_status(503).expect(3).create_async().await;

    let pool = HttpClientPool::default();
    let client = pool.get_or_create(&retry_policy).await.unwrap();
    let sink =
        WebhookSink::new(webhook_config(&format!("{}/hook", server.url()), retry_policy), client)
            .unwrap();

    let result = sink.deliver(&toast()).await;

    assert!(result.is_err());
    failing.assert_async().await;
}

#[tokio::test]
async fn test_dispatcher_from_config_counts_deliveries() {
    let mut server = mockito::Server::new_async().await;
    let mock = server.mock("POST", "/hook").with_status(204).expect(2).create_async().await;

    let url = format!("{}/hook", server.url());
    let configs = vec![AlertSinkConfig::Webhook(webhook_config(
        &url,
        HttpRetryConfig { max_retries: 0, ..Default::default() },
    ))];
    let dispatcher =
        AlertDispatcher::from_config(&configs, &HttpClientPool::default()).await.unwrap();

    assert_eq!(dispatcher.dispatch(&toast()).await, 1);
    assert_eq!(dispatcher.dispatch(&toast()).await, 1);

    assert_eq!(dispatcher.delivered_count(&configs[0].name()), 2);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_invalid_header_is_rejected() {
    let config = WebhookSinkConfig {
        url: Url::parse("http://localhost/hook").unwrap(),
        headers: Some(HashMap::from([("bad header".to_string(), "x".to_string())])),
        retry_policy: HttpRetryConfig::default(),
    };

    assert!(WebhookSink::new(config, create_test_http_client()).is_err());
}
