//! End-to-end run of the console against a mocked backend

use std::{future::Future, sync::Arc, time::Duration};

use chrono::Utc;
use streamwatch::{
    config::{AppConfig, HttpRetryConfig},
    console::Console,
    models::{FeedTarget, NotificationFilter},
    test_helpers::ScriptedEventSource,
};
use url::Url;

const ALICE: &str = "https://chaturbate.com/alice";

async fn eventually<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let wait = async {
        while !check().await {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    };
    tokio::time::timeout(Duration::from_secs(5), wait).await.unwrap();
}

#[tokio::test]
async fn test_console_mounts_streams_and_aggregates_notifications() {
    let mut server = mockito::Server::new_async().await;
    let session = server
        .mock("GET", "/api/session")
        .match_header("cookie", "session=abc")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"logged_in": true, "user": {"role": "admin", "username": "root"}}"#)
        .create_async()
        .await;
    let dashboard = server
        .mock("GET", "/api/dashboard")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(format!(
            r#"{{"ongoing_streams": 1, "streams": [{{"id": 1, "room_url": "{ALICE}/", "streamer_username": "alice", "platform": "chaturbate", "agent": {{"firstname": "Ann", "lastname": "Lee"}}}}]}}"#
        ))
        .expect_at_least(1)
        .create_async()
        .await;
    let objects = server
        .mock("GET", "/api/objects")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"object_name": "knife", "confidence_threshold": 0.5}]"#)
        .expect_at_least(1)
        .create_async()
        .await;

    let config = AppConfig {
        api_base_url: Url::parse(&format!("{}/", server.url())).unwrap(),
        session_cookie: Some("session=abc".to_string()),
        refresh_interval_secs: Duration::from_millis(50),
        render_cadence_ms: Duration::from_millis(20),
        shutdown_timeout: Duration::from_secs(2),
        http_retry_config: HttpRetryConfig { max_retries: 0, ..Default::default() },
        sinks: vec![],
        ..Default::default()
    };
    let source = Arc::new(ScriptedEventSource::new());
    let console = Console::builder()
        .config(config)
        .event_source(source.clone())
        .build()
        .await
        .unwrap();
    let token = console.cancellation_token();
    let aggregator = console.aggregator();
    let store = console.store();
    let handle = tokio::spawn(console.run());

    // The pump listens to the notification feed, the mounted surface to the
    // detection feed.
    source.wait_for_connections(FeedTarget::Notifications, 1).await;
    source.wait_for_connections(FeedTarget::Detections, 1).await;
    eventually(|| {
        let store = store.clone();
        async move { store.subscriber_count(ALICE) == 1 }
    })
    .await;

    source.push(
        FeedTarget::Detections,
        format!(
            r#"{{"stream_url": "{ALICE}", "detections": [{{"class": "knife", "confidence": 0.9, "box": [10, 10, 20, 20]}}]}}"#
        ),
    );
    eventually(|| {
        let store = store.clone();
        async move { store.active_for(ALICE, Utc::now()).len() == 1 }
    })
    .await;

    source.push(
        FeedTarget::Notifications,
        format!(
            r#"{{"type": "detection", "stream": "{ALICE}/", "object": "knife", "confidence": 0.93, "id": 5}}"#
        ),
    );
    eventually(|| {
        let aggregator = aggregator.clone();
        async move { aggregator.unread_count().await == 1 }
    })
    .await;

    let notifications = aggregator.list(NotificationFilter::All).await;
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].message, "Detected knife (93.0%) in alice");
    assert_eq!(notifications[0].details.agent_name, "Ann Lee");
    assert_eq!(notifications[0].details.stream_id, Some(1));

    token.cancel();
    let result = tokio::time::timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();
    assert!(result.is_ok());

    source.wait_for_connections(FeedTarget::Detections, 0).await;
    assert_eq!(store.subscriber_count(ALICE), 0);

    session.assert_async().await;
    dashboard.assert_async().await;
    objects.assert_async().await;
}
