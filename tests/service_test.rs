//! Integration tests for the service facade and its messaging collaborator.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pushrelay::messaging::TokenRefreshCallback;
use pushrelay::{
    BatchItem, Config, Credential, MessagingError, NotificationService, PushMessaging,
    RemoteMessage,
};
use serde_json::json;
use tokio::sync::broadcast;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =============================================================================
// Fake push SDK
// =============================================================================

struct FakeMessaging {
    granted: bool,
    token: Option<String>,
    topics: Mutex<BTreeSet<String>>,
    refresh: Mutex<Vec<TokenRefreshCallback>>,
    initial: Option<RemoteMessage>,
    foreground: broadcast::Sender<RemoteMessage>,
}

impl FakeMessaging {
    fn new(granted: bool, token: Option<&str>) -> Self {
        let (foreground, _) = broadcast::channel(8);
        Self {
            granted,
            token: token.map(str::to_string),
            topics: Mutex::new(BTreeSet::new()),
            refresh: Mutex::new(Vec::new()),
            initial: None,
            foreground,
        }
    }

    fn rotate_token(&self, new_token: &str) {
        for callback in self.refresh.lock().unwrap().iter() {
            callback(new_token.to_string());
        }
    }
}

#[async_trait]
impl PushMessaging for FakeMessaging {
    async fn request_permissions(&self) -> Result<bool, MessagingError> {
        Ok(self.granted)
    }

    async fn get_token(&self) -> Result<Option<String>, MessagingError> {
        Ok(self.token.clone())
    }

    fn on_token_refresh(&self, callback: TokenRefreshCallback) {
        self.refresh.lock().unwrap().push(callback);
    }

    async fn subscribe_to_topic(&self, topic: &str) -> Result<(), MessagingError> {
        if topic.is_empty() {
            return Err(MessagingError::Sdk("empty topic".to_string()));
        }
        self.topics.lock().unwrap().insert(topic.to_string());
        Ok(())
    }

    async fn unsubscribe_from_topic(&self, topic: &str) -> Result<(), MessagingError> {
        self.topics.lock().unwrap().remove(topic);
        Ok(())
    }

    async fn get_initial_message(&self) -> Result<Option<RemoteMessage>, MessagingError> {
        Ok(self.initial.clone())
    }

    fn foreground_messages(&self) -> broadcast::Receiver<RemoteMessage> {
        self.foreground.subscribe()
    }
}

fn config(endpoint: &str) -> Config {
    Config::new(endpoint, "facade-secret")
}

fn credential() -> Credential {
    let mut map = Credential::new();
    map.insert("project_id".to_string(), json!("demo"));
    map
}

// =============================================================================
// Messaging delegation
// =============================================================================

#[tokio::test]
async fn test_device_token_after_permission() {
    let sdk = Arc::new(FakeMessaging::new(true, Some("device-token-1")));
    let service = NotificationService::new(config("http://localhost"))
        .unwrap()
        .with_messaging(sdk);

    assert_eq!(
        service.get_device_token().await.unwrap().as_deref(),
        Some("device-token-1")
    );
    assert!(service.request_permissions().await.unwrap());
}

#[tokio::test]
async fn test_device_token_none_when_denied() {
    let sdk = Arc::new(FakeMessaging::new(false, Some("device-token-1")));
    let service = NotificationService::new(config("http://localhost"))
        .unwrap()
        .with_messaging(sdk);

    assert_eq!(service.get_device_token().await.unwrap(), None);
}

#[tokio::test]
async fn test_topic_subscription() {
    let sdk = Arc::new(FakeMessaging::new(true, None));
    let service = NotificationService::new(config("http://localhost"))
        .unwrap()
        .with_messaging(Arc::clone(&sdk) as Arc<dyn PushMessaging>);

    service.subscribe_to_topic("news").await.unwrap();
    service.subscribe_to_topic("sports").await.unwrap();
    service.unsubscribe_from_topic("news").await.unwrap();
    assert!(matches!(
        service.subscribe_to_topic("").await,
        Err(MessagingError::Sdk(_))
    ));

    let topics: Vec<String> = sdk.topics.lock().unwrap().iter().cloned().collect();
    assert_eq!(topics, vec!["sports".to_string()]);
}

#[tokio::test]
async fn test_token_refresh_callback() {
    let sdk = Arc::new(FakeMessaging::new(true, None));
    let service = NotificationService::new(config("http://localhost"))
        .unwrap()
        .with_messaging(Arc::clone(&sdk) as Arc<dyn PushMessaging>);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    service
        .on_token_refresh(Box::new(move |token| sink.lock().unwrap().push(token)))
        .unwrap();

    sdk.rotate_token("rotated-token");
    assert_eq!(*seen.lock().unwrap(), vec!["rotated-token".to_string()]);
}

#[tokio::test]
async fn test_foreground_messages_stream() {
    let sdk = Arc::new(FakeMessaging::new(true, None));
    let service = NotificationService::new(config("http://localhost"))
        .unwrap()
        .with_messaging(Arc::clone(&sdk) as Arc<dyn PushMessaging>);

    let mut rx = service.foreground_messages().unwrap();
    let message = RemoteMessage {
        message_id: Some("m-1".to_string()),
        title: Some("Hi".to_string()),
        body: Some("There".to_string()),
        ..RemoteMessage::default()
    };
    sdk.foreground.send(message.clone()).unwrap();

    assert_eq!(rx.recv().await.unwrap(), message);
    assert_eq!(service.initial_message().await.unwrap(), None);
}

// =============================================================================
// Dispatch through the facade
// =============================================================================

#[tokio::test]
async fn test_send_notification_through_facade() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sendNotification"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"messageId": "facade-1"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let service = NotificationService::new(config(&server.uri())).unwrap();
    let result = service
        .send_notification(&credential(), &"x".repeat(80), "Hi", "There", None)
        .await;

    assert!(result.success);
    assert_eq!(result.message_id.as_deref(), Some("facade-1"));
    assert_eq!(result.duration, None);
}

#[tokio::test]
async fn test_concurrent_sends_share_one_service() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sendNotification"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(4)
        .mount(&server)
        .await;

    let service = NotificationService::new(config(&server.uri())).unwrap();
    let mut handles = Vec::new();
    for i in 0..4 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service
                .send_notification(&credential(), &"y".repeat(60), &format!("T{i}"), "B", None)
                .await
        }));
    }

    for handle in handles {
        assert!(handle.await.unwrap().success);
    }
}

#[tokio::test]
async fn test_batch_validation_error_through_facade() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let items = vec![
        BatchItem {
            token: "z".repeat(60),
            title: "ok".to_string(),
            body: "ok".to_string(),
        },
        BatchItem {
            token: "z".repeat(60),
            title: "ok".to_string(),
            body: "b".repeat(1001),
        },
    ];

    let service = NotificationService::new(config(&server.uri())).unwrap();
    let err = service
        .send_batch_notifications(&credential(), &items, None)
        .await
        .unwrap_err();

    assert_eq!(err.index, 1);
    assert_eq!(err.field, pushrelay::InvalidField::Content);
}
