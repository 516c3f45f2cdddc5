use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use once_cell::sync::Lazy;
use secrecy::Secret;
use uuid::Uuid;
use wiremock::MockServer;

use subscribe_mailer::config::{get_configuration, Configuration};
use subscribe_mailer::mail::notification::{
    CreateNotification, NotificationError, NotificationProvider, NotificationReceipt,
    NotificationService,
};
use subscribe_mailer::startup::{notification_provider, AppServer};
use subscribe_mailer::telemetry::{get_subscriber, init_subscriber};

static TRACING: Lazy<()> = Lazy::new(|| {
    if std::env::var("TEST_LOG").is_ok() {
        init_subscriber(get_subscriber(
            "test".into(),
            "debug".into(),
            std::io::stdout,
        ));
    } else {
        init_subscriber(get_subscriber("test".into(), "debug".into(), std::io::sink));
    }
});

/// Notification service double that records every dispatch attempt.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<CreateNotification>>>,
    failure: Option<String>,
}

impl RecordingNotifier {
    pub fn failing_with(message: &str) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<CreateNotification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationService for RecordingNotifier {
    async fn create_notification(
        &self,
        notification: CreateNotification,
    ) -> Result<NotificationReceipt, NotificationError> {
        self.sent.lock().unwrap().push(notification.clone());
        match &self.failure {
            Some(message) => Err(NotificationError::Other(anyhow::anyhow!(message.clone()))),
            None => Ok(NotificationReceipt {
                id: Uuid::new_v4(),
                to: notification.to,
                template: notification.template,
            }),
        }
    }
}

pub struct TestApp {
    pub email_server: MockServer,
    pub addr: String,
    pub api_client: reqwest::Client,
}

impl TestApp {
    pub async fn post_email_subscribe(&self, body: serde_json::Value) -> reqwest::Response {
        self.api_client
            .post(&format!("{}/store/email-subscribe", &self.addr))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_raw_email_subscribe(&self, body: &'static str) -> reqwest::Response {
        self.api_client
            .post(&format!("{}/store/email-subscribe", &self.addr))
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn provider_requests(&self) -> Vec<serde_json::Value> {
        self.email_server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|r| serde_json::from_slice(&r.body).expect("provider body should be json"))
            .collect()
    }
}

fn test_configuration(email_server: &MockServer) -> Configuration {
    let mut c = get_configuration().expect("should load configuration");
    c.email_client.base_url = email_server.uri();
    c.email_client.sender_email = "hello@cobain.store".into();
    c.email_client.api_key = Secret::new("re_test_key".into());
    c.email_client.send_timeout_ms = 2000;
    c.app.host = "127.0.0.1".into();
    c.app.port = 0;
    c
}

/// Spawns the service wired to the real email provider client, which talks to
/// `TestApp::email_server`.
pub async fn spawn_app() -> TestApp {
    Lazy::force(&TRACING);

    let email_server = MockServer::start().await;
    let configuration = test_configuration(&email_server);
    let notifications = notification_provider(&configuration.email_client);

    launch(configuration, email_server, notifications).await
}

/// Spawns the service with the provided notification backend.
pub async fn spawn_app_with(notifications: NotificationProvider) -> TestApp {
    Lazy::force(&TRACING);

    let email_server = MockServer::start().await;
    let configuration = test_configuration(&email_server);

    launch(configuration, email_server, notifications).await
}

async fn launch(
    configuration: Configuration,
    email_server: MockServer,
    notifications: NotificationProvider,
) -> TestApp {
    let server = AppServer::build_with_notifications(configuration, notifications)
        .expect("should have created server");

    let addr = format!("http://{}", server.to_server_address());
    let _ = tokio::spawn(server.run_until_stopped());

    TestApp {
        email_server,
        addr,
        api_client: reqwest::Client::new(),
    }
}
