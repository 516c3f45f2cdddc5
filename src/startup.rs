use std::net::TcpListener;

use actix_web::dev::Server;

use crate::config::{Configuration, EmailClientSettings};
use crate::mail::notification::{EmailNotificationService, NotificationProvider};
use crate::mail::send_email::EmailClient;
use crate::mail::templates::TemplateRegistry;
use crate::run::run;

pub struct AppServer {
    port: u16,
    address: String,
    server: Server,
}

impl AppServer {
    pub fn build(configuration: Configuration) -> Result<Self, std::io::Error> {
        let notifications = notification_provider(&configuration.email_client);
        Self::build_with_notifications(configuration, notifications)
    }

    /// Like [`AppServer::build`] but with an already decided notification
    /// provider, which lets callers swap in their own delivery backend.
    pub fn build_with_notifications(
        configuration: Configuration,
        notifications: NotificationProvider,
    ) -> Result<Self, std::io::Error> {
        let listener = TcpListener::bind(format!(
            "{}:{}",
            configuration.app.host, configuration.app.port
        ))?;
        let port = listener.local_addr()?.port();

        tracing::info!(
            "Starting service on address: {}:{}",
            configuration.app.host,
            port
        );

        let address = configuration.app.host.clone();
        let server = run(listener, notifications)?;

        Ok(Self {
            port,
            address,
            server,
        })
    }

    pub fn to_server_address(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

/// Decides once, at startup, whether welcome emails can be delivered.
pub fn notification_provider(settings: &EmailClientSettings) -> NotificationProvider {
    if !settings.has_api_key() {
        tracing::warn!("Email provider API key is missing; email subscriptions will fail");
        return NotificationProvider::Unconfigured("missing email provider API key".into());
    }

    let sender = match settings.sender() {
        Ok(sender) => sender,
        Err(e) => {
            tracing::warn!(error.message = %e, "Invalid sender address; email subscriptions will fail");
            return NotificationProvider::Unconfigured(e);
        }
    };

    match EmailClient::new(settings.clone(), sender) {
        Ok(email_client) => NotificationProvider::configured(EmailNotificationService::new(
            email_client,
            TemplateRegistry::default(),
        )),
        Err(e) => {
            tracing::error!(error.cause_chain = ?e, "Failed to build email provider client");
            NotificationProvider::Unconfigured(format!("failed to build email client: {}", e))
        }
    }
}
