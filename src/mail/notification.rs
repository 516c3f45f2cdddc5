//! src/mail/notification.rs

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::subscriber_email::SubscriberEmail;
use crate::mail::send_email::EmailClient;
use crate::mail::templates::{TemplateError, TemplateRegistry};

pub const EMAIL_CHANNEL: &str = "email";

/// A request to deliver one templated message.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CreateNotification {
    pub to: String,
    pub channel: String,
    pub template: String,
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationReceipt {
    pub id: Uuid,
    pub to: String,
    pub template: String,
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("Unsupported notification channel `{0}`")]
    UnsupportedChannel(String),

    #[error("{0} is not a valid recipient address")]
    InvalidRecipient(String),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("Failed to deliver email to {recipient}: {source}")]
    Delivery {
        recipient: String,
        #[source]
        source: reqwest::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn create_notification(
        &self,
        notification: CreateNotification,
    ) -> Result<NotificationReceipt, NotificationError>;
}

/// Renders through the template registry and delivers through the provider.
pub struct EmailNotificationService {
    email_client: EmailClient,
    templates: TemplateRegistry,
}

impl EmailNotificationService {
    pub fn new(email_client: EmailClient, templates: TemplateRegistry) -> Self {
        Self {
            email_client,
            templates,
        }
    }
}

#[async_trait]
impl NotificationService for EmailNotificationService {
    #[tracing::instrument(
        name = "Create notification",
        skip(self, notification),
        fields(
            notification_to = %notification.to,
            notification_template = %notification.template,
        )
    )]
    async fn create_notification(
        &self,
        notification: CreateNotification,
    ) -> Result<NotificationReceipt, NotificationError> {
        if notification.channel != EMAIL_CHANNEL {
            return Err(NotificationError::UnsupportedChannel(notification.channel));
        }

        let recipient = SubscriberEmail::parse(notification.to.clone())
            .map_err(|_| NotificationError::InvalidRecipient(notification.to.clone()))?;
        let email = self
            .templates
            .render(&notification.template, &notification.data)?;

        self.email_client
            .send_email(&recipient, &email.subject, &email.html, &email.text)
            .await
            .map_err(|source| NotificationError::Delivery {
                recipient: notification.to.clone(),
                source,
            })?;

        Ok(NotificationReceipt {
            id: Uuid::new_v4(),
            to: notification.to,
            template: notification.template,
        })
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("Notification service is not configured: {reason}")]
pub struct ResolveError {
    pub reason: String,
}

/// The notification service as decided at startup.
#[derive(Clone)]
pub enum NotificationProvider {
    Configured(Arc<dyn NotificationService>),
    Unconfigured(String),
}

impl NotificationProvider {
    pub fn configured(service: impl NotificationService + 'static) -> Self {
        Self::Configured(Arc::new(service))
    }

    pub fn resolve(&self) -> Result<Arc<dyn NotificationService>, ResolveError> {
        match self {
            Self::Configured(service) => Ok(service.clone()),
            Self::Unconfigured(reason) => Err(ResolveError {
                reason: reason.clone(),
            }),
        }
    }
}
