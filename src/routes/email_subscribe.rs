use std::fmt::Formatter;

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use anyhow::Context;

use crate::domain::subscriber_email::SubscriberEmail;
use crate::domain::subscription::{
    SubscribeResponse, SubscriptionRequest, EMAIL_REQUIRED, GENERIC_FAILURE, INVALID_EMAIL,
};
use crate::mail::notification::{
    CreateNotification, NotificationError, NotificationProvider, NotificationReceipt,
    NotificationService, ResolveError, EMAIL_CHANNEL,
};
use crate::mail::templates::{WELCOME_EMAIL, WELCOME_PREVIEW, WELCOME_SUBJECT};
use crate::utils::error_helpers::{error_chain_fmt, message_or};

pub const SERVICE_NOT_CONFIGURED: &str = "Email service is not configured. \
    Please check APP_EMAIL_CLIENT__API_KEY and APP_EMAIL_CLIENT__SENDER_EMAIL environment variables.";
pub const SEND_FAILURE: &str = "Failed to send welcome email. Please try again later.";

#[derive(thiserror::Error)]
pub enum SubscribeError {
    #[error("{0}")]
    ValidationError(String),

    #[error("{}", SERVICE_NOT_CONFIGURED)]
    ServiceUnavailable(#[source] ResolveError),

    #[error("{}", message_or(.0, SEND_FAILURE))]
    DeliveryError(#[source] NotificationError),

    #[error("{}", message_or(.0, GENERIC_FAILURE))]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for SubscribeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for SubscribeError {
    fn status_code(&self) -> StatusCode {
        match self {
            SubscribeError::ValidationError(_) => StatusCode::BAD_REQUEST,
            SubscribeError::ServiceUnavailable(_)
            | SubscribeError::DeliveryError(_)
            | SubscribeError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(SubscribeResponse::failed(self.to_string()))
    }
}

#[derive(serde::Serialize)]
struct EmailOptions<'a> {
    subject: &'a str,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct WelcomeNotificationData<'a> {
    email_options: EmailOptions<'a>,
    email: &'a str,
    preview: &'a str,
}

/// Builds the welcome notification for an already normalized address.
pub fn welcome_notification(email: &SubscriberEmail) -> Result<CreateNotification, anyhow::Error> {
    let data = serde_json::to_value(WelcomeNotificationData {
        email_options: EmailOptions {
            subject: WELCOME_SUBJECT,
        },
        email: email.as_ref(),
        preview: WELCOME_PREVIEW,
    })
    .context("Failed to serialize welcome email data")?;

    Ok(CreateNotification {
        to: email.as_ref().to_string(),
        channel: EMAIL_CHANNEL.into(),
        template: WELCOME_EMAIL.into(),
        data,
    })
}

#[tracing::instrument(
    name = "Adding a new email subscription",
    skip(body, notifications),
    fields(subscriber_email = tracing::field::Empty)
)]
pub async fn email_subscribe(
    body: web::Bytes,
    notifications: web::Data<NotificationProvider>,
) -> Result<HttpResponse, SubscribeError> {
    tracing::debug!(body_length = body.len(), "Received email subscription request");

    let request = SubscriptionRequest::from_body(&body);
    let raw_email = match request.email() {
        Some(email) => email,
        None => {
            tracing::warn!("Email validation failed: no email string in request body");
            return Err(SubscribeError::ValidationError(EMAIL_REQUIRED.into()));
        }
    };
    tracing::Span::current().record("subscriber_email", &tracing::field::display(raw_email));

    // validation runs on the raw input, delivery uses the normalized address
    let email = SubscriberEmail::parse(raw_email.to_string())
        .map_err(|e| {
            tracing::warn!(error.message = %e, "Email validation failed");
            SubscribeError::ValidationError(INVALID_EMAIL.into())
        })?
        .normalized();

    let service = notifications.resolve().map_err(|e| {
        tracing::error!(
            error.message = %e,
            error.cause_chain = ?e,
            "Failed to resolve notification service"
        );
        SubscribeError::ServiceUnavailable(e)
    })?;

    // Subscribers are not stored, so repeated calls each send a welcome email.
    tracing::info!("Processing email subscription");
    let receipt = send_welcome_email(service.as_ref(), &email).await?;
    tracing::info!(notification_id = %receipt.id, "Welcome email sent");

    Ok(HttpResponse::Ok().json(SubscribeResponse::subscribed()))
}

#[tracing::instrument(name = "Send welcome email", skip(service, email))]
async fn send_welcome_email(
    service: &dyn NotificationService,
    email: &SubscriberEmail,
) -> Result<NotificationReceipt, SubscribeError> {
    let notification = welcome_notification(email)?;

    service
        .create_notification(notification)
        .await
        .map_err(|e| {
            let e = SubscribeError::DeliveryError(e);
            tracing::error!(
                error.message = %e,
                error.cause_chain = ?e,
                "Failed to send welcome email"
            );
            e
        })
}
