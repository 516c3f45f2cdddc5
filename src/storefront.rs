//! Storefront side of the subscription flow: the form action that checks an
//! address locally and forwards it to the backend.

use reqwest::Client;

use crate::config::StorefrontSettings;
use crate::domain::subscriber_email::is_valid_email;
use crate::domain::subscription::{
    SubscribeResponse, SubscriptionFailure, SubscriptionRequest, SubscriptionResult,
    EMAIL_REQUIRED, GENERIC_FAILURE, INVALID_EMAIL,
};
use crate::run::EMAIL_SUBSCRIBE_PATH;
use crate::utils::error_helpers::message_or;

/// Fields posted by the "coming soon" subscription form.
#[derive(Debug, Default, Clone, serde::Deserialize)]
pub struct SubscribeForm {
    pub email: Option<String>,
}

pub struct SubscriptionClient {
    http_client: Client,
    backend_url: String,
}

impl SubscriptionClient {
    pub fn new(settings: StorefrontSettings) -> Self {
        Self {
            http_client: Client::new(),
            backend_url: settings.backend_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.backend_url, EMAIL_SUBSCRIBE_PATH)
    }

    pub async fn subscribe_form(&self, form: &SubscribeForm) -> SubscriptionResult {
        self.subscribe_email(form.email.as_deref()).await.into()
    }

    /// Validates `email` and, when it looks like an address, posts it to the
    /// backend exactly once.
    #[tracing::instrument(name = "Submit email subscription", skip(self))]
    pub async fn subscribe_email(&self, email: Option<&str>) -> Result<(), SubscriptionFailure> {
        let email = match email {
            Some(email) if !email.is_empty() => email,
            _ => return Err(SubscriptionFailure::Validation(EMAIL_REQUIRED.into())),
        };
        if !is_valid_email(email) {
            return Err(SubscriptionFailure::Validation(INVALID_EMAIL.into()));
        }

        let response = self
            .http_client
            .post(&self.endpoint())
            .json(&SubscriptionRequest {
                email: Some(email.to_string()),
            })
            .send()
            .await
            .map_err(transport_failure)?;

        let status = response.status();
        let body: SubscribeResponse = response.json().await.map_err(transport_failure)?;

        if !status.is_success() {
            let message = body
                .error
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| GENERIC_FAILURE.to_string());
            tracing::warn!(status = status.as_u16(), error.message = %message, "Subscription rejected");
            return Err(SubscriptionFailure::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}

fn transport_failure(e: reqwest::Error) -> SubscriptionFailure {
    tracing::error!(error.cause_chain = ?e, "Subscription request failed");
    SubscriptionFailure::Transport(message_or(&e, GENERIC_FAILURE))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::config::StorefrontSettings;
    use crate::domain::subscription::{SubscriptionFailure, SubscriptionResult};

    use super::{SubscribeForm, SubscriptionClient};

    fn client(backend_url: String) -> SubscriptionClient {
        SubscriptionClient::new(StorefrontSettings { backend_url })
    }

    async fn silent_backend() -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;
        mock_server
    }

    #[tokio::test]
    async fn missing_email_is_rejected_without_a_request() {
        let mock_server = silent_backend().await;
        let client = client(mock_server.uri());

        for email in [None, Some("")] {
            let outcome = client.subscribe_email(email).await;
            assert_eq!(
                outcome,
                Err(SubscriptionFailure::Validation("Email is required".into()))
            );
        }
    }

    #[tokio::test]
    async fn malformed_email_is_rejected_without_a_request() {
        let mock_server = silent_backend().await;

        let result = client(mock_server.uri())
            .subscribe_form(&SubscribeForm {
                email: Some("not-an-email".into()),
            })
            .await;

        assert_eq!(
            result,
            SubscriptionResult {
                success: false,
                error: Some("Please enter a valid email address".into()),
            }
        );
    }

    #[tokio::test]
    async fn valid_email_is_posted_once_as_json() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/store/email-subscribe"))
            .and(header("Content-Type", "application/json"))
            .and(body_json(json!({"email": "user@example.com"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({"success": true, "message": "Email subscribed successfully"}),
            ))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = client(mock_server.uri())
            .subscribe_form(&SubscribeForm {
                email: Some("user@example.com".into()),
            })
            .await;

        assert_eq!(result, SubscriptionResult { success: true, error: None });
    }

    #[tokio::test]
    async fn server_error_message_is_surfaced() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(json!({"success": false, "error": "Provider down"})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let outcome = client(mock_server.uri())
            .subscribe_email(Some("user@example.com"))
            .await;

        assert_eq!(
            outcome,
            Err(SubscriptionFailure::Rejected {
                status: 500,
                message: "Provider down".into(),
            })
        );
    }

    #[tokio::test]
    async fn empty_error_message_uses_fallback() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({"success": false, "error": ""})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let outcome = client(mock_server.uri())
            .subscribe_email(Some("user@example.com"))
            .await;

        assert_eq!(
            outcome,
            Err(SubscriptionFailure::Rejected {
                status: 500,
                message: "Something went wrong. Please try again.".into(),
            })
        );
    }

    #[tokio::test]
    async fn rejection_without_message_uses_fallback() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({"success": false})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = client(mock_server.uri())
            .subscribe_form(&SubscribeForm {
                email: Some("user@example.com".into()),
            })
            .await;

        assert_eq!(
            result.error.as_deref(),
            Some("Something went wrong. Please try again.")
        );
    }

    #[tokio::test]
    async fn unreadable_response_is_a_transport_failure() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let outcome = client(mock_server.uri())
            .subscribe_email(Some("user@example.com"))
            .await;

        assert!(matches!(outcome, Err(SubscriptionFailure::Transport(_))));
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_transport_failure() {
        // nothing listens on port 1
        let outcome = client("http://127.0.0.1:1".into())
            .subscribe_email(Some("user@example.com"))
            .await;

        assert!(matches!(outcome, Err(SubscriptionFailure::Transport(_))));
    }

    #[test]
    fn trailing_slash_in_backend_url_is_ignored() {
        let client = client("http://localhost:9000/".into());
        assert_eq!(
            client.endpoint(),
            "http://localhost:9000/store/email-subscribe"
        );
    }
}
