//! src/domain/subscription.rs

use serde::{Deserialize, Deserializer, Serialize};

pub const EMAIL_REQUIRED: &str = "Email is required";
pub const INVALID_EMAIL: &str = "Please enter a valid email address";
pub const SUBSCRIBED: &str = "Email subscribed successfully";
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

/// Body of `POST /store/email-subscribe`.
///
/// A missing body, a body that is not a JSON object and an `email` that is not
/// a string all deserialize to `email: None`.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct SubscriptionRequest {
    #[serde(default, deserialize_with = "string_or_none")]
    pub email: Option<String>,
}

impl SubscriptionRequest {
    pub fn from_body(body: &[u8]) -> Self {
        match serde_json::from_slice(body) {
            Ok(value @ serde_json::Value::Object(_)) => {
                serde_json::from_value(value).unwrap_or_default()
            }
            _ => Self::default(),
        }
    }

    /// The submitted address, with the empty string treated as absent.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref().filter(|e| !e.is_empty())
    }
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        _ => None,
    })
}

/// JSON body returned by the subscription endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscribeResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SubscribeResponse {
    pub fn subscribed() -> Self {
        Self {
            success: true,
            message: Some(SUBSCRIBED.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
        }
    }
}

/// Why a storefront submission did not go through.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubscriptionFailure {
    /// Rejected locally, nothing was sent.
    #[error("{0}")]
    Validation(String),
    /// The backend answered with a non-success status.
    #[error("{message}")]
    Rejected { status: u16, message: String },
    /// The request could not be completed or the response was unreadable.
    #[error("{0}")]
    Transport(String),
}

/// Result shape handed back to the subscription form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionResult {
    pub success: bool,
    pub error: Option<String>,
}

impl From<Result<(), SubscriptionFailure>> for SubscriptionResult {
    fn from(outcome: Result<(), SubscriptionFailure>) -> Self {
        match outcome {
            Ok(()) => Self {
                success: true,
                error: None,
            },
            Err(failure) => Self {
                success: false,
                error: Some(failure.to_string()),
            },
        }
    }
}
