use secrecy::{ExposeSecret, Secret};
use serde_aux::prelude::deserialize_number_from_string;

use crate::domain::subscriber_email::SubscriberEmail;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:9000";

#[derive(Debug)]
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other,
            )),
        }
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct AppConfig {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".into()
}

/// Credentials and endpoint of the transactional email provider.
///
/// An empty `api_key` or an unparseable `sender_email` leaves the notification
/// service unconfigured; the server still starts and reports the problem on
/// each subscription attempt.
#[derive(serde::Deserialize, Clone)]
pub struct EmailClientSettings {
    pub base_url: String,
    #[serde(default)]
    pub sender_email: String,
    #[serde(default = "empty_secret")]
    pub api_key: Secret<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub send_timeout_ms: u64,
}

fn empty_secret() -> Secret<String> {
    Secret::new(String::new())
}

impl EmailClientSettings {
    pub fn sender(&self) -> Result<SubscriberEmail, String> {
        SubscriberEmail::parse(self.sender_email.clone())
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.expose_secret().trim().is_empty()
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.send_timeout_ms)
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct StorefrontSettings {
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
}

fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.into()
}

impl Default for StorefrontSettings {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
        }
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct Configuration {
    pub app: AppConfig,
    pub email_client: EmailClientSettings,
    #[serde(default)]
    pub storefront: StorefrontSettings,
}

pub fn get_configuration() -> Result<Configuration, config::ConfigError> {
    let mut settings = config::Config::default();

    let base_path = std::env::current_dir().map_err(|e| {
        config::ConfigError::Message(format!("Failed to determine the current directory: {}", e))
    })?;
    let configuration_directory = base_path.join("configuration");

    // Read in default configuration
    settings.merge(config::File::from(configuration_directory.join("base")).required(true))?;

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;

    // Read in layer environment specific file.
    settings.merge(
        config::File::from(configuration_directory.join(environment.as_str())).required(true),
    )?;

    // e.g. `APP_EMAIL_CLIENT__API_KEY=re_123` sets `email_client.api_key`
    settings.merge(config::Environment::with_prefix("app").separator("__"))?;

    settings.try_into()
}
