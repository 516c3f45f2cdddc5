//! src/mail/templates.rs

use std::collections::HashMap;

use serde_json::Value;

pub const WELCOME_EMAIL: &str = "welcome-email";
pub const WELCOME_SUBJECT: &str = "Welcome to cobain©";
pub const WELCOME_PREVIEW: &str = "Welcome to cobain©!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
    pub text: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("No email template registered under `{0}`")]
    UnknownTemplate(String),

    #[error("Invalid data for email template `{template}`")]
    InvalidData { template: String },
}

/// Turns a notification data payload into an email body.
pub trait EmailTemplate: Send + Sync {
    fn render(&self, data: &Value) -> Result<RenderedEmail, TemplateError>;
}

/// Subject line set by the sender under `emailOptions.subject`, if any.
fn subject_override(data: &Value) -> Option<&str> {
    data.get("emailOptions")
        .and_then(|options| options.get("subject"))
        .and_then(Value::as_str)
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WelcomeEmailData {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
}

impl WelcomeEmailData {
    pub fn preview(&self) -> &str {
        self.preview.as_deref().unwrap_or(WELCOME_PREVIEW)
    }
}

/// `email` must be a string; `preview` must be a string or absent.
pub fn is_welcome_email_data(data: &Value) -> bool {
    let email_is_string = data.get("email").map(Value::is_string).unwrap_or(false);
    let preview_is_valid = match data.get("preview") {
        None => true,
        Some(preview) => preview.is_string(),
    };
    email_is_string && preview_is_valid
}

pub struct WelcomeEmail;

impl WelcomeEmail {
    pub fn render_data(&self, data: &WelcomeEmailData, subject: &str) -> RenderedEmail {
        let email = htmlescape::encode_minimal(&data.email);
        let preview = htmlescape::encode_minimal(data.preview());

        let html = format!(
            "<!DOCTYPE html>\
            <html><head><meta charset=\"utf-8\" /></head>\
            <body>\
            <div style=\"display:none;max-height:0;overflow:hidden\">{preview}</div>\
            <p>Hi there,</p>\
            <p>Thanks for subscribing with <strong>{email}</strong>. \
            We&apos;re excited to have you on board!</p>\
            <p>You&apos;ll be the first to hear about new drops, \
            behind-the-scenes stories, and exclusive offers.</p>\
            <hr />\
            <p style=\"color:#666666;font-size:12px\">If you didn&apos;t subscribe \
            or no longer wish to receive updates, you can unsubscribe at any time.</p>\
            </body></html>",
            preview = preview,
            email = email,
        );

        let text = format!(
            "Hi there,\n\n\
            Thanks for subscribing with {}. We're excited to have you on board!\n\n\
            You'll be the first to hear about new drops, behind-the-scenes stories, \
            and exclusive offers.\n\n\
            If you didn't subscribe or no longer wish to receive updates, \
            you can unsubscribe at any time.\n",
            data.email,
        );

        RenderedEmail {
            subject: subject.to_string(),
            html,
            text,
        }
    }
}

impl EmailTemplate for WelcomeEmail {
    fn render(&self, data: &Value) -> Result<RenderedEmail, TemplateError> {
        let invalid = || TemplateError::InvalidData {
            template: WELCOME_EMAIL.into(),
        };
        if !is_welcome_email_data(data) {
            return Err(invalid());
        }
        let welcome: WelcomeEmailData =
            serde_json::from_value(data.clone()).map_err(|_| invalid())?;
        let subject = subject_override(data).unwrap_or(WELCOME_SUBJECT);

        Ok(self.render_data(&welcome, subject))
    }
}

/// Template identifier to renderer lookup.
pub struct TemplateRegistry {
    templates: HashMap<&'static str, Box<dyn EmailTemplate>>,
}

impl TemplateRegistry {
    pub fn empty() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    pub fn register(mut self, id: &'static str, template: impl EmailTemplate + 'static) -> Self {
        self.templates.insert(id, Box::new(template));
        self
    }

    pub fn render(&self, id: &str, data: &Value) -> Result<RenderedEmail, TemplateError> {
        self.templates
            .get(id)
            .ok_or_else(|| TemplateError::UnknownTemplate(id.to_string()))?
            .render(data)
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::empty().register(WELCOME_EMAIL, WelcomeEmail)
    }
}
