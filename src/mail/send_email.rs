//! src/mail/send_email.rs

use reqwest::Client;
use secrecy::ExposeSecret;

use crate::config::EmailClientSettings;
use crate::domain::subscriber_email::SubscriberEmail;

#[derive(serde::Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

/// HTTP client for the transactional email provider.
pub struct EmailClient {
    http_client: Client,
    sender: SubscriberEmail,
    email_settings: EmailClientSettings,
}

impl EmailClient {
    pub fn new(
        email_settings: EmailClientSettings,
        sender: SubscriberEmail,
    ) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(email_settings.timeout()).build()?;
        Ok(Self {
            http_client,
            email_settings,
            sender,
        })
    }

    #[tracing::instrument(
        name = "Send email through provider",
        skip(self, recipient, subject, html_content, text_content),
        fields(recipient = %recipient)
    )]
    pub async fn send_email(
        &self,
        recipient: &SubscriberEmail,
        subject: &str,
        html_content: &str,
        text_content: &str,
    ) -> Result<(), reqwest::Error> {
        let url = format!("{}/emails", self.email_settings.base_url);
        let request_body = SendEmailRequest {
            from: self.sender.as_ref(),
            to: [recipient.as_ref()],
            subject,
            html: html_content,
            text: text_content,
        };

        self.http_client
            .post(&url)
            .bearer_auth(self.email_settings.api_key.expose_secret())
            .json(&request_body)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}
