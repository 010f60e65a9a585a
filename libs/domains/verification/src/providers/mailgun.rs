//! Mailgun email provider implementation.

use super::{EmailProvider, SentEmail};
use crate::error::{NotificationError, NotificationResult};
use crate::models::{EmailCredentials, VerificationEmail};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info};

const DEFAULT_API_BASE: &str = "https://api.mailgun.net/v3";

/// Mailgun messages API client.
///
/// Stateless with respect to credentials; the API key and sending
/// domain arrive with each send call.
pub struct MailgunProvider {
    client: Client,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct MailgunResponse {
    id: Option<String>,
    #[allow(dead_code)] // Populated by deserialization from the Mailgun API
    message: Option<String>,
}

impl MailgunProvider {
    /// Create a provider against the production Mailgun API.
    pub fn new() -> Self {
        Self::with_api_base(DEFAULT_API_BASE)
    }

    /// Create a provider against a custom API base URL (for tests).
    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.into(),
        }
    }
}

impl Default for MailgunProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmailProvider for MailgunProvider {
    async fn send(
        &self,
        credentials: &EmailCredentials,
        email: &VerificationEmail,
    ) -> NotificationResult<SentEmail> {
        let mut form: Vec<(&str, &str)> = vec![
            ("from", &email.from),
            ("to", &email.to),
            ("subject", &email.subject),
            ("text", &email.text_body),
        ];
        if let Some(html) = &email.html_body {
            form.push(("html", html));
        }

        debug!(
            to = %email.to,
            subject = %email.subject,
            domain = %credentials.domain_name,
            has_html = email.html_body.is_some(),
            "Sending email via Mailgun"
        );

        let response = self
            .client
            .post(format!(
                "{}/{}/messages",
                self.api_base, credentials.domain_name
            ))
            .basic_auth("api", Some(&credentials.api_key))
            .form(&form)
            .send()
            .await?;

        let status = response.status();

        if status.is_success() {
            let body: MailgunResponse = response.json().await.unwrap_or(MailgunResponse {
                id: None,
                message: None,
            });

            info!(
                to = %email.to,
                message_id = ?body.id,
                "Email sent successfully via Mailgun"
            );
            Ok(SentEmail {
                message_id: body.id,
            })
        } else {
            let error_body = response.text().await.unwrap_or_default();
            error!(
                to = %email.to,
                status = %status,
                error = %error_body,
                "Failed to send email via Mailgun"
            );

            Err(NotificationError::Provider(format!(
                "Mailgun error ({status}): {error_body}"
            )))
        }
    }

    fn name(&self) -> &'static str {
        "Mailgun"
    }
}
