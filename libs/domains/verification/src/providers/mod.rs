//! Email provider implementations.

mod mailgun;

pub use mailgun::MailgunProvider;

use crate::error::NotificationResult;
use crate::models::{EmailCredentials, VerificationEmail};
use async_trait::async_trait;

/// Acknowledgement for an accepted email.
#[derive(Debug, Clone)]
pub struct SentEmail {
    /// Provider-specific message ID, when the provider returns one.
    pub message_id: Option<String>,
}

/// Trait for email sending providers.
///
/// Credentials are passed per call because the handler resolves them
/// once per invocation, not at provider construction time.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailProvider: Send + Sync {
    /// Send an email through the provider's API.
    async fn send(
        &self,
        credentials: &EmailCredentials,
        email: &VerificationEmail,
    ) -> NotificationResult<SentEmail>;

    /// Provider name for logging.
    fn name(&self) -> &'static str;
}
