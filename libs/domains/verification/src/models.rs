//! Data models for the verification notification domain.

use crate::error::{NotificationError, NotificationResult};
use serde::{Deserialize, Serialize};

/// One invocation's input: an ordered batch of notification records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationEvent {
    /// Records are processed independently, in order.
    pub records: Vec<NotificationRecord>,
}

/// A single record as delivered by the event source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRecord {
    /// JSON-encoded message payload describing the verification request.
    pub message: String,
}

impl NotificationRecord {
    /// Create a record from an already-encoded payload.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Parse the message payload into a verification request.
    ///
    /// Missing required fields are a fatal payload error for the
    /// whole invocation, not a per-record one.
    pub fn parse(&self) -> NotificationResult<VerificationRequest> {
        serde_json::from_str(&self.message).map_err(|e| {
            NotificationError::Payload(format!("malformed verification request: {e}"))
        })
    }
}

/// The decoded verification request carried inside a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRequest {
    /// Recipient email address.
    pub email: String,
    /// URL the user follows to confirm their address.
    pub activation_link: String,
    /// Confirmation token correlating this request with a database row.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,
}

/// Credentials for the outbound email provider.
///
/// Resolved at most once per invocation and reused across all records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailCredentials {
    /// Provider API key.
    pub api_key: String,
    /// Sending domain registered with the provider.
    pub domain_name: String,
}

impl EmailCredentials {
    pub fn new(api_key: impl Into<String>, domain_name: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            domain_name: domain_name.into(),
        }
    }

    /// Sender address derived from the resolved domain.
    pub fn from_address(&self) -> String {
        format!("noreply@{}", self.domain_name)
    }
}

/// An email ready for sending. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationEmail {
    /// Sender address.
    pub from: String,
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Plain text body.
    pub text_body: String,
    /// Optional HTML body.
    pub html_body: Option<String>,
}

/// Terminal result of one batch invocation.
///
/// The `Display` output is the externally observable contract and must
/// not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    /// Every record was processed.
    Success,
    /// An email send failed; remaining records were not processed.
    SendFailed,
    /// A token expiration update failed; remaining records were not processed.
    ExpirationUpdateFailed,
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchStatus::Success => write!(f, "Success"),
            BatchStatus::SendFailed => write!(f, "Error sending email"),
            BatchStatus::ExpirationUpdateFailed => write!(f, "Error updating expiration time"),
        }
    }
}
