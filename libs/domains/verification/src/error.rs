//! Error types for the verification notification domain.

use thiserror::Error;

/// Result type for notification operations.
pub type NotificationResult<T> = Result<T, NotificationError>;

/// Errors that can occur while handling a verification notification.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required environment variable is missing.
    #[error("Environment variable '{0}' is required but not set")]
    MissingEnvVar(String),

    /// Malformed or incomplete notification payload.
    #[error("Invalid notification payload: {0}")]
    Payload(String),

    /// Secrets store error.
    #[error("Secrets store error: {0}")]
    SecretsStore(String),

    /// Email provider error.
    #[error("Email provider error: {0}")]
    Provider(String),

    /// Template rendering error.
    #[error("Template rendering error: {0}")]
    Template(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl From<serde_json::Error> for NotificationError {
    fn from(err: serde_json::Error) -> Self {
        NotificationError::Payload(err.to_string())
    }
}

impl From<reqwest::Error> for NotificationError {
    fn from(err: reqwest::Error) -> Self {
        NotificationError::Provider(err.to_string())
    }
}

impl From<sea_orm::DbErr> for NotificationError {
    fn from(err: sea_orm::DbErr) -> Self {
        NotificationError::Database(err.to_string())
    }
}

impl From<handlebars::RenderError> for NotificationError {
    fn from(err: handlebars::RenderError) -> Self {
        NotificationError::Template(err.to_string())
    }
}
