//! Verification Notification Domain
//!
//! Handles account-verification notification events: for each record
//! in a batch, renders and sends a verification email and optionally
//! extends the confirmation token's expiration window.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │ Event source     │  ← one batch of notification records
//! └────────┬─────────┘
//!          │
//! ┌────────▼─────────┐
//! │ NotificationHdlr │  ← resolves credentials once, loops records
//! └──┬─────────┬─────┘
//!    │         │
//! ┌──▼──────┐ ┌▼──────────────┐
//! │ Mailgun │ │ Postgres      │  ← verification email / token expiration
//! └─────────┘ └───────────────┘
//! ```
//!
//! Credentials come either straight from the environment or from a
//! Vault secret, selected by configuration. The token expiration step
//! only runs when a database is configured.

pub mod config;
pub mod credentials;
pub mod entity;
pub mod error;
pub mod handler;
pub mod models;
pub mod postgres;
pub mod providers;
pub mod repository;
pub mod secrets;
pub mod templates;

// Re-export commonly used types
pub use config::{CredentialsConfig, DatabaseConfig, HandlerConfig, VaultConfig};
pub use credentials::CredentialsSource;
pub use error::{NotificationError, NotificationResult};
pub use handler::NotificationHandler;
pub use models::{
    BatchStatus, EmailCredentials, NotificationEvent, NotificationRecord, VerificationEmail,
    VerificationRequest,
};
pub use postgres::PgTokenRepository;
pub use providers::{EmailProvider, MailgunProvider, SentEmail};
pub use repository::TokenRepository;
pub use secrets::{SecretsStore, VaultSecretsStore};
pub use templates::{BodyStyle, TemplateEngine};
