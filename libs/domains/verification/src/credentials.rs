//! Credential resolution for the email provider.
//!
//! Credentials are resolved at most once per invocation and reused
//! across every record in the batch, regardless of batch size.

use crate::config::CredentialsConfig;
use crate::error::{NotificationError, NotificationResult};
use crate::models::EmailCredentials;
use crate::secrets::{SecretsStore, VaultSecretsStore};
use std::sync::Arc;
use tracing::info;

/// Keys expected inside the secret document.
const API_KEY_FIELD: &str = "MAILGUN_API_KEY";
const DOMAIN_NAME_FIELD: &str = "MAILGUN_DOMAIN_NAME";

/// Where the handler obtains email provider credentials.
pub enum CredentialsSource {
    /// Credentials already supplied by configuration.
    Static(EmailCredentials),
    /// Credentials fetched from a secrets store by name.
    SecretsStore {
        store: Arc<dyn SecretsStore>,
        secret_name: String,
    },
}

impl CredentialsSource {
    /// Build a source from the configured credentials variant.
    ///
    /// The secrets-store variant constructs the Vault client here so a
    /// bad address fails at startup, not mid-invocation.
    pub fn from_config(config: &CredentialsConfig) -> NotificationResult<Self> {
        match config {
            CredentialsConfig::Direct {
                api_key,
                domain_name,
            } => Ok(Self::Static(EmailCredentials::new(api_key, domain_name))),
            CredentialsConfig::SecretsStore { secret_name, vault } => Ok(Self::SecretsStore {
                store: Arc::new(VaultSecretsStore::new(vault)?),
                secret_name: secret_name.clone(),
            }),
        }
    }

    /// Resolve the credentials for this invocation.
    ///
    /// Any failure here is fatal to the whole invocation and is raised
    /// before the first record is processed.
    pub async fn resolve(&self) -> NotificationResult<EmailCredentials> {
        match self {
            Self::Static(credentials) => Ok(credentials.clone()),
            Self::SecretsStore { store, secret_name } => {
                let secret = store.get_secret(secret_name).await?;

                let api_key = secret.get(API_KEY_FIELD).ok_or_else(|| {
                    NotificationError::SecretsStore(format!(
                        "secret '{secret_name}' is missing the {API_KEY_FIELD} field"
                    ))
                })?;
                let domain_name = secret.get(DOMAIN_NAME_FIELD).ok_or_else(|| {
                    NotificationError::SecretsStore(format!(
                        "secret '{secret_name}' is missing the {DOMAIN_NAME_FIELD} field"
                    ))
                })?;

                info!(secret = %secret_name, domain = %domain_name, "Resolved email credentials");
                Ok(EmailCredentials::new(api_key, domain_name))
            }
        }
    }
}
