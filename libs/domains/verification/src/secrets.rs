//! Secrets store collaborator.
//!
//! The handler only needs one operation: fetch a named secret document
//! decodable into a string-to-string mapping. The shipped
//! implementation reads from Vault's KV v2 engine with token auth.

use crate::config::VaultConfig;
use crate::error::{NotificationError, NotificationResult};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::info;
use vaultrs::client::{VaultClient, VaultClientSettingsBuilder};
use vaultrs::kv2;

/// External store holding sensitive configuration, fetched by name.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SecretsStore: Send + Sync {
    /// Fetch a secret document as a key/value mapping.
    async fn get_secret(&self, name: &str) -> NotificationResult<HashMap<String, String>>;
}

/// Vault-backed secrets store (KV v2).
pub struct VaultSecretsStore {
    client: VaultClient,
    mount: String,
}

impl VaultSecretsStore {
    /// Create a store from Vault connection settings.
    pub fn new(config: &VaultConfig) -> NotificationResult<Self> {
        let settings = VaultClientSettingsBuilder::default()
            .address(&config.addr)
            .token(&config.token)
            .build()
            .map_err(|e| NotificationError::Config(format!("invalid Vault settings: {e}")))?;

        let client = VaultClient::new(settings)
            .map_err(|e| NotificationError::SecretsStore(e.to_string()))?;

        Ok(Self {
            client,
            mount: config.mount.clone(),
        })
    }
}

#[async_trait]
impl SecretsStore for VaultSecretsStore {
    async fn get_secret(&self, name: &str) -> NotificationResult<HashMap<String, String>> {
        let secret: HashMap<String, String> = kv2::read(&self.client, &self.mount, name)
            .await
            .map_err(|e| {
                NotificationError::SecretsStore(format!("failed to read secret '{name}': {e}"))
            })?;

        info!(secret = %name, keys = secret.len(), "Fetched secret from Vault");
        Ok(secret)
    }
}
