//! The notification handler: one invocation, one batch.
//!
//! Control flow is a linear pipeline per record with early exit at the
//! batch level: resolve credentials once, then for each record parse,
//! render, send, and optionally push the confirmation token expiration
//! forward. The first send or update failure aborts the batch and maps
//! to the corresponding terminal status; remaining records are dropped.

use crate::config::HandlerConfig;
use crate::credentials::CredentialsSource;
use crate::error::NotificationResult;
use crate::models::{BatchStatus, NotificationEvent, VerificationEmail};
use crate::postgres::PgTokenRepository;
use crate::providers::{EmailProvider, MailgunProvider};
use crate::repository::TokenRepository;
use crate::templates::{BodyStyle, TemplateEngine, LINK_EXPIRY_MINUTES, VERIFICATION_SUBJECT};
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Handles one batch of verification notification events.
pub struct NotificationHandler {
    credentials: CredentialsSource,
    provider: Arc<dyn EmailProvider>,
    templates: TemplateEngine,
    token_repository: Option<Arc<dyn TokenRepository>>,
}

impl NotificationHandler {
    /// Assemble a handler from explicit collaborators.
    pub fn new(
        credentials: CredentialsSource,
        provider: Arc<dyn EmailProvider>,
        token_repository: Option<Arc<dyn TokenRepository>>,
    ) -> NotificationResult<Self> {
        Ok(Self {
            credentials,
            provider,
            templates: TemplateEngine::new()?,
            token_repository,
        })
    }

    /// Wire the production collaborators from configuration.
    pub fn from_config(config: &HandlerConfig) -> NotificationResult<Self> {
        let token_repository: Option<Arc<dyn TokenRepository>> = config
            .database
            .clone()
            .map(|db| Arc::new(PgTokenRepository::new(db)) as Arc<dyn TokenRepository>);

        Self::new(
            CredentialsSource::from_config(&config.credentials)?,
            Arc::new(MailgunProvider::new()),
            token_repository,
        )
    }

    /// The revision with the expiration update sends the plain-text
    /// expiry notice; the others send the HTML + text link pair.
    fn body_style(&self) -> BodyStyle {
        if self.token_repository.is_some() {
            BodyStyle::ExpiryNotice
        } else {
            BodyStyle::LinkPair
        }
    }

    /// Process one batch to completion or early abort.
    ///
    /// Fatal failures (configuration, credentials, malformed payloads)
    /// propagate as `Err`. Send and update failures are terminal for
    /// the batch but convert to their `BatchStatus` result.
    pub async fn handle(&self, event: NotificationEvent) -> NotificationResult<BatchStatus> {
        let credentials = self.credentials.resolve().await?;
        let from = credentials.from_address();

        for (index, record) in event.records.iter().enumerate() {
            let request = record.parse()?;

            let body = self
                .templates
                .render_verification(self.body_style(), &request.activation_link)?;
            let email = VerificationEmail {
                from: from.clone(),
                to: request.email.clone(),
                subject: VERIFICATION_SUBJECT.to_string(),
                text_body: body.text,
                html_body: body.html,
            };

            match self.provider.send(&credentials, &email).await {
                Ok(sent) => {
                    info!(
                        record = index,
                        to = %request.email,
                        message_id = ?sent.message_id,
                        "Verification email sent"
                    );
                }
                Err(e) => {
                    error!(
                        record = index,
                        to = %request.email,
                        error = %e,
                        "Error sending verification email, aborting batch"
                    );
                    return Ok(BatchStatus::SendFailed);
                }
            }

            if let Some(repository) = &self.token_repository {
                let Some(token_id) = &request.token_id else {
                    warn!(record = index, "Record has no tokenId, skipping expiration update");
                    continue;
                };

                let new_expiration = Utc::now() + Duration::minutes(LINK_EXPIRY_MINUTES);
                match repository.extend_expiration(token_id, new_expiration).await {
                    Ok(0) => {
                        warn!(
                            record = index,
                            token = %token_id,
                            "No confirmation token matched, nothing updated"
                        );
                    }
                    Ok(rows) => {
                        info!(
                            record = index,
                            token = %token_id,
                            rows_affected = rows,
                            new_expiration = %new_expiration,
                            "Extended confirmation token expiration"
                        );
                    }
                    Err(e) => {
                        error!(
                            record = index,
                            token = %token_id,
                            error = %e,
                            "Error updating expiration time, aborting batch"
                        );
                        return Ok(BatchStatus::ExpirationUpdateFailed);
                    }
                }
            }
        }

        Ok(BatchStatus::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotificationError;
    use crate::models::{EmailCredentials, NotificationRecord};
    use crate::providers::{MockEmailProvider, SentEmail};
    use crate::repository::MockTokenRepository;
    use crate::secrets::MockSecretsStore;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const DOMAIN: &str = "mg.example.com";

    fn static_credentials() -> CredentialsSource {
        CredentialsSource::Static(EmailCredentials::new("key-123", DOMAIN))
    }

    fn record(email: &str, token_id: Option<&str>) -> NotificationRecord {
        let mut payload = serde_json::json!({
            "email": email,
            "activationLink": format!("https://app.example.com/verify?u={email}"),
        });
        if let Some(token) = token_id {
            payload["tokenId"] = serde_json::json!(token);
        }
        NotificationRecord::new(payload.to_string())
    }

    fn event(records: Vec<NotificationRecord>) -> NotificationEvent {
        NotificationEvent { records }
    }

    fn accepted() -> NotificationResult<SentEmail> {
        Ok(SentEmail { message_id: None })
    }

    fn handler(
        credentials: CredentialsSource,
        provider: MockEmailProvider,
        repository: Option<MockTokenRepository>,
    ) -> NotificationHandler {
        NotificationHandler::new(
            credentials,
            Arc::new(provider),
            repository.map(|r| Arc::new(r) as Arc<dyn TokenRepository>),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_single_record_success_with_update() {
        let mut provider = MockEmailProvider::new();
        provider
            .expect_send()
            .withf(|credentials, email| {
                credentials.domain_name == DOMAIN
                    && email.from == format!("noreply@{DOMAIN}")
                    && email.to == "user@example.com"
                    && email.subject == "Verify Your Email Address"
                    && email.text_body.contains("https://app.example.com/verify")
            })
            .times(1)
            .returning(|_, _| accepted());

        let mut repository = MockTokenRepository::new();
        repository
            .expect_extend_expiration()
            .withf(|token, expires_at| {
                // New expiration is now + 2 minutes, give or take test runtime.
                let offset = *expires_at - Utc::now();
                token == "tok-1" && offset > Duration::seconds(110) && offset <= Duration::seconds(120)
            })
            .times(1)
            .returning(|_, _| Ok(1));

        let handler = handler(static_credentials(), provider, Some(repository));
        let status = handler
            .handle(event(vec![record("user@example.com", Some("tok-1"))]))
            .await
            .unwrap();

        assert_eq!(status, BatchStatus::Success);
    }

    #[tokio::test]
    async fn test_missing_required_field_is_fatal_before_send() {
        let mut provider = MockEmailProvider::new();
        provider.expect_send().times(0);

        let handler = handler(static_credentials(), provider, None);
        let result = handler
            .handle(event(vec![NotificationRecord::new(
                r#"{"email":"user@example.com"}"#,
            )]))
            .await;

        assert!(matches!(result, Err(NotificationError::Payload(_))));
    }

    #[tokio::test]
    async fn test_send_failure_aborts_remaining_records() {
        let calls = AtomicUsize::new(0);
        let mut provider = MockEmailProvider::new();
        provider
            .expect_send()
            .times(2) // exactly two: the success and the failure, never the third
            .returning(move |_, _| {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    accepted()
                } else {
                    Err(NotificationError::Provider("boom".to_string()))
                }
            });

        let handler = handler(static_credentials(), provider, None);
        let status = handler
            .handle(event(vec![
                record("a@example.com", None),
                record("b@example.com", None),
                record("c@example.com", None),
            ]))
            .await
            .unwrap();

        assert_eq!(status, BatchStatus::SendFailed);
    }

    #[tokio::test]
    async fn test_update_failure_after_successful_send() {
        let mut provider = MockEmailProvider::new();
        provider.expect_send().times(1).returning(|_, _| accepted());

        let mut repository = MockTokenRepository::new();
        repository
            .expect_extend_expiration()
            .times(1)
            .returning(|_, _| Err(NotificationError::Database("connection reset".to_string())));

        let handler = handler(static_credentials(), provider, Some(repository));
        let status = handler
            .handle(event(vec![
                record("a@example.com", Some("tok-1")),
                record("b@example.com", Some("tok-2")),
            ]))
            .await
            .unwrap();

        assert_eq!(status, BatchStatus::ExpirationUpdateFailed);
    }

    #[tokio::test]
    async fn test_zero_rows_matched_is_not_an_error() {
        let mut provider = MockEmailProvider::new();
        provider.expect_send().times(1).returning(|_, _| accepted());

        let mut repository = MockTokenRepository::new();
        repository
            .expect_extend_expiration()
            .with(mockall::predicate::eq("unknown"), mockall::predicate::always())
            .times(1)
            .returning(|_, _| Ok(0));

        let handler = handler(static_credentials(), provider, Some(repository));
        let status = handler
            .handle(event(vec![record("user@example.com", Some("unknown"))]))
            .await
            .unwrap();

        assert_eq!(status, BatchStatus::Success);
    }

    #[tokio::test]
    async fn test_record_without_token_id_skips_update() {
        let mut provider = MockEmailProvider::new();
        provider.expect_send().times(1).returning(|_, _| accepted());

        let mut repository = MockTokenRepository::new();
        repository.expect_extend_expiration().times(0);

        let handler = handler(static_credentials(), provider, Some(repository));
        let status = handler
            .handle(event(vec![record("user@example.com", None)]))
            .await
            .unwrap();

        assert_eq!(status, BatchStatus::Success);
    }

    #[tokio::test]
    async fn test_credentials_resolved_once_per_invocation() {
        let mut store = MockSecretsStore::new();
        store
            .expect_get_secret()
            .with(mockall::predicate::eq("email-credentials"))
            .times(1)
            .returning(|_| {
                Ok(HashMap::from([
                    ("MAILGUN_API_KEY".to_string(), "key-123".to_string()),
                    ("MAILGUN_DOMAIN_NAME".to_string(), DOMAIN.to_string()),
                ]))
            });

        let mut provider = MockEmailProvider::new();
        provider
            .expect_send()
            .withf(|_, email| email.from == format!("noreply@{DOMAIN}"))
            .times(3)
            .returning(|_, _| accepted());

        let credentials = CredentialsSource::SecretsStore {
            store: Arc::new(store),
            secret_name: "email-credentials".to_string(),
        };

        let handler = handler(credentials, provider, None);
        let status = handler
            .handle(event(vec![
                record("a@example.com", None),
                record("b@example.com", None),
                record("c@example.com", None),
            ]))
            .await
            .unwrap();

        assert_eq!(status, BatchStatus::Success);
    }

    #[tokio::test]
    async fn test_secrets_store_failure_is_fatal_before_any_send() {
        let mut store = MockSecretsStore::new();
        store
            .expect_get_secret()
            .times(1)
            .returning(|_| Err(NotificationError::SecretsStore("sealed".to_string())));

        let mut provider = MockEmailProvider::new();
        provider.expect_send().times(0);

        let credentials = CredentialsSource::SecretsStore {
            store: Arc::new(store),
            secret_name: "email-credentials".to_string(),
        };

        let handler = handler(credentials, provider, None);
        let result = handler.handle(event(vec![record("a@example.com", None)])).await;

        assert!(matches!(result, Err(NotificationError::SecretsStore(_))));
    }

    #[tokio::test]
    async fn test_body_style_follows_update_toggle() {
        // With updates enabled the email is the plain-text expiry notice.
        let mut provider = MockEmailProvider::new();
        provider
            .expect_send()
            .withf(|_, email| {
                email.html_body.is_none() && email.text_body.contains("expire in 2 minutes")
            })
            .times(1)
            .returning(|_, _| accepted());

        let mut repository = MockTokenRepository::new();
        repository
            .expect_extend_expiration()
            .returning(|_, _| Ok(1));

        let handler = handler(static_credentials(), provider, Some(repository));
        handler
            .handle(event(vec![record("a@example.com", Some("tok-1"))]))
            .await
            .unwrap();

        // Without updates the email carries the HTML link pair.
        let mut provider = MockEmailProvider::new();
        provider
            .expect_send()
            .withf(|_, email| {
                email
                    .html_body
                    .as_deref()
                    .is_some_and(|html| html.contains("Verify Email"))
            })
            .times(1)
            .returning(|_, _| accepted());

        let handler = self::handler(static_credentials(), provider, None);
        handler
            .handle(event(vec![record("a@example.com", None)]))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_empty_batch_is_success() {
        let mut provider = MockEmailProvider::new();
        provider.expect_send().times(0);

        let handler = handler(static_credentials(), provider, None);
        let status = handler.handle(event(vec![])).await.unwrap();

        assert_eq!(status, BatchStatus::Success);
    }
}
