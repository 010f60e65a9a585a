use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::NotificationResult;

/// Repository trait for confirmation token persistence.
///
/// The handler only ever pushes a token's expiration forward; reads
/// and inserts belong to the account service that issued the token.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Set the expiration of the row matching `confirmation_token`.
    ///
    /// Returns the number of rows updated. Zero is not an error here;
    /// the caller decides how to treat a missing token.
    async fn extend_expiration(
        &self,
        confirmation_token: &str,
        expires_at: DateTime<Utc>,
    ) -> NotificationResult<u64>;
}
