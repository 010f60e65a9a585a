use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, Database, DatabaseConnection, EntityTrait, QueryFilter};
use tracing::{debug, warn};

use crate::config::DatabaseConfig;
use crate::entity;
use crate::error::{NotificationError, NotificationResult};
use crate::repository::TokenRepository;

/// Postgres-backed token repository.
///
/// The connection is scoped to a single update: acquire, execute,
/// release on every exit path. No pooling across records.
pub struct PgTokenRepository {
    config: DatabaseConfig,
}

impl PgTokenRepository {
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }

    async fn connect(&self) -> NotificationResult<DatabaseConnection> {
        Database::connect(self.config.connection_url())
            .await
            .map_err(|e| NotificationError::Database(format!("connection failed: {e}")))
    }
}

#[async_trait]
impl TokenRepository for PgTokenRepository {
    async fn extend_expiration(
        &self,
        confirmation_token: &str,
        expires_at: DateTime<Utc>,
    ) -> NotificationResult<u64> {
        let db = self.connect().await?;

        let result = entity::Entity::update_many()
            .col_expr(
                entity::Column::ExpirationDate,
                Expr::value(sea_orm::prelude::DateTimeWithTimeZone::from(expires_at)),
            )
            .filter(entity::Column::ConfirmationToken.eq(confirmation_token))
            .exec(&db)
            .await;

        if let Err(e) = db.close().await {
            warn!(error = %e, "Failed to close database connection");
        }

        let result = result
            .map_err(|e| NotificationError::Database(format!("expiration update failed: {e}")))?;

        debug!(
            rows_affected = result.rows_affected,
            "Executed expiration update"
        );
        Ok(result.rows_affected)
    }
}
