//! PostgreSQL adapter for RevokedTokenRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::OnConflict, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TryInsertResult,
};

use super::db_err;
use crate::domain::ports::RevokedTokenRepository;
use crate::entity::revoked_tokens;
use crate::error::DomainError;

/// PostgreSQL implementation of RevokedTokenRepository
pub struct PostgresRevokedTokenRepository {
    db: DatabaseConnection,
}

impl PostgresRevokedTokenRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RevokedTokenRepository for PostgresRevokedTokenRepository {
    async fn revoke(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<bool, DomainError> {
        let model = revoked_tokens::ActiveModel {
            jti: Set(jti.to_string()),
            expires_at: Set(expires_at.fixed_offset()),
            revoked_at: Set(Utc::now().fixed_offset()),
        };

        // The primary key decides which of two concurrent revocations wins
        let result = revoked_tokens::Entity::insert(model)
            .on_conflict(
                OnConflict::column(revoked_tokens::Column::Jti)
                    .do_nothing()
                    .to_owned(),
            )
            .do_nothing()
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        Ok(matches!(result, TryInsertResult::Inserted(_)))
    }

    async fn is_revoked(&self, jti: &str) -> Result<bool, DomainError> {
        let result = revoked_tokens::Entity::find_by_id(jti.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.is_some())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, DomainError> {
        let result = revoked_tokens::Entity::delete_many()
            .filter(revoked_tokens::Column::ExpiresAt.lt(now.fixed_offset()))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected)
    }
}
