//! PostgreSQL adapter for InvitationRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::{Expr, Func},
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use super::db_err;
use crate::domain::entities::{
    Invitation, InvitationId, InvitationStatus, NewInvitation, TenantId, UserId,
};
use crate::domain::ports::InvitationRepository;
use crate::entity::invitations;
use crate::error::DomainError;

/// PostgreSQL implementation of InvitationRepository
pub struct PostgresInvitationRepository {
    db: DatabaseConnection,
}

impl PostgresInvitationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl InvitationRepository for PostgresInvitationRepository {
    async fn find_by_id(&self, id: &InvitationId) -> Result<Option<Invitation>, DomainError> {
        let result = invitations::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.map(|m| m.into()))
    }

    async fn find_by_tenant_and_email(
        &self,
        tenant_id: &TenantId,
        email: &str,
    ) -> Result<Option<Invitation>, DomainError> {
        let result = invitations::Entity::find()
            .filter(invitations::Column::TenantId.eq(tenant_id.0))
            .filter(
                Expr::expr(Func::lower(Expr::col(invitations::Column::Email)))
                    .eq(email.trim().to_lowercase()),
            )
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.map(|m| m.into()))
    }

    async fn find_by_tenants(
        &self,
        tenant_ids: &[TenantId],
    ) -> Result<Vec<Invitation>, DomainError> {
        if tenant_ids.is_empty() {
            return Ok(Vec::new());
        }

        let results = invitations::Entity::find()
            .filter(invitations::Column::TenantId.is_in(tenant_ids.iter().map(|t| t.0)))
            .order_by_desc(invitations::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn find_by_email(&self, email: &str) -> Result<Vec<Invitation>, DomainError> {
        let results = invitations::Entity::find()
            .filter(
                Expr::expr(Func::lower(Expr::col(invitations::Column::Email)))
                    .eq(email.trim().to_lowercase()),
            )
            .order_by_desc(invitations::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn find_all(&self, limit: i64, offset: i64) -> Result<Vec<Invitation>, DomainError> {
        let results = invitations::Entity::find()
            .order_by_desc(invitations::Column::CreatedAt)
            .offset(offset as u64)
            .limit(limit as u64)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn create(&self, invitation: &NewInvitation) -> Result<Invitation, DomainError> {
        let model = invitations::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(invitation.tenant_id.0),
            email: Set(invitation.email.clone()),
            invited_by: Set(invitation.invited_by.0),
            status: Set(InvitationStatus::Pending.to_string()),
            created_at: Set(Utc::now().fixed_offset()),
            expires_at: Set(invitation.expires_at.fixed_offset()),
            accepted_at: Set(None),
        };

        let result = model.insert(&self.db).await.map_err(db_err)?;

        Ok(result.into())
    }

    async fn update(&self, invitation: &Invitation) -> Result<Invitation, DomainError> {
        let result = invitations::ActiveModel {
            id: Set(invitation.id.0),
            invited_by: Set(invitation.invited_by.0),
            status: Set(invitation.status.to_string()),
            expires_at: Set(invitation.expires_at.fixed_offset()),
            accepted_at: Set(invitation.accepted_at.map(|dt| dt.fixed_offset())),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .map_err(db_err)?;

        Ok(result.into())
    }

    async fn delete(&self, id: &InvitationId) -> Result<(), DomainError> {
        let result = invitations::Entity::delete_by_id(id.0)
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound(format!(
                "Invitation {} not found",
                id
            )));
        }
        Ok(())
    }

    async fn expire_pending(&self, now: DateTime<Utc>) -> Result<u64, DomainError> {
        let result = invitations::Entity::update_many()
            .col_expr(
                invitations::Column::Status,
                Expr::value(InvitationStatus::Expired.to_string()),
            )
            .filter(invitations::Column::Status.eq(InvitationStatus::Pending.to_string()))
            .filter(invitations::Column::ExpiresAt.lt(now.fixed_offset()))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected)
    }
}

/// Convert SeaORM model to domain entity
impl From<invitations::Model> for Invitation {
    fn from(model: invitations::Model) -> Self {
        Invitation {
            id: InvitationId(model.id),
            tenant_id: TenantId(model.tenant_id),
            email: model.email,
            invited_by: UserId(model.invited_by),
            status: model.status.parse().unwrap_or(InvitationStatus::Pending),
            created_at: model.created_at.with_timezone(&Utc),
            expires_at: model.expires_at.with_timezone(&Utc),
            accepted_at: model.accepted_at.map(|dt| dt.with_timezone(&Utc)),
        }
    }
}
