//! PostgreSQL adapter for DomainRepository

use async_trait::async_trait;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use super::db_err;
use crate::domain::entities::{DomainId, NewTenantDomain, TenantDomain, TenantId};
use crate::domain::ports::DomainRepository;
use crate::entity::domains;
use crate::error::DomainError;

/// PostgreSQL implementation of DomainRepository
pub struct PostgresDomainRepository {
    db: DatabaseConnection,
}

impl PostgresDomainRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DomainRepository for PostgresDomainRepository {
    async fn find_by_id(&self, id: &DomainId) -> Result<Option<TenantDomain>, DomainError> {
        let result = domains::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.map(|m| m.into()))
    }

    async fn find_by_domain(&self, domain: &str) -> Result<Option<TenantDomain>, DomainError> {
        let result = domains::Entity::find()
            .filter(domains::Column::Domain.eq(domain))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.map(|m| m.into()))
    }

    async fn find_by_tenant(&self, tenant_id: &TenantId) -> Result<Vec<TenantDomain>, DomainError> {
        let results = domains::Entity::find()
            .filter(domains::Column::TenantId.eq(tenant_id.0))
            .order_by_desc(domains::Column::IsPrimary)
            .order_by_asc(domains::Column::Domain)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn find_all(&self, limit: i64, offset: i64) -> Result<Vec<TenantDomain>, DomainError> {
        let results = domains::Entity::find()
            .order_by_asc(domains::Column::Domain)
            .offset(offset as u64)
            .limit(limit as u64)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn create(&self, domain: &NewTenantDomain) -> Result<TenantDomain, DomainError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        if domain.is_primary {
            domains::Entity::update_many()
                .col_expr(domains::Column::IsPrimary, Expr::value(false))
                .filter(domains::Column::TenantId.eq(domain.tenant_id.0))
                .exec(&txn)
                .await
                .map_err(db_err)?;
        }

        let result = domains::ActiveModel {
            id: Set(Uuid::new_v4()),
            domain: Set(domain.domain.clone()),
            tenant_id: Set(domain.tenant_id.0),
            is_primary: Set(domain.is_primary),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        Ok(result.into())
    }

    async fn set_primary(&self, id: &DomainId) -> Result<TenantDomain, DomainError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let existing = domains::Entity::find_by_id(id.0)
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::NotFound(format!("Domain {} not found", id)))?;

        // Demote first so the one-primary index never sees two rows
        domains::Entity::update_many()
            .col_expr(domains::Column::IsPrimary, Expr::value(false))
            .filter(domains::Column::TenantId.eq(existing.tenant_id))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        let result = domains::ActiveModel {
            id: Set(id.0),
            is_primary: Set(true),
            ..Default::default()
        }
        .update(&txn)
        .await
        .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        Ok(result.into())
    }

    async fn delete(&self, id: &DomainId) -> Result<(), DomainError> {
        let result = domains::Entity::delete_by_id(id.0)
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound(format!("Domain {} not found", id)));
        }
        Ok(())
    }
}

/// Convert SeaORM model to domain entity
impl From<domains::Model> for TenantDomain {
    fn from(model: domains::Model) -> Self {
        TenantDomain {
            id: DomainId(model.id),
            domain: model.domain,
            tenant_id: TenantId(model.tenant_id),
            is_primary: model.is_primary,
        }
    }
}
