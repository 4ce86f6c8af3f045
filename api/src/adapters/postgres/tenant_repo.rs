//! PostgreSQL adapter for TenantRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use super::db_err;
use crate::domain::entities::{NewTenant, Tenant, TenantDomain, TenantId, UserId};
use crate::domain::ports::TenantRepository;
use crate::entity::{domains, invitations, tenants};
use crate::error::DomainError;

/// PostgreSQL implementation of TenantRepository
pub struct PostgresTenantRepository {
    db: DatabaseConnection,
}

impl PostgresTenantRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TenantRepository for PostgresTenantRepository {
    async fn find_by_id(&self, id: &TenantId) -> Result<Option<Tenant>, DomainError> {
        let result = tenants::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.map(|m| m.into()))
    }

    async fn find_by_schema_name(&self, schema_name: &str) -> Result<Option<Tenant>, DomainError> {
        let result = tenants::Entity::find()
            .filter(tenants::Column::SchemaName.eq(schema_name))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.map(|m| m.into()))
    }

    async fn find_by_owner(&self, owner: &UserId) -> Result<Vec<Tenant>, DomainError> {
        let results = tenants::Entity::find()
            .filter(tenants::Column::OwnerId.eq(owner.0))
            .order_by_asc(tenants::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn find_all(&self, limit: i64, offset: i64) -> Result<Vec<Tenant>, DomainError> {
        let results = tenants::Entity::find()
            .order_by_desc(tenants::Column::CreatedAt)
            .offset(offset as u64)
            .limit(limit as u64)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn create(
        &self,
        tenant: &NewTenant,
        primary_domain: &str,
    ) -> Result<(Tenant, TenantDomain), DomainError> {
        let tenant_id = Uuid::new_v4();
        let now = Utc::now().fixed_offset();

        let txn = self.db.begin().await.map_err(db_err)?;

        let tenant_model = tenants::ActiveModel {
            id: Set(tenant_id),
            schema_name: Set(tenant.schema_name.clone()),
            name: Set(tenant.name.clone()),
            paid_until: Set(tenant.paid_until),
            trial_end_date: Set(tenant.trial_end_date),
            owner_id: Set(tenant.owner_id.map(|id| id.0)),
            created_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        let domain_model = domains::ActiveModel {
            id: Set(Uuid::new_v4()),
            domain: Set(primary_domain.to_string()),
            tenant_id: Set(tenant_id),
            is_primary: Set(true),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        Ok((tenant_model.into(), domain_model.into()))
    }

    async fn update(&self, tenant: &Tenant) -> Result<Tenant, DomainError> {
        let result = tenants::ActiveModel {
            id: Set(tenant.id.0),
            name: Set(tenant.name.clone()),
            paid_until: Set(tenant.paid_until),
            trial_end_date: Set(tenant.trial_end_date),
            owner_id: Set(tenant.owner_id.map(|id| id.0)),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .map_err(db_err)?;

        Ok(result.into())
    }

    async fn delete(&self, id: &TenantId) -> Result<(), DomainError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        domains::Entity::delete_many()
            .filter(domains::Column::TenantId.eq(id.0))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        invitations::Entity::delete_many()
            .filter(invitations::Column::TenantId.eq(id.0))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        let result = tenants::Entity::delete_by_id(id.0)
            .exec(&txn)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound(format!("Tenant {} not found", id)));
        }

        txn.commit().await.map_err(db_err)?;
        Ok(())
    }
}

/// Convert SeaORM model to domain entity
impl From<tenants::Model> for Tenant {
    fn from(model: tenants::Model) -> Self {
        Tenant {
            id: TenantId(model.id),
            schema_name: model.schema_name,
            name: model.name,
            paid_until: model.paid_until,
            trial_end_date: model.trial_end_date,
            owner_id: model.owner_id.map(UserId),
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}
