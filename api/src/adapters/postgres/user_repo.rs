//! PostgreSQL adapter for UserRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sea_query::{Expr, Func},
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use super::db_err;
use crate::domain::entities::{AddressId, Language, NewUser, TenantId, User, UserId};
use crate::domain::ports::UserRepository;
use crate::entity::{invitations, users};
use crate::error::DomainError;

/// PostgreSQL implementation of UserRepository
pub struct PostgresUserRepository {
    db: DatabaseConnection,
}

impl PostgresUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let result = users::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.map(|m| m.into()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let result = users::Entity::find()
            .filter(
                Expr::expr(Func::lower(Expr::col(users::Column::Email)))
                    .eq(email.trim().to_lowercase()),
            )
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.map(|m| m.into()))
    }

    async fn find_by_tenant(
        &self,
        tenant_id: &TenantId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<User>, DomainError> {
        let results = users::Entity::find()
            .filter(users::Column::TenantId.eq(tenant_id.0))
            .order_by_asc(users::Column::DateJoined)
            .offset(offset as u64)
            .limit(limit as u64)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn count_by_tenant(&self, tenant_id: &TenantId) -> Result<u64, DomainError> {
        users::Entity::find()
            .filter(users::Column::TenantId.eq(tenant_id.0))
            .count(&self.db)
            .await
            .map_err(db_err)
    }

    async fn create(&self, user: &NewUser) -> Result<User, DomainError> {
        let model = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(user.email.clone()),
            password_hash: Set(user.password_hash.clone()),
            first_name: Set(user.first_name.clone()),
            last_name: Set(user.last_name.clone()),
            phone_number: Set(user.phone_number.clone()),
            gender: Set(user.gender.map(|g| g.to_string())),
            tenant_id: Set(user.tenant_id.map(|id| id.0)),
            address_id: Set(None),
            is_active: Set(user.is_active),
            is_staff: Set(user.is_staff),
            is_superuser: Set(user.is_superuser),
            date_joined: Set(Utc::now().fixed_offset()),
            last_login: Set(None),
            preferred_language: Set(user.preferred_language.to_string()),
        };

        let result = model.insert(&self.db).await.map_err(db_err)?;

        Ok(result.into())
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let result = users::ActiveModel {
            id: Set(user.id.0),
            password_hash: Set(user.password_hash.clone()),
            first_name: Set(user.first_name.clone()),
            last_name: Set(user.last_name.clone()),
            phone_number: Set(user.phone_number.clone()),
            gender: Set(user.gender.map(|g| g.to_string())),
            address_id: Set(user.address_id.map(|id| id.0)),
            is_active: Set(user.is_active),
            is_staff: Set(user.is_staff),
            is_superuser: Set(user.is_superuser),
            preferred_language: Set(user.preferred_language.to_string()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .map_err(db_err)?;

        Ok(result.into())
    }

    async fn set_tenant(
        &self,
        id: &UserId,
        tenant_id: Option<TenantId>,
    ) -> Result<(), DomainError> {
        users::ActiveModel {
            id: Set(id.0),
            tenant_id: Set(tenant_id.map(|t| t.0)),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn update_last_login(&self, id: &UserId) -> Result<(), DomainError> {
        users::ActiveModel {
            id: Set(id.0),
            last_login: Set(Some(Utc::now().fixed_offset())),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn delete(&self, id: &UserId) -> Result<(), DomainError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        invitations::Entity::delete_many()
            .filter(invitations::Column::InvitedBy.eq(id.0))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        let result = users::Entity::delete_by_id(id.0)
            .exec(&txn)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound(format!("User {} not found", id)));
        }

        txn.commit().await.map_err(db_err)?;
        Ok(())
    }
}

/// Convert SeaORM model to domain entity
impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        User {
            id: UserId(model.id),
            email: model.email,
            password_hash: model.password_hash,
            first_name: model.first_name,
            last_name: model.last_name,
            phone_number: model.phone_number,
            gender: model.gender.and_then(|g| g.parse().ok()),
            tenant_id: model.tenant_id.map(TenantId),
            address_id: model.address_id.map(AddressId),
            is_active: model.is_active,
            is_staff: model.is_staff,
            is_superuser: model.is_superuser,
            date_joined: model.date_joined.with_timezone(&Utc),
            last_login: model.last_login.map(|dt| dt.with_timezone(&Utc)),
            preferred_language: model
                .preferred_language
                .parse()
                .unwrap_or(Language::default()),
        }
    }
}
