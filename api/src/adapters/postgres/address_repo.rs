//! PostgreSQL adapter for AddressRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use super::db_err;
use crate::domain::entities::{Address, AddressId, NewAddress, TenantId};
use crate::domain::ports::AddressRepository;
use crate::entity::{addresses, users};
use crate::error::DomainError;

/// PostgreSQL implementation of AddressRepository
pub struct PostgresAddressRepository {
    db: DatabaseConnection,
}

impl PostgresAddressRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AddressRepository for PostgresAddressRepository {
    async fn find_by_id(&self, id: &AddressId) -> Result<Option<Address>, DomainError> {
        let result = addresses::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.map(|m| m.into()))
    }

    async fn find_by_tenant(&self, tenant_id: &TenantId) -> Result<Vec<Address>, DomainError> {
        let address_ids: Vec<Option<Uuid>> = users::Entity::find()
            .select_only()
            .column(users::Column::AddressId)
            .filter(users::Column::TenantId.eq(tenant_id.0))
            .filter(users::Column::AddressId.is_not_null())
            .distinct()
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let ids: Vec<Uuid> = address_ids.into_iter().flatten().collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let results = addresses::Entity::find()
            .filter(addresses::Column::Id.is_in(ids))
            .order_by_asc(addresses::Column::City)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn create(&self, address: &NewAddress) -> Result<Address, DomainError> {
        let model = addresses::ActiveModel {
            id: Set(Uuid::new_v4()),
            country: Set(address.country.clone()),
            state: Set(address.state.clone()),
            city: Set(address.city.clone()),
            address_line1: Set(address.address_line1.clone()),
            address_line2: Set(address.address_line2.clone()),
            zip_code: Set(address.zip_code.clone()),
        };

        let result = model.insert(&self.db).await.map_err(db_err)?;

        Ok(result.into())
    }

    async fn update(&self, id: &AddressId, address: &NewAddress) -> Result<Address, DomainError> {
        let result = addresses::ActiveModel {
            id: Set(id.0),
            country: Set(address.country.clone()),
            state: Set(address.state.clone()),
            city: Set(address.city.clone()),
            address_line1: Set(address.address_line1.clone()),
            address_line2: Set(address.address_line2.clone()),
            zip_code: Set(address.zip_code.clone()),
        }
        .update(&self.db)
        .await
        .map_err(db_err)?;

        Ok(result.into())
    }

    async fn count_users(&self, id: &AddressId) -> Result<u64, DomainError> {
        users::Entity::find()
            .filter(users::Column::AddressId.eq(id.0))
            .count(&self.db)
            .await
            .map_err(db_err)
    }

    async fn delete(&self, id: &AddressId) -> Result<(), DomainError> {
        addresses::Entity::delete_by_id(id.0)
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        Ok(())
    }
}

/// Convert SeaORM model to domain entity
impl From<addresses::Model> for Address {
    fn from(model: addresses::Model) -> Self {
        Address {
            id: AddressId(model.id),
            country: model.country,
            state: model.state,
            city: model.city,
            address_line1: model.address_line1,
            address_line2: model.address_line2,
            zip_code: model.zip_code,
        }
    }
}
