//! PostgreSQL schema manager
//!
//! Creates and drops the per-tenant schemas, and applies the public schema
//! migration on startup.

use async_trait::async_trait;
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};

use super::db_err;
use crate::domain::ports::{check_schema_ident, SchemaManager};
use crate::error::DomainError;

const PUBLIC_SCHEMA_MIGRATION: &str = include_str!("../../../migrations/0001_public_schema.sql");

/// PostgreSQL implementation of SchemaManager
pub struct PostgresSchemaManager {
    db: DatabaseConnection,
}

impl PostgresSchemaManager {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create or upgrade the shared tables
    pub async fn migrate(&self) -> Result<(), DomainError> {
        self.db
            .execute_unprepared(PUBLIC_SCHEMA_MIGRATION)
            .await
            .map_err(db_err)?;

        Ok(())
    }
}

#[async_trait]
impl SchemaManager for PostgresSchemaManager {
    async fn create_schema(&self, schema_name: &str) -> Result<(), DomainError> {
        check_schema_ident(schema_name)?;

        // No IF NOT EXISTS: a leftover schema must never be handed to a new tenant
        self.db
            .execute_unprepared(&format!("CREATE SCHEMA \"{}\"", schema_name))
            .await
            .map_err(|e| {
                let message = e.to_string();
                if message.contains("already exists") {
                    DomainError::AlreadyExists(format!("Schema '{}'", schema_name))
                } else {
                    DomainError::Schema(message)
                }
            })?;

        Ok(())
    }

    async fn drop_schema(&self, schema_name: &str) -> Result<(), DomainError> {
        check_schema_ident(schema_name)?;
        if schema_name == "public" {
            return Err(DomainError::Schema(
                "Refusing to drop the public schema".to_string(),
            ));
        }

        self.db
            .execute_unprepared(&format!("DROP SCHEMA IF EXISTS \"{}\" CASCADE", schema_name))
            .await
            .map_err(|e| DomainError::Schema(e.to_string()))?;

        Ok(())
    }

    async fn schema_exists(&self, schema_name: &str) -> Result<bool, DomainError> {
        let stmt = Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            "SELECT 1 FROM information_schema.schemata WHERE schema_name = $1",
            [schema_name.into()],
        );

        let row = self.db.query_one(stmt).await.map_err(db_err)?;

        Ok(row.is_some())
    }
}
