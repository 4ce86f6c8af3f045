//! Tenant schema port
//!
//! Each tenant owns one database schema. The schema manager creates and
//! drops those schemas; it never touches the public tables.

use async_trait::async_trait;

use crate::error::DomainError;

/// Longest identifier Postgres accepts
pub const MAX_SCHEMA_IDENT_LEN: usize = 63;

#[async_trait]
pub trait SchemaManager: Send + Sync {
    /// Create the schema if it does not exist yet
    async fn create_schema(&self, schema_name: &str) -> Result<(), DomainError>;

    /// Drop the schema and everything in it
    async fn drop_schema(&self, schema_name: &str) -> Result<(), DomainError>;

    /// Check if the schema exists
    async fn schema_exists(&self, schema_name: &str) -> Result<bool, DomainError>;
}

/// Schema names are interpolated into DDL, so only `[a-z0-9_]` is allowed
pub fn check_schema_ident(schema_name: &str) -> Result<(), DomainError> {
    let valid = !schema_name.is_empty()
        && schema_name.len() <= MAX_SCHEMA_IDENT_LEN
        && schema_name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(DomainError::Schema(format!(
            "Invalid schema name: {}",
            schema_name
        )))
    }
}
