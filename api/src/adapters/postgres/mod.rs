//! PostgreSQL adapters
//!
//! Implementations of repository traits using SeaORM and PostgreSQL.

pub mod address_repo;
pub mod domain_repo;
pub mod invitation_repo;
pub mod revoked_token_repo;
pub mod schema_manager;
pub mod tenant_repo;
pub mod user_repo;


pub use address_repo::PostgresAddressRepository;
pub use domain_repo::PostgresDomainRepository;
pub use invitation_repo::PostgresInvitationRepository;
pub use revoked_token_repo::PostgresRevokedTokenRepository;
pub use schema_manager::PostgresSchemaManager;
pub use tenant_repo::PostgresTenantRepository;
pub use user_repo::PostgresUserRepository;

use sea_orm::{DbErr, SqlErr};

use crate::error::DomainError;

/// Map a SeaORM error onto the domain.
///
/// Unique violations become `AlreadyExists`, foreign key violations become
/// `Conflict` (a referenced row is still in use).
pub(crate) fn db_err(e: DbErr) -> DomainError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) => DomainError::AlreadyExists(msg),
        Some(SqlErr::ForeignKeyConstraintViolation(msg)) => DomainError::Conflict(msg),
        _ => match e {
            DbErr::RecordNotFound(msg) => DomainError::NotFound(msg),
            DbErr::RecordNotUpdated => DomainError::NotFound("Record not updated".to_string()),
            e => DomainError::Database(e.to_string()),
        },
    }
}
