//! Adapters layer
//!
//! Implementations of port traits for external systems.

pub mod mail;
pub mod postgres;

pub use mail::MailTransport;
pub use postgres::{
    PostgresAddressRepository, PostgresDomainRepository, PostgresInvitationRepository,
    PostgresRevokedTokenRepository, PostgresSchemaManager, PostgresTenantRepository,
    PostgresUserRepository,
};
