//! Domain ports (traits)
//!
//! Port traits define interfaces that the domain layer requires.
//! Adapters provide concrete implementations of these traits.

pub mod mailer;
pub mod repositories;
pub mod schema;

pub use mailer::{Mailer, OutgoingMail};
pub use repositories::{
    AddressRepository, DomainRepository, InvitationRepository, RevokedTokenRepository,
    TenantRepository, UserRepository,
};
pub use schema::{check_schema_ident, SchemaManager};
