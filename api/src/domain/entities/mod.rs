//! Domain entities
//!
//! Pure domain models representing core business concepts.
//! These are separate from the SeaORM entities in the `entity` module.

pub mod address;
pub mod invitation;
pub mod language;
pub mod tenant;
pub mod tenant_domain;
pub mod user;

pub use address::{Address, AddressId, NewAddress};
pub use invitation::{
    Invitation, InvitationId, InvitationStatus, NewInvitation, DEFAULT_INVITATION_TTL_DAYS,
};
pub use language::Language;
pub use tenant::{NewTenant, Tenant, TenantId, DEFAULT_TRIAL_DAYS};
pub use tenant_domain::{DomainId, NewTenantDomain, TenantDomain};
pub use user::{Gender, NewUser, ProfileUpdate, User, UserId};
