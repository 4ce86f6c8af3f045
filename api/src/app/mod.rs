//! Application layer
//!
//! Contains use cases and service orchestration.
//! Services coordinate between domain entities, ports, and external systems.

pub mod account_service;
pub mod auth_service;
pub mod invitation_service;
pub mod tenant_service;

pub use account_service::{AccountService, NewAccount, RegisteredAccount, Registration};
pub use auth_service::{AuthService, LoginResult};
pub use invitation_service::{InvitationService, InvitationSettings};
pub use tenant_service::{
    ProvisionedTenant, TenantLifecycle, TenantService, TenantSettings, TenantUpdate,
};
