//! HTTP handlers
//!
//! Axum request handlers for the API endpoints.

pub mod auth;
pub mod common;
pub mod domains;
pub mod invitations;
pub mod language;
pub mod tenant_users;
pub mod tenants;
pub mod users;

pub use auth::{login, logout, refresh, register};
pub use domains::{create_domain, delete_domain, get_domain, list_domains, make_primary};
pub use invitations::{
    accept_invitation, create_invitation, decline_invitation, delete_invitation, get_invitation,
    list_invitations, resend_invitation,
};
pub use language::{get_language, set_language};
pub use tenant_users::{
    create_member, delete_member, get_member, list_addresses, list_members, update_member,
};
pub use tenants::{
    create_tenant, current_tenant, delete_tenant, get_tenant, list_tenants, start_trial,
    update_tenant,
};
pub use users::{clear_my_address, delete_me, get_me, set_my_address, update_me};
