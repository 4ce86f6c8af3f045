//! Repository port traits
//!
//! These traits define the interface for data persistence.
//! Implementations are provided by adapters (e.g., PostgreSQL).

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::{
    Address, AddressId, DomainId, Invitation, InvitationId, NewAddress, NewInvitation, NewTenant,
    NewTenantDomain, NewUser, Tenant, TenantDomain, TenantId, User, UserId,
};
use crate::error::DomainError;

/// Repository for Tenant entities
#[async_trait]
pub trait TenantRepository: Send + Sync {
    /// Find a tenant by ID
    async fn find_by_id(&self, id: &TenantId) -> Result<Option<Tenant>, DomainError>;

    /// Find a tenant by its schema name
    async fn find_by_schema_name(&self, schema_name: &str) -> Result<Option<Tenant>, DomainError>;

    /// Find tenants owned by a user
    async fn find_by_owner(&self, owner: &UserId) -> Result<Vec<Tenant>, DomainError>;

    /// List tenants, newest first
    async fn find_all(&self, limit: i64, offset: i64) -> Result<Vec<Tenant>, DomainError>;

    /// Create a tenant together with its primary domain.
    ///
    /// Both rows are written in one transaction.
    async fn create(
        &self,
        tenant: &NewTenant,
        primary_domain: &str,
    ) -> Result<(Tenant, TenantDomain), DomainError>;

    /// Persist name, subscription, trial and owner fields
    async fn update(&self, tenant: &Tenant) -> Result<Tenant, DomainError>;

    /// Delete a tenant with its domains and invitations
    async fn delete(&self, id: &TenantId) -> Result<(), DomainError>;
}

/// Repository for tenant domain bindings
#[async_trait]
pub trait DomainRepository: Send + Sync {
    /// Find a domain binding by ID
    async fn find_by_id(&self, id: &DomainId) -> Result<Option<TenantDomain>, DomainError>;

    /// Find the binding for a host name
    async fn find_by_domain(&self, domain: &str) -> Result<Option<TenantDomain>, DomainError>;

    /// All bindings of a tenant, primary first
    async fn find_by_tenant(&self, tenant_id: &TenantId) -> Result<Vec<TenantDomain>, DomainError>;

    /// List all bindings
    async fn find_all(&self, limit: i64, offset: i64) -> Result<Vec<TenantDomain>, DomainError>;

    /// Bind a new domain. A primary binding demotes the tenant's other domains.
    async fn create(&self, domain: &NewTenantDomain) -> Result<TenantDomain, DomainError>;

    /// Make a binding the tenant's only primary domain
    async fn set_primary(&self, id: &DomainId) -> Result<TenantDomain, DomainError>;

    /// Remove a binding
    async fn delete(&self, id: &DomainId) -> Result<(), DomainError>;
}

/// Repository for User entities
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by ID
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    /// Find a user by email (case-insensitive)
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Members of a tenant, ordered by join date
    async fn find_by_tenant(
        &self,
        tenant_id: &TenantId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<User>, DomainError>;

    /// Count members of a tenant
    async fn count_by_tenant(&self, tenant_id: &TenantId) -> Result<u64, DomainError>;

    /// Create a new user
    async fn create(&self, user: &NewUser) -> Result<User, DomainError>;

    /// Persist profile fields, address link, flags and language
    async fn update(&self, user: &User) -> Result<User, DomainError>;

    /// Bind a user to a tenant, or unbind with `None`
    async fn set_tenant(&self, id: &UserId, tenant_id: Option<TenantId>)
        -> Result<(), DomainError>;

    /// Record a successful login
    async fn update_last_login(&self, id: &UserId) -> Result<(), DomainError>;

    /// Delete a user and the invitations they sent
    async fn delete(&self, id: &UserId) -> Result<(), DomainError>;
}

/// Repository for Address entities
#[async_trait]
pub trait AddressRepository: Send + Sync {
    /// Find an address by ID
    async fn find_by_id(&self, id: &AddressId) -> Result<Option<Address>, DomainError>;

    /// Addresses used by members of a tenant
    async fn find_by_tenant(&self, tenant_id: &TenantId) -> Result<Vec<Address>, DomainError>;

    /// Create a new address
    async fn create(&self, address: &NewAddress) -> Result<Address, DomainError>;

    /// Overwrite the fields of an address
    async fn update(&self, id: &AddressId, address: &NewAddress) -> Result<Address, DomainError>;

    /// Number of users pointing at an address
    async fn count_users(&self, id: &AddressId) -> Result<u64, DomainError>;

    /// Delete an address
    async fn delete(&self, id: &AddressId) -> Result<(), DomainError>;
}

/// Repository for Invitation entities
#[async_trait]
pub trait InvitationRepository: Send + Sync {
    /// Find an invitation by ID
    async fn find_by_id(&self, id: &InvitationId) -> Result<Option<Invitation>, DomainError>;

    /// Find the invitation of an email to a tenant
    async fn find_by_tenant_and_email(
        &self,
        tenant_id: &TenantId,
        email: &str,
    ) -> Result<Option<Invitation>, DomainError>;

    /// Invitations of the given tenants
    async fn find_by_tenants(&self, tenant_ids: &[TenantId])
        -> Result<Vec<Invitation>, DomainError>;

    /// Invitations addressed to an email
    async fn find_by_email(&self, email: &str) -> Result<Vec<Invitation>, DomainError>;

    /// List all invitations, newest first
    async fn find_all(&self, limit: i64, offset: i64) -> Result<Vec<Invitation>, DomainError>;

    /// Create a new invitation
    async fn create(&self, invitation: &NewInvitation) -> Result<Invitation, DomainError>;

    /// Persist status, inviter, expiry and acceptance time
    async fn update(&self, invitation: &Invitation) -> Result<Invitation, DomainError>;

    /// Delete an invitation
    async fn delete(&self, id: &InvitationId) -> Result<(), DomainError>;

    /// Mark every pending invitation past its expiry as expired.
    ///
    /// Returns the number of invitations changed.
    async fn expire_pending(&self, now: DateTime<Utc>) -> Result<u64, DomainError>;
}

/// Store of revoked refresh tokens
#[async_trait]
pub trait RevokedTokenRepository: Send + Sync {
    /// Revoke a token id until its natural expiry.
    /// Returns false when the id was already revoked.
    async fn revoke(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<bool, DomainError>;

    /// Check if a token id was revoked
    async fn is_revoked(&self, jti: &str) -> Result<bool, DomainError>;

    /// Forget revocations whose tokens have expired anyway
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, DomainError>;
}
