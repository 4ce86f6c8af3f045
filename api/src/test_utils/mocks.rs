//! Mock implementations of port traits
//!
//! These are in-memory implementations that can be configured for testing.
//! The repositories of one [`TestStore`] share their tables, so cascades
//! (tenant -> domains, user -> sent invitations) behave like the database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::domain::entities::{
    Address, AddressId, DomainId, Invitation, InvitationId, InvitationStatus, NewAddress,
    NewInvitation, NewTenant, NewTenantDomain, NewUser, Tenant, TenantDomain, TenantId, User,
    UserId,
};
use crate::domain::ports::{
    AddressRepository, DomainRepository, InvitationRepository, Mailer, OutgoingMail,
    RevokedTokenRepository, SchemaManager, TenantRepository, UserRepository,
};
use crate::error::{DomainError, MailError};

/// Rows of the public schema
#[derive(Default)]
struct Tables {
    tenants: HashMap<TenantId, Tenant>,
    domains: HashMap<DomainId, TenantDomain>,
    users: HashMap<UserId, User>,
    addresses: HashMap<AddressId, Address>,
    invitations: HashMap<InvitationId, Invitation>,
}

type SharedTables = Arc<RwLock<Tables>>;

fn page<T>(rows: Vec<T>, limit: i64, offset: i64) -> Vec<T> {
    rows.into_iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect()
}

// ============================================================================
// In-Memory Tenant Repository
// ============================================================================

#[derive(Default, Clone)]
pub struct InMemoryTenantRepository {
    tables: SharedTables,
}

impl InMemoryTenantRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a tenant as-is
    pub fn insert(&self, tenant: Tenant) -> Tenant {
        let mut tables = self.tables.write().unwrap();
        tables.tenants.insert(tenant.id, tenant.clone());
        tenant
    }
}

#[async_trait]
impl TenantRepository for InMemoryTenantRepository {
    async fn find_by_id(&self, id: &TenantId) -> Result<Option<Tenant>, DomainError> {
        let tables = self.tables.read().unwrap();
        Ok(tables.tenants.get(id).cloned())
    }

    async fn find_by_schema_name(&self, schema_name: &str) -> Result<Option<Tenant>, DomainError> {
        let tables = self.tables.read().unwrap();
        Ok(tables
            .tenants
            .values()
            .find(|t| t.schema_name == schema_name)
            .cloned())
    }

    async fn find_by_owner(&self, owner: &UserId) -> Result<Vec<Tenant>, DomainError> {
        let tables = self.tables.read().unwrap();
        let mut owned: Vec<Tenant> = tables
            .tenants
            .values()
            .filter(|t| t.is_owned_by(owner))
            .cloned()
            .collect();
        owned.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(owned)
    }

    async fn find_all(&self, limit: i64, offset: i64) -> Result<Vec<Tenant>, DomainError> {
        let tables = self.tables.read().unwrap();
        let mut all: Vec<Tenant> = tables.tenants.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page(all, limit, offset))
    }

    async fn create(
        &self,
        new_tenant: &NewTenant,
        primary_domain: &str,
    ) -> Result<(Tenant, TenantDomain), DomainError> {
        let mut tables = self.tables.write().unwrap();

        if tables
            .tenants
            .values()
            .any(|t| t.schema_name == new_tenant.schema_name)
        {
            return Err(DomainError::AlreadyExists(format!(
                "Tenant schema '{}'",
                new_tenant.schema_name
            )));
        }
        if tables.domains.values().any(|d| d.domain == primary_domain) {
            return Err(DomainError::AlreadyExists(format!(
                "Domain '{}'",
                primary_domain
            )));
        }

        let tenant = Tenant {
            id: TenantId::new(),
            schema_name: new_tenant.schema_name.clone(),
            name: new_tenant.name.clone(),
            paid_until: new_tenant.paid_until,
            trial_end_date: new_tenant.trial_end_date,
            owner_id: new_tenant.owner_id,
            created_at: Utc::now(),
        };
        let domain = TenantDomain {
            id: DomainId::new(),
            domain: primary_domain.to_string(),
            tenant_id: tenant.id,
            is_primary: true,
        };

        tables.tenants.insert(tenant.id, tenant.clone());
        tables.domains.insert(domain.id, domain.clone());
        Ok((tenant, domain))
    }

    async fn update(&self, tenant: &Tenant) -> Result<Tenant, DomainError> {
        let mut tables = self.tables.write().unwrap();
        match tables.tenants.get_mut(&tenant.id) {
            Some(stored) => {
                *stored = tenant.clone();
                Ok(tenant.clone())
            }
            None => Err(DomainError::NotFound(format!("Tenant {}", tenant.id))),
        }
    }

    async fn delete(&self, id: &TenantId) -> Result<(), DomainError> {
        let mut tables = self.tables.write().unwrap();
        if tables.tenants.remove(id).is_none() {
            return Err(DomainError::NotFound(format!("Tenant {}", id)));
        }
        tables.domains.retain(|_, d| d.tenant_id != *id);
        tables.invitations.retain(|_, i| i.tenant_id != *id);
        Ok(())
    }
}

// ============================================================================
// In-Memory Domain Repository
// ============================================================================

#[derive(Default, Clone)]
pub struct InMemoryDomainRepository {
    tables: SharedTables,
}

impl InMemoryDomainRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DomainRepository for InMemoryDomainRepository {
    async fn find_by_id(&self, id: &DomainId) -> Result<Option<TenantDomain>, DomainError> {
        let tables = self.tables.read().unwrap();
        Ok(tables.domains.get(id).cloned())
    }

    async fn find_by_domain(&self, domain: &str) -> Result<Option<TenantDomain>, DomainError> {
        let tables = self.tables.read().unwrap();
        Ok(tables.domains.values().find(|d| d.domain == domain).cloned())
    }

    async fn find_by_tenant(&self, tenant_id: &TenantId) -> Result<Vec<TenantDomain>, DomainError> {
        let tables = self.tables.read().unwrap();
        let mut domains: Vec<TenantDomain> = tables
            .domains
            .values()
            .filter(|d| d.tenant_id == *tenant_id)
            .cloned()
            .collect();
        domains.sort_by(|a, b| b.is_primary.cmp(&a.is_primary).then(a.domain.cmp(&b.domain)));
        Ok(domains)
    }

    async fn find_all(&self, limit: i64, offset: i64) -> Result<Vec<TenantDomain>, DomainError> {
        let tables = self.tables.read().unwrap();
        let mut all: Vec<TenantDomain> = tables.domains.values().cloned().collect();
        all.sort_by(|a, b| a.domain.cmp(&b.domain));
        Ok(page(all, limit, offset))
    }

    async fn create(&self, new_domain: &NewTenantDomain) -> Result<TenantDomain, DomainError> {
        let mut tables = self.tables.write().unwrap();
        if tables.domains.values().any(|d| d.domain == new_domain.domain) {
            return Err(DomainError::AlreadyExists(format!(
                "Domain '{}'",
                new_domain.domain
            )));
        }

        if new_domain.is_primary {
            for d in tables.domains.values_mut() {
                if d.tenant_id == new_domain.tenant_id {
                    d.is_primary = false;
                }
            }
        }

        let domain = TenantDomain {
            id: DomainId::new(),
            domain: new_domain.domain.clone(),
            tenant_id: new_domain.tenant_id,
            is_primary: new_domain.is_primary,
        };
        tables.domains.insert(domain.id, domain.clone());
        Ok(domain)
    }

    async fn set_primary(&self, id: &DomainId) -> Result<TenantDomain, DomainError> {
        let mut tables = self.tables.write().unwrap();
        let tenant_id = tables
            .domains
            .get(id)
            .map(|d| d.tenant_id)
            .ok_or_else(|| DomainError::NotFound(format!("Domain {}", id)))?;

        for d in tables.domains.values_mut() {
            if d.tenant_id == tenant_id {
                d.is_primary = d.id == *id;
            }
        }
        Ok(tables.domains[id].clone())
    }

    async fn delete(&self, id: &DomainId) -> Result<(), DomainError> {
        let mut tables = self.tables.write().unwrap();
        match tables.domains.remove(id) {
            Some(_) => Ok(()),
            None => Err(DomainError::NotFound(format!("Domain {}", id))),
        }
    }
}

// ============================================================================
// In-Memory User Repository
// ============================================================================

#[derive(Default, Clone)]
pub struct InMemoryUserRepository {
    tables: SharedTables,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a user as-is
    pub fn insert(&self, user: User) -> User {
        let mut tables = self.tables.write().unwrap();
        tables.users.insert(user.id, user.clone());
        user
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let tables = self.tables.read().unwrap();
        Ok(tables.users.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let wanted = email.trim().to_lowercase();
        let tables = self.tables.read().unwrap();
        Ok(tables
            .users
            .values()
            .find(|u| u.email.to_lowercase() == wanted)
            .cloned())
    }

    async fn find_by_tenant(
        &self,
        tenant_id: &TenantId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<User>, DomainError> {
        let tables = self.tables.read().unwrap();
        let mut members: Vec<User> = tables
            .users
            .values()
            .filter(|u| u.belongs_to(tenant_id))
            .cloned()
            .collect();
        members.sort_by(|a, b| a.date_joined.cmp(&b.date_joined));
        Ok(page(members, limit, offset))
    }

    async fn count_by_tenant(&self, tenant_id: &TenantId) -> Result<u64, DomainError> {
        let tables = self.tables.read().unwrap();
        Ok(tables
            .users
            .values()
            .filter(|u| u.belongs_to(tenant_id))
            .count() as u64)
    }

    async fn create(&self, new_user: &NewUser) -> Result<User, DomainError> {
        let mut tables = self.tables.write().unwrap();
        let wanted = new_user.email.to_lowercase();
        if tables.users.values().any(|u| u.email.to_lowercase() == wanted) {
            return Err(DomainError::AlreadyExists(format!(
                "User '{}'",
                new_user.email
            )));
        }

        let user = User {
            id: UserId::new(),
            email: new_user.email.clone(),
            password_hash: new_user.password_hash.clone(),
            first_name: new_user.first_name.clone(),
            last_name: new_user.last_name.clone(),
            phone_number: new_user.phone_number.clone(),
            gender: new_user.gender,
            tenant_id: new_user.tenant_id,
            address_id: None,
            is_active: new_user.is_active,
            is_staff: new_user.is_staff,
            is_superuser: new_user.is_superuser,
            date_joined: Utc::now(),
            last_login: None,
            preferred_language: new_user.preferred_language,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let mut tables = self.tables.write().unwrap();
        let stored = tables
            .users
            .get_mut(&user.id)
            .ok_or_else(|| DomainError::NotFound(format!("User {}", user.id)))?;

        stored.first_name = user.first_name.clone();
        stored.last_name = user.last_name.clone();
        stored.phone_number = user.phone_number.clone();
        stored.gender = user.gender;
        stored.address_id = user.address_id;
        stored.is_active = user.is_active;
        stored.is_staff = user.is_staff;
        stored.is_superuser = user.is_superuser;
        stored.preferred_language = user.preferred_language;
        Ok(stored.clone())
    }

    async fn set_tenant(
        &self,
        id: &UserId,
        tenant_id: Option<TenantId>,
    ) -> Result<(), DomainError> {
        let mut tables = self.tables.write().unwrap();
        let stored = tables
            .users
            .get_mut(id)
            .ok_or_else(|| DomainError::NotFound(format!("User {}", id)))?;
        stored.tenant_id = tenant_id;
        Ok(())
    }

    async fn update_last_login(&self, id: &UserId) -> Result<(), DomainError> {
        let mut tables = self.tables.write().unwrap();
        if let Some(stored) = tables.users.get_mut(id) {
            stored.last_login = Some(Utc::now());
        }
        Ok(())
    }

    async fn delete(&self, id: &UserId) -> Result<(), DomainError> {
        let mut tables = self.tables.write().unwrap();
        if tables.users.remove(id).is_none() {
            return Err(DomainError::NotFound(format!("User {}", id)));
        }
        tables.invitations.retain(|_, i| i.invited_by != *id);
        Ok(())
    }
}

// ============================================================================
// In-Memory Address Repository
// ============================================================================

#[derive(Default, Clone)]
pub struct InMemoryAddressRepository {
    tables: SharedTables,
}

impl InMemoryAddressRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn address_from(id: AddressId, address: &NewAddress) -> Address {
    Address {
        id,
        country: address.country.clone(),
        state: address.state.clone(),
        city: address.city.clone(),
        address_line1: address.address_line1.clone(),
        address_line2: address.address_line2.clone(),
        zip_code: address.zip_code.clone(),
    }
}

#[async_trait]
impl AddressRepository for InMemoryAddressRepository {
    async fn find_by_id(&self, id: &AddressId) -> Result<Option<Address>, DomainError> {
        let tables = self.tables.read().unwrap();
        Ok(tables.addresses.get(id).cloned())
    }

    async fn find_by_tenant(&self, tenant_id: &TenantId) -> Result<Vec<Address>, DomainError> {
        let tables = self.tables.read().unwrap();
        let ids: HashSet<AddressId> = tables
            .users
            .values()
            .filter(|u| u.belongs_to(tenant_id))
            .filter_map(|u| u.address_id)
            .collect();
        Ok(ids
            .iter()
            .filter_map(|id| tables.addresses.get(id).cloned())
            .collect())
    }

    async fn create(&self, new_address: &NewAddress) -> Result<Address, DomainError> {
        let mut tables = self.tables.write().unwrap();
        let address = address_from(AddressId::new(), new_address);
        tables.addresses.insert(address.id, address.clone());
        Ok(address)
    }

    async fn update(&self, id: &AddressId, address: &NewAddress) -> Result<Address, DomainError> {
        let mut tables = self.tables.write().unwrap();
        if !tables.addresses.contains_key(id) {
            return Err(DomainError::NotFound(format!("Address {}", id)));
        }
        let updated = address_from(*id, address);
        tables.addresses.insert(*id, updated.clone());
        Ok(updated)
    }

    async fn count_users(&self, id: &AddressId) -> Result<u64, DomainError> {
        let tables = self.tables.read().unwrap();
        Ok(tables
            .users
            .values()
            .filter(|u| u.address_id == Some(*id))
            .count() as u64)
    }

    async fn delete(&self, id: &AddressId) -> Result<(), DomainError> {
        let mut tables = self.tables.write().unwrap();
        if tables.addresses.remove(id).is_none() {
            return Err(DomainError::NotFound(format!("Address {}", id)));
        }
        // ON DELETE SET NULL
        for user in tables.users.values_mut() {
            if user.address_id == Some(*id) {
                user.address_id = None;
            }
        }
        Ok(())
    }
}

// ============================================================================
// In-Memory Invitation Repository
// ============================================================================

#[derive(Default, Clone)]
pub struct InMemoryInvitationRepository {
    tables: SharedTables,
}

impl InMemoryInvitationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an invitation as-is
    pub fn insert(&self, invitation: Invitation) -> Invitation {
        let mut tables = self.tables.write().unwrap();
        tables.invitations.insert(invitation.id, invitation.clone());
        invitation
    }

    /// Current state of an invitation
    pub fn get(&self, id: &InvitationId) -> Option<Invitation> {
        self.tables.read().unwrap().invitations.get(id).cloned()
    }
}

fn newest_first(mut invitations: Vec<Invitation>) -> Vec<Invitation> {
    invitations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    invitations
}

#[async_trait]
impl InvitationRepository for InMemoryInvitationRepository {
    async fn find_by_id(&self, id: &InvitationId) -> Result<Option<Invitation>, DomainError> {
        Ok(self.get(id))
    }

    async fn find_by_tenant_and_email(
        &self,
        tenant_id: &TenantId,
        email: &str,
    ) -> Result<Option<Invitation>, DomainError> {
        let tables = self.tables.read().unwrap();
        Ok(tables
            .invitations
            .values()
            .find(|i| i.tenant_id == *tenant_id && i.is_for_email(email))
            .cloned())
    }

    async fn find_by_tenants(
        &self,
        tenant_ids: &[TenantId],
    ) -> Result<Vec<Invitation>, DomainError> {
        let tables = self.tables.read().unwrap();
        Ok(newest_first(
            tables
                .invitations
                .values()
                .filter(|i| tenant_ids.contains(&i.tenant_id))
                .cloned()
                .collect(),
        ))
    }

    async fn find_by_email(&self, email: &str) -> Result<Vec<Invitation>, DomainError> {
        let tables = self.tables.read().unwrap();
        Ok(newest_first(
            tables
                .invitations
                .values()
                .filter(|i| i.is_for_email(email))
                .cloned()
                .collect(),
        ))
    }

    async fn find_all(&self, limit: i64, offset: i64) -> Result<Vec<Invitation>, DomainError> {
        let tables = self.tables.read().unwrap();
        let all = newest_first(tables.invitations.values().cloned().collect());
        Ok(page(all, limit, offset))
    }

    async fn create(&self, new_invitation: &NewInvitation) -> Result<Invitation, DomainError> {
        let mut tables = self.tables.write().unwrap();
        if tables.invitations.values().any(|i| {
            i.tenant_id == new_invitation.tenant_id && i.is_for_email(&new_invitation.email)
        }) {
            return Err(DomainError::AlreadyExists(format!(
                "Invitation for '{}'",
                new_invitation.email
            )));
        }

        let invitation = Invitation {
            id: InvitationId::new(),
            tenant_id: new_invitation.tenant_id,
            email: new_invitation.email.clone(),
            invited_by: new_invitation.invited_by,
            status: InvitationStatus::Pending,
            created_at: Utc::now(),
            expires_at: new_invitation.expires_at,
            accepted_at: None,
        };
        tables.invitations.insert(invitation.id, invitation.clone());
        Ok(invitation)
    }

    async fn update(&self, invitation: &Invitation) -> Result<Invitation, DomainError> {
        let mut tables = self.tables.write().unwrap();
        match tables.invitations.get_mut(&invitation.id) {
            Some(stored) => {
                stored.invited_by = invitation.invited_by;
                stored.status = invitation.status;
                stored.expires_at = invitation.expires_at;
                stored.accepted_at = invitation.accepted_at;
                Ok(stored.clone())
            }
            None => Err(DomainError::NotFound(format!(
                "Invitation {}",
                invitation.id
            ))),
        }
    }

    async fn delete(&self, id: &InvitationId) -> Result<(), DomainError> {
        let mut tables = self.tables.write().unwrap();
        match tables.invitations.remove(id) {
            Some(_) => Ok(()),
            None => Err(DomainError::NotFound(format!("Invitation {}", id))),
        }
    }

    async fn expire_pending(&self, now: DateTime<Utc>) -> Result<u64, DomainError> {
        let mut tables = self.tables.write().unwrap();
        let mut expired = 0;
        for invitation in tables.invitations.values_mut() {
            if invitation.expire_if_due(now) {
                expired += 1;
            }
        }
        Ok(expired)
    }
}

// ============================================================================
// In-Memory Revoked Token Repository
// ============================================================================

#[derive(Default, Clone)]
pub struct InMemoryRevokedTokenRepository {
    revoked: Arc<RwLock<HashMap<String, DateTime<Utc>>>>,
}

impl InMemoryRevokedTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.revoked.read().unwrap().len()
    }
}

#[async_trait]
impl RevokedTokenRepository for InMemoryRevokedTokenRepository {
    async fn revoke(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<bool, DomainError> {
        let mut revoked = self.revoked.write().unwrap();
        if revoked.contains_key(jti) {
            return Ok(false);
        }
        revoked.insert(jti.to_string(), expires_at);
        Ok(true)
    }

    async fn is_revoked(&self, jti: &str) -> Result<bool, DomainError> {
        Ok(self.revoked.read().unwrap().contains_key(jti))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, DomainError> {
        let mut revoked = self.revoked.write().unwrap();
        let before = revoked.len();
        revoked.retain(|_, expires_at| *expires_at >= now);
        Ok((before - revoked.len()) as u64)
    }
}

// ============================================================================
// Mock Schema Manager
// ============================================================================

#[derive(Default, Clone)]
pub struct MockSchemaManager {
    schemas: Arc<RwLock<HashSet<String>>>,
    pub should_fail: Arc<RwLock<bool>>,
}

impl MockSchemaManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every DDL call fails
    pub fn failing() -> Self {
        Self {
            should_fail: Arc::new(RwLock::new(true)),
            ..Default::default()
        }
    }

    /// Leave a schema behind, as a deleted tenant without auto-drop does
    pub fn insert(&self, schema_name: &str) {
        self.schemas.write().unwrap().insert(schema_name.to_string());
    }

    pub fn has_schema(&self, schema_name: &str) -> bool {
        self.schemas.read().unwrap().contains(schema_name)
    }

    fn check(&self) -> Result<(), DomainError> {
        if *self.should_fail.read().unwrap() {
            return Err(DomainError::Schema("Mock schema failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl SchemaManager for MockSchemaManager {
    async fn create_schema(&self, schema_name: &str) -> Result<(), DomainError> {
        self.check()?;
        if !self.schemas.write().unwrap().insert(schema_name.to_string()) {
            return Err(DomainError::AlreadyExists(format!("Schema '{}'", schema_name)));
        }
        Ok(())
    }

    async fn drop_schema(&self, schema_name: &str) -> Result<(), DomainError> {
        self.check()?;
        self.schemas.write().unwrap().remove(schema_name);
        Ok(())
    }

    async fn schema_exists(&self, schema_name: &str) -> Result<bool, DomainError> {
        Ok(self.has_schema(schema_name))
    }
}

// ============================================================================
// Mock Mailer
// ============================================================================

#[derive(Default, Clone)]
pub struct MockMailer {
    sent: Arc<RwLock<Vec<OutgoingMail>>>,
    pub should_fail: Arc<RwLock<bool>>,
}

impl MockMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailer whose relay rejects everything
    pub fn failing() -> Self {
        Self {
            should_fail: Arc::new(RwLock::new(true)),
            ..Default::default()
        }
    }

    /// Messages handed to the mailer so far
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.read().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        if *self.should_fail.read().unwrap() {
            return Err(MailError::Rejected {
                status: 503,
                message: "Mock mail failure".to_string(),
            });
        }
        self.sent.write().unwrap().push(mail.clone());
        Ok(())
    }
}

// ============================================================================
// Test Store
// ============================================================================

/// One set of repositories over shared in-memory tables
#[derive(Clone)]
pub struct TestStore {
    pub tenants: InMemoryTenantRepository,
    pub domains: InMemoryDomainRepository,
    pub users: InMemoryUserRepository,
    pub addresses: InMemoryAddressRepository,
    pub invitations: InMemoryInvitationRepository,
    pub revoked: InMemoryRevokedTokenRepository,
    pub schemas: MockSchemaManager,
    pub mailer: MockMailer,
}

impl TestStore {
    pub fn new() -> Self {
        let tables = SharedTables::default();
        Self {
            tenants: InMemoryTenantRepository {
                tables: tables.clone(),
            },
            domains: InMemoryDomainRepository {
                tables: tables.clone(),
            },
            users: InMemoryUserRepository {
                tables: tables.clone(),
            },
            addresses: InMemoryAddressRepository {
                tables: tables.clone(),
            },
            invitations: InMemoryInvitationRepository { tables },
            revoked: InMemoryRevokedTokenRepository::new(),
            schemas: MockSchemaManager::new(),
            mailer: MockMailer::new(),
        }
    }

    pub fn with_failing_schemas(mut self) -> Self {
        self.schemas = MockSchemaManager::failing();
        self
    }

    pub fn with_failing_mailer(mut self) -> Self {
        self.mailer = MockMailer::failing();
        self
    }

    /// Pre-populate with a tenant
    pub fn with_tenant(self, tenant: Tenant) -> Self {
        self.tenants.insert(tenant);
        self
    }

    /// Pre-populate with an invitation
    pub fn with_invitation(self, invitation: Invitation) -> Self {
        self.invitations.insert(invitation);
        self
    }
}

impl Default for TestStore {
    fn default() -> Self {
        Self::new()
    }
}
