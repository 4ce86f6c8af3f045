//! Tenant service
//!
//! Tenant provisioning (schema + primary domain + trial), subscription
//! management, domain bindings and host resolution.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::domain::entities::tenant::{
    is_reserved_schema, schema_candidate, schema_name_from, subdomain_label,
};
use crate::domain::entities::tenant_domain::{is_valid_host, normalize_host};
use crate::domain::entities::{
    DomainId, NewTenant, NewTenantDomain, Tenant, TenantDomain, TenantId, User,
    DEFAULT_TRIAL_DAYS,
};
use crate::domain::ports::{DomainRepository, SchemaManager, TenantRepository, UserRepository};
use crate::error::{AppError, DomainError};

const TENANT_NAME_MAX_LEN: usize = 100;
const MAX_SCHEMA_ATTEMPTS: u32 = 100;

const NAME_TAKEN: &str =
    "A tenant with this name already exists. Please choose a different organization name.";

/// Deployment settings for provisioning
#[derive(Debug, Clone)]
pub struct TenantSettings {
    /// Parent domain of every tenant subdomain
    pub base_domain: String,
    pub trial_days: i64,
    /// Drop the Postgres schema when a tenant is deleted
    pub auto_drop_schema: bool,
}

impl Default for TenantSettings {
    fn default() -> Self {
        Self {
            base_domain: "localhost".to_string(),
            trial_days: DEFAULT_TRIAL_DAYS,
            auto_drop_schema: false,
        }
    }
}

/// A tenant together with the primary domain created for it
#[derive(Debug, Clone, Serialize)]
pub struct ProvisionedTenant {
    pub tenant: Tenant,
    pub primary_domain: TenantDomain,
}

/// Changes an administrator may make to a tenant
#[derive(Debug, Clone, Default)]
pub struct TenantUpdate {
    pub name: Option<String>,
    /// `Some(None)` ends the paid subscription
    pub paid_until: Option<Option<NaiveDate>>,
}

/// Tenant operations other services depend on
#[async_trait]
pub trait TenantLifecycle: Send + Sync {
    async fn get_tenant(&self, id: &TenantId) -> Result<Tenant, AppError>;

    /// Create a tenant owned by `owner`. Binding the owner is up to the caller.
    async fn provision_for_owner(
        &self,
        owner: &User,
        name: Option<&str>,
    ) -> Result<ProvisionedTenant, AppError>;

    /// Delete every tenant the user owns
    async fn retire_owned_tenants(&self, owner: &User) -> Result<(), AppError>;
}

/// Service for tenant provisioning and domains
pub struct TenantService<TR, DR, UR, SM>
where
    TR: TenantRepository,
    DR: DomainRepository,
    UR: UserRepository,
    SM: SchemaManager,
{
    tenants: Arc<TR>,
    domains: Arc<DR>,
    users: Arc<UR>,
    schemas: Arc<SM>,
    settings: TenantSettings,
}

impl<TR, DR, UR, SM> TenantService<TR, DR, UR, SM>
where
    TR: TenantRepository,
    DR: DomainRepository,
    UR: UserRepository,
    SM: SchemaManager,
{
    pub fn new(
        tenants: Arc<TR>,
        domains: Arc<DR>,
        users: Arc<UR>,
        schemas: Arc<SM>,
        settings: TenantSettings,
    ) -> Self {
        Self {
            tenants,
            domains,
            users,
            schemas,
            settings,
        }
    }

    /// Host name of a schema's primary domain
    fn primary_host(&self, schema_name: &str) -> String {
        format!("{}.{}", subdomain_label(schema_name), self.settings.base_domain)
    }

    /// A schema name is free when no tenant, leftover schema or domain
    /// binding claims it or its primary host
    async fn schema_name_available(&self, schema_name: &str) -> Result<bool, AppError> {
        if is_reserved_schema(schema_name)
            || self.tenants.find_by_schema_name(schema_name).await?.is_some()
        {
            return Ok(false);
        }
        // Schemas of deleted tenants are kept unless auto-drop is on
        if self.schemas.schema_exists(schema_name).await? {
            return Ok(false);
        }

        let host = self.primary_host(schema_name);
        Ok(self.domains.find_by_domain(&host).await?.is_none())
    }

    /// Insert tenant + primary domain, then create the schema.
    ///
    /// The rows are removed again when the schema cannot be created.
    async fn provision(&self, new_tenant: NewTenant) -> Result<ProvisionedTenant, AppError> {
        let host = self.primary_host(&new_tenant.schema_name);

        let (tenant, primary_domain) = self.tenants.create(&new_tenant, &host).await?;

        if let Err(e) = self.schemas.create_schema(&tenant.schema_name).await {
            tracing::error!(
                error = %e,
                schema = %tenant.schema_name,
                "Schema creation failed, removing tenant"
            );
            if let Err(cleanup) = self.tenants.delete(&tenant.id).await {
                tracing::error!(error = %cleanup, tenant_id = %tenant.id, "Tenant cleanup failed");
            }
            return Err(e.into());
        }

        tracing::info!(
            tenant_id = %tenant.id,
            schema = %tenant.schema_name,
            domain = %primary_domain.domain,
            "Tenant provisioned"
        );

        Ok(ProvisionedTenant {
            tenant,
            primary_domain,
        })
    }

    /// Create a tenant as an administrator.
    ///
    /// The schema name is deduplicated with `_1`, `_2`, ... suffixes.
    pub async fn create_tenant(
        &self,
        name: &str,
        paid_until: Option<NaiveDate>,
    ) -> Result<ProvisionedTenant, AppError> {
        let name = validate_tenant_name(name)?;
        let base = schema_name_from(name).ok_or_else(|| {
            AppError::validation("Tenant name must contain at least one letter or digit")
        })?;

        let mut schema_name = None;
        for attempt in 0..MAX_SCHEMA_ATTEMPTS {
            let candidate = schema_candidate(&base, attempt);
            if self.schema_name_available(&candidate).await? {
                schema_name = Some(candidate);
                break;
            }
        }
        let schema_name = schema_name
            .ok_or_else(|| AppError::conflict("Could not find a free schema name"))?;

        let today = Utc::now().date_naive();
        let mut draft = NewTenant {
            schema_name,
            name: name.to_string(),
            paid_until,
            trial_end_date: None,
            owner_id: None,
        };
        start_trial_on(&mut draft, today, self.settings.trial_days);

        self.provision(draft).await
    }

    pub async fn get(&self, id: &TenantId) -> Result<Tenant, AppError> {
        self.tenants
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tenant {} not found", id)))
    }

    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Tenant>, AppError> {
        Ok(self.tenants.find_all(limit, offset).await?)
    }

    pub async fn update(&self, id: &TenantId, update: TenantUpdate) -> Result<Tenant, AppError> {
        let mut tenant = self.get(id).await?;

        if let Some(name) = update.name {
            tenant.name = validate_tenant_name(&name)?.to_string();
        }
        if let Some(paid_until) = update.paid_until {
            tenant.paid_until = paid_until;
        }

        Ok(self.tenants.update(&tenant).await?)
    }

    /// Restart the trial from today
    pub async fn start_trial(&self, id: &TenantId, days: Option<i64>) -> Result<Tenant, AppError> {
        let days = days.unwrap_or(self.settings.trial_days);
        if days <= 0 {
            return Err(AppError::validation("Trial length must be positive"));
        }

        let mut tenant = self.get(id).await?;
        tenant.start_trial(Utc::now().date_naive(), days);

        tracing::info!(tenant_id = %tenant.id, days, "Trial started");
        Ok(self.tenants.update(&tenant).await?)
    }

    /// Delete a tenant.
    ///
    /// Refused while any user, the owner included, is bound to it. Domains
    /// and invitations go with the tenant.
    pub async fn delete(&self, id: &TenantId) -> Result<(), AppError> {
        let tenant = self.get(id).await?;

        let members = self.users.count_by_tenant(id).await?;
        if members > 0 {
            return Err(AppError::conflict(format!(
                "Tenant still has {} member(s); remove them first",
                members
            )));
        }

        self.remove(&tenant).await
    }

    async fn remove(&self, tenant: &Tenant) -> Result<(), AppError> {
        self.tenants.delete(&tenant.id).await?;

        if self.settings.auto_drop_schema {
            self.schemas.drop_schema(&tenant.schema_name).await?;
        }

        tracing::info!(
            tenant_id = %tenant.id,
            schema = %tenant.schema_name,
            schema_dropped = self.settings.auto_drop_schema,
            "Tenant deleted"
        );
        Ok(())
    }

    // ------------------------------------------------------------------
    // Domains
    // ------------------------------------------------------------------

    pub async fn list_domains(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TenantDomain>, AppError> {
        Ok(self.domains.find_all(limit, offset).await?)
    }

    pub async fn domains_of(&self, tenant_id: &TenantId) -> Result<Vec<TenantDomain>, AppError> {
        Ok(self.domains.find_by_tenant(tenant_id).await?)
    }

    pub async fn get_domain(&self, id: &DomainId) -> Result<TenantDomain, AppError> {
        self.domains
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Domain {} not found", id)))
    }

    /// Bind another host to a tenant
    pub async fn add_domain(
        &self,
        tenant_id: &TenantId,
        host: &str,
        is_primary: bool,
    ) -> Result<TenantDomain, AppError> {
        let host = normalize_host(host);
        if !is_valid_host(&host) {
            return Err(AppError::validation("Enter a valid domain name"));
        }

        self.get(tenant_id).await?;

        if self.domains.find_by_domain(&host).await?.is_some() {
            return Err(AppError::Domain(DomainError::AlreadyExists(format!(
                "Domain '{}' is already in use",
                host
            ))));
        }

        // The first domain of a tenant is always primary
        let has_primary = self
            .domains
            .find_by_tenant(tenant_id)
            .await?
            .iter()
            .any(|d| d.is_primary);

        let domain = self
            .domains
            .create(&NewTenantDomain {
                domain: host,
                tenant_id: *tenant_id,
                is_primary: is_primary || !has_primary,
            })
            .await?;

        tracing::info!(tenant_id = %tenant_id, domain = %domain.domain, "Domain added");
        Ok(domain)
    }

    pub async fn make_primary(&self, id: &DomainId) -> Result<TenantDomain, AppError> {
        let domain = self.get_domain(id).await?;
        if domain.is_primary {
            return Ok(domain);
        }
        Ok(self.domains.set_primary(id).await?)
    }

    /// Remove a domain binding. The primary domain stays.
    pub async fn delete_domain(&self, id: &DomainId) -> Result<(), AppError> {
        let domain = self.get_domain(id).await?;
        if domain.is_primary {
            return Err(AppError::conflict(
                "The primary domain cannot be deleted; make another domain primary first",
            ));
        }

        self.domains.delete(id).await?;
        Ok(())
    }

    /// Tenant served on a host. Unknown hosts belong to the public schema.
    pub async fn resolve_host(&self, host: &str) -> Result<Option<Tenant>, AppError> {
        let host = normalize_host(host);
        if host.is_empty() {
            return Ok(None);
        }

        let Some(domain) = self.domains.find_by_domain(&host).await? else {
            return Ok(None);
        };

        Ok(self.tenants.find_by_id(&domain.tenant_id).await?)
    }
}

#[async_trait]
impl<TR, DR, UR, SM> TenantLifecycle for TenantService<TR, DR, UR, SM>
where
    TR: TenantRepository,
    DR: DomainRepository,
    UR: UserRepository,
    SM: SchemaManager,
{
    async fn get_tenant(&self, id: &TenantId) -> Result<Tenant, AppError> {
        self.get(id).await
    }

    async fn provision_for_owner(
        &self,
        owner: &User,
        name: Option<&str>,
    ) -> Result<ProvisionedTenant, AppError> {
        let name = match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => name.to_string(),
            None => default_tenant_name(owner),
        };
        let name = validate_tenant_name(&name)?;

        let schema_name = schema_name_from(name)
            .ok_or_else(|| AppError::validation("Organization name must contain letters or digits"))?;

        if !self.schema_name_available(&schema_name).await? {
            return Err(AppError::validation(NAME_TAKEN));
        }

        let mut draft = NewTenant {
            schema_name,
            name: name.to_string(),
            paid_until: None,
            trial_end_date: None,
            owner_id: Some(owner.id),
        };
        start_trial_on(&mut draft, Utc::now().date_naive(), self.settings.trial_days);

        self.provision(draft).await.map_err(|e| match e {
            // Lost a race for the schema name or host
            AppError::Domain(DomainError::AlreadyExists(_)) => AppError::validation(NAME_TAKEN),
            e => e,
        })
    }

    async fn retire_owned_tenants(&self, owner: &User) -> Result<(), AppError> {
        let owned = self.tenants.find_by_owner(&owner.id).await?;

        // Check every tenant before touching any of them
        for tenant in &owned {
            let members = self.users.count_by_tenant(&tenant.id).await?;
            let others = members.saturating_sub(u64::from(owner.belongs_to(&tenant.id)));
            if others > 0 {
                return Err(AppError::conflict(format!(
                    "Tenant {} still has {} other member(s); remove them first",
                    tenant.name, others
                )));
            }
        }

        for tenant in &owned {
            if owner.belongs_to(&tenant.id) {
                self.users.set_tenant(&owner.id, None).await?;
            }
            self.remove(tenant).await?;
        }
        Ok(())
    }
}

fn start_trial_on(draft: &mut NewTenant, today: NaiveDate, days: i64) {
    draft.trial_end_date = Some(today + chrono::Duration::days(days));
}

/// "Alice's Tenant", or the email local part without a first name
fn default_tenant_name(owner: &User) -> String {
    let first = owner.first_name.trim();
    let base = if first.is_empty() {
        owner.email_local_part()
    } else {
        first
    };
    format!("{}'s Tenant", base)
}

fn validate_tenant_name(name: &str) -> Result<&str, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::validation("Tenant name is required"));
    }
    if name.chars().count() > TENANT_NAME_MAX_LEN {
        return Err(AppError::validation(format!(
            "Tenant name must be at most {} characters",
            TENANT_NAME_MAX_LEN
        )));
    }
    Ok(name)
}
