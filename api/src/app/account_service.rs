//! Account service
//!
//! Registration (new tenant or invitation), user creation rules, profiles,
//! addresses, tenant membership and cascading user deletion.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use super::tenant_service::{ProvisionedTenant, TenantLifecycle};
use crate::auth::hash_password;
use crate::domain::entities::user::normalize_email;
use crate::domain::entities::{
    Address, AddressId, Gender, InvitationId, Language, NewAddress, NewUser, ProfileUpdate,
    Tenant, TenantDomain, TenantId, User, UserId,
};
use crate::domain::ports::{AddressRepository, InvitationRepository, UserRepository};
use crate::domain::validation::{
    validate_address, validate_email, validate_name, validate_password, validate_phone,
};
use crate::error::{AppError, DomainError};

/// Self-service sign-up
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub password2: String,
    pub first_name: String,
    pub last_name: String,
    /// Organization to create. Defaults to "{first name}'s Tenant".
    pub tenant_name: Option<String>,
    /// Join an existing tenant instead of creating one
    pub invitation_id: Option<InvitationId>,
    pub preferred_language: Option<Language>,
}

/// Result of a successful registration
#[derive(Debug, Clone, Serialize)]
pub struct RegisteredAccount {
    pub user: User,
    pub tenant: Tenant,
    /// Set when a new tenant was provisioned
    pub primary_domain: Option<TenantDomain>,
}

/// Account created by an administrator or tenant owner
#[derive(Debug, Clone, Default)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub gender: Option<Gender>,
    pub tenant_id: Option<TenantId>,
    pub preferred_language: Language,
}

/// Service for accounts and profiles
pub struct AccountService<UR, AR, IR, TL>
where
    UR: UserRepository,
    AR: AddressRepository,
    IR: InvitationRepository,
    TL: TenantLifecycle,
{
    users: Arc<UR>,
    addresses: Arc<AR>,
    invitations: Arc<IR>,
    tenants: Arc<TL>,
}

impl<UR, AR, IR, TL> AccountService<UR, AR, IR, TL>
where
    UR: UserRepository,
    AR: AddressRepository,
    IR: InvitationRepository,
    TL: TenantLifecycle,
{
    pub fn new(users: Arc<UR>, addresses: Arc<AR>, invitations: Arc<IR>, tenants: Arc<TL>) -> Self {
        Self {
            users,
            addresses,
            invitations,
            tenants,
        }
    }

    /// Register a new account.
    ///
    /// Without an invitation the user becomes the owner of a freshly
    /// provisioned tenant. If provisioning fails the user is removed again.
    pub async fn register(&self, registration: Registration) -> Result<RegisteredAccount, AppError> {
        let email = normalize_email(&registration.email);
        validate_email(&email)?;
        validate_name("First name", registration.first_name.trim())?;
        validate_name("Last name", registration.last_name.trim())?;

        if registration.password != registration.password2 {
            return Err(AppError::validation("Password fields didn't match."));
        }
        validate_password(
            &registration.password,
            &[
                &email,
                registration.first_name.trim(),
                registration.last_name.trim(),
            ],
        )?;

        self.ensure_email_free(&email).await?;

        let new_user = NewUser {
            email,
            password_hash: hash_password(&registration.password)?,
            first_name: registration.first_name.trim().to_string(),
            last_name: registration.last_name.trim().to_string(),
            phone_number: None,
            gender: None,
            tenant_id: None,
            is_active: true,
            is_staff: false,
            is_superuser: false,
            preferred_language: registration.preferred_language.unwrap_or_default(),
        };

        match registration.invitation_id {
            Some(invitation_id) => self.register_invited(new_user, &invitation_id).await,
            // The tenant does not exist yet; the user is bound after provisioning
            None => {
                self.register_owner(new_user, registration.tenant_name.as_deref())
                    .await
            }
        }
    }

    async fn register_owner(
        &self,
        new_user: NewUser,
        tenant_name: Option<&str>,
    ) -> Result<RegisteredAccount, AppError> {
        let mut user = self.users.create(&new_user).await?;

        let provisioned: ProvisionedTenant =
            match self.tenants.provision_for_owner(&user, tenant_name).await {
                Ok(p) => p,
                Err(e) => {
                    self.discard_user(&user.id).await;
                    return Err(registration_failed(e));
                }
            };

        if let Err(e) = self
            .users
            .set_tenant(&user.id, Some(provisioned.tenant.id))
            .await
        {
            if let Err(cleanup) = self.tenants.retire_owned_tenants(&user).await {
                tracing::error!(error = %cleanup, user_id = %user.id, "Tenant cleanup failed");
            }
            self.discard_user(&user.id).await;
            return Err(registration_failed(e.into()));
        }
        user.tenant_id = Some(provisioned.tenant.id);

        tracing::info!(
            user_id = %user.id,
            tenant_id = %provisioned.tenant.id,
            "User registered with new tenant"
        );

        Ok(RegisteredAccount {
            user,
            tenant: provisioned.tenant,
            primary_domain: Some(provisioned.primary_domain),
        })
    }

    async fn register_invited(
        &self,
        mut new_user: NewUser,
        invitation_id: &InvitationId,
    ) -> Result<RegisteredAccount, AppError> {
        let mut invitation = self
            .invitations
            .find_by_id(invitation_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Invitation not found".to_string()))?;

        let now = Utc::now();
        if invitation.expire_if_due(now) {
            self.invitations.update(&invitation).await?;
        }
        if !invitation.is_for_email(&new_user.email) {
            return Err(AppError::validation(
                "This invitation was sent to a different email address.",
            ));
        }
        invitation.accept(now)?;

        let tenant = self.tenants.get_tenant(&invitation.tenant_id).await?;
        new_user.tenant_id = Some(tenant.id);

        let user = self.users.create(&new_user).await?;

        if let Err(e) = self.invitations.update(&invitation).await {
            self.discard_user(&user.id).await;
            return Err(e.into());
        }

        tracing::info!(
            user_id = %user.id,
            tenant_id = %tenant.id,
            invitation_id = %invitation.id,
            "User registered through invitation"
        );

        Ok(RegisteredAccount {
            user,
            tenant,
            primary_domain: None,
        })
    }

    async fn discard_user(&self, id: &UserId) {
        if let Err(e) = self.users.delete(id).await {
            tracing::error!(error = %e, user_id = %id, "Failed to remove half-registered user");
        }
    }

    async fn ensure_email_free(&self, email: &str) -> Result<(), AppError> {
        if self.users.find_by_email(email).await?.is_some() {
            return Err(AppError::validation("A user with this email already exists."));
        }
        Ok(())
    }

    /// Create a regular account. A tenant is mandatory.
    pub async fn create_user(&self, account: NewAccount) -> Result<User, AppError> {
        if account.tenant_id.is_none() {
            return Err(AppError::validation(
                "A tenant is required for non-superuser accounts",
            ));
        }
        self.create_account(account, false).await
    }

    /// Create a superuser. Staff, superuser and active flags are forced on.
    pub async fn create_superuser(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<User, AppError> {
        self.create_account(
            NewAccount {
                email: email.to_string(),
                password: password.to_string(),
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                ..Default::default()
            },
            true,
        )
        .await
    }

    async fn create_account(&self, account: NewAccount, superuser: bool) -> Result<User, AppError> {
        let email = normalize_email(&account.email);
        validate_email(&email)?;
        if let Some(phone) = &account.phone_number {
            validate_phone(phone)?;
        }
        if let Some(tenant_id) = &account.tenant_id {
            self.tenants.get_tenant(tenant_id).await?;
        }
        self.ensure_email_free(&email).await?;

        let user = self
            .users
            .create(&NewUser {
                email,
                password_hash: hash_password(&account.password)?,
                first_name: account.first_name.trim().to_string(),
                last_name: account.last_name.trim().to_string(),
                phone_number: account.phone_number,
                gender: account.gender,
                tenant_id: account.tenant_id,
                is_active: true,
                is_staff: superuser,
                is_superuser: superuser,
                preferred_language: account.preferred_language,
            })
            .await?;

        tracing::info!(user_id = %user.id, superuser, "Account created");
        Ok(user)
    }

    /// Create the configured superuser unless the email is already taken
    pub async fn bootstrap_superuser(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, AppError> {
        if self.users.find_by_email(email).await?.is_some() {
            return Ok(None);
        }
        let user = self.create_superuser(email, password, "Admin", "User").await?;
        Ok(Some(user))
    }

    /// Tenant owner (or superuser) adds an account to the tenant
    pub async fn create_member(
        &self,
        actor: &User,
        tenant_id: &TenantId,
        mut account: NewAccount,
    ) -> Result<User, AppError> {
        let tenant = self.tenants.get_tenant(tenant_id).await?;
        if !actor.is_superuser && !tenant.is_owned_by(&actor.id) {
            return Err(AppError::forbidden(
                "Only the tenant owner can add users",
            ));
        }

        validate_name("First name", account.first_name.trim())?;
        validate_name("Last name", account.last_name.trim())?;
        validate_password(
            &account.password,
            &[&account.email, &account.first_name, &account.last_name],
        )?;

        account.tenant_id = Some(tenant.id);
        self.create_user(account).await
    }

    pub async fn get_user(&self, id: &UserId) -> Result<User, AppError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    pub async fn update_profile(
        &self,
        id: &UserId,
        update: ProfileUpdate,
    ) -> Result<User, AppError> {
        validate_profile_update(&update)?;

        let mut user = self.get_user(id).await?;
        update.apply_to(&mut user);

        Ok(self.users.update(&user).await?)
    }

    pub async fn change_language(&self, id: &UserId, language: Language) -> Result<User, AppError> {
        self.update_profile(
            id,
            ProfileUpdate {
                preferred_language: Some(language),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn get_address(&self, user: &User) -> Result<Option<Address>, AppError> {
        match user.address_id {
            Some(id) => Ok(self.addresses.find_by_id(&id).await?),
            None => Ok(None),
        }
    }

    /// Set the user's address.
    ///
    /// An address only this user points at is edited in place; a shared one
    /// is left alone and a new address is created.
    pub async fn set_address(&self, id: &UserId, address: NewAddress) -> Result<Address, AppError> {
        validate_address(&address)?;
        let mut user = self.get_user(id).await?;

        if let Some(existing) = user.address_id {
            if self.addresses.count_users(&existing).await? <= 1 {
                return Ok(self.addresses.update(&existing, &address).await?);
            }
        }

        let created = self.addresses.create(&address).await?;
        user.address_id = Some(created.id);
        self.users.update(&user).await?;

        Ok(created)
    }

    pub async fn clear_address(&self, id: &UserId) -> Result<(), AppError> {
        let mut user = self.get_user(id).await?;
        let Some(previous) = user.address_id.take() else {
            return Ok(());
        };

        self.users.update(&user).await?;
        self.remove_orphan_address(&previous).await
    }

    async fn remove_orphan_address(&self, id: &AddressId) -> Result<(), AppError> {
        if self.addresses.count_users(id).await? == 0 {
            self.addresses.delete(id).await?;
            tracing::debug!(address_id = %id.0, "Orphaned address removed");
        }
        Ok(())
    }

    /// Members of a tenant with the total count
    pub async fn tenant_members(
        &self,
        actor: &User,
        tenant_id: &TenantId,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<User>, u64), AppError> {
        ensure_member(actor, tenant_id)?;

        let users = self.users.find_by_tenant(tenant_id, limit, offset).await?;
        let total = self.users.count_by_tenant(tenant_id).await?;
        Ok((users, total))
    }

    pub async fn tenant_member(
        &self,
        actor: &User,
        tenant_id: &TenantId,
        id: &UserId,
    ) -> Result<User, AppError> {
        ensure_member(actor, tenant_id)?;

        let user = self.get_user(id).await?;
        if !user.belongs_to(tenant_id) {
            return Err(AppError::NotFound(format!("User {} not found", id)));
        }
        Ok(user)
    }

    /// Users edit themselves; the owner and superusers edit anyone in the tenant
    pub async fn update_member(
        &self,
        actor: &User,
        tenant_id: &TenantId,
        id: &UserId,
        update: ProfileUpdate,
    ) -> Result<User, AppError> {
        let target = self.tenant_member(actor, tenant_id, id).await?;

        if actor.id != target.id && !actor.is_superuser {
            let tenant = self.tenants.get_tenant(tenant_id).await?;
            if !tenant.is_owned_by(&actor.id) {
                return Err(AppError::forbidden(
                    "You can only edit your own profile",
                ));
            }
        }

        self.update_profile(&target.id, update).await
    }

    pub async fn tenant_addresses(
        &self,
        actor: &User,
        tenant_id: &TenantId,
    ) -> Result<Vec<Address>, AppError> {
        ensure_member(actor, tenant_id)?;
        Ok(self.addresses.find_by_tenant(tenant_id).await?)
    }

    /// Delete a user with everything hanging off the account.
    ///
    /// Allowed for the user themselves, the owner of their tenant and
    /// superusers. Tenants the user owns are deleted first; this fails while
    /// other members remain in them.
    pub async fn delete_user(&self, actor: &User, id: &UserId) -> Result<(), AppError> {
        let target = self.get_user(id).await?;
        self.authorize_delete(actor, &target).await?;

        self.tenants.retire_owned_tenants(&target).await?;
        self.users.delete(&target.id).await?;

        if let Some(address_id) = target.address_id {
            self.remove_orphan_address(&address_id).await?;
        }

        tracing::info!(user_id = %target.id, deleted_by = %actor.id, "User deleted");
        Ok(())
    }

    async fn authorize_delete(&self, actor: &User, target: &User) -> Result<(), AppError> {
        if actor.id == target.id || actor.is_superuser {
            return Ok(());
        }
        if target.is_superuser {
            return Err(AppError::Forbidden);
        }

        if let Some(tenant_id) = target.tenant_id {
            let tenant = self.tenants.get_tenant(&tenant_id).await?;
            if tenant.is_owned_by(&actor.id) && actor.belongs_to(&tenant_id) {
                return Ok(());
            }
        }

        Err(AppError::forbidden(
            "You do not have permission to delete this user",
        ))
    }
}

fn ensure_member(actor: &User, tenant_id: &TenantId) -> Result<(), AppError> {
    if actor.can_access_tenant(tenant_id) {
        Ok(())
    } else {
        Err(AppError::forbidden("You are not a member of this tenant"))
    }
}

fn validate_profile_update(update: &ProfileUpdate) -> Result<(), DomainError> {
    if let Some(first) = &update.first_name {
        validate_name("First name", first.trim())?;
    }
    if let Some(last) = &update.last_name {
        validate_name("Last name", last.trim())?;
    }
    if let Some(Some(phone)) = &update.phone_number {
        validate_phone(phone)?;
    }
    Ok(())
}

/// Registration failures are reported as one validation error
fn registration_failed(e: AppError) -> AppError {
    let detail = match e {
        AppError::Domain(DomainError::Validation(msg)) => msg,
        other => {
            tracing::error!(error = %other, "Registration failed");
            "tenant provisioning failed".to_string()
        }
    };
    AppError::validation(format!("Failed to create user and tenant: {}", detail))
}
