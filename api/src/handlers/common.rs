//! Response bodies and helpers shared by the handlers

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::entities::{
    Address, Gender, Invitation, InvitationStatus, Language, Tenant, TenantDomain, User,
};
use crate::error::AppError;

const MAX_PAGE_SIZE: i64 = 100;

/// Query parameters for paginated lists
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

impl PageQuery {
    /// Limit clamped to 1..=100 and a non-negative offset
    pub fn bounds(&self) -> (i64, i64) {
        (self.limit.clamp(1, MAX_PAGE_SIZE), self.offset.max(0))
    }
}

/// A page of results with the total count
#[derive(Debug, Serialize)]
pub struct PageResponse<T> {
    pub count: u64,
    pub results: Vec<T>,
}

/// Distinguishes an absent field (`None`) from an explicit null (`Some(None)`)
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

pub fn require_superuser(user: &User) -> Result<(), AppError> {
    if user.is_superuser {
        Ok(())
    } else {
        Err(AppError::forbidden(
            "Only superusers can perform this action",
        ))
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub phone_number: Option<String>,
    pub gender: Option<Gender>,
    pub tenant_id: Option<String>,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub preferred_language: Language,
    pub date_joined: String,
    pub last_login: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            full_name: user.full_name(),
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            phone_number: user.phone_number,
            gender: user.gender,
            tenant_id: user.tenant_id.map(|t| t.to_string()),
            is_active: user.is_active,
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
            preferred_language: user.preferred_language,
            date_joined: user.date_joined.to_rfc3339(),
            last_login: user.last_login.map(|t| t.to_rfc3339()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TenantResponse {
    pub id: String,
    pub name: String,
    pub schema_name: String,
    pub paid_until: Option<NaiveDate>,
    pub trial_end_date: Option<NaiveDate>,
    pub on_trial: bool,
    pub is_active: bool,
    pub trial_days_remaining: i64,
    pub owner_id: Option<String>,
    pub created_at: String,
}

impl From<Tenant> for TenantResponse {
    fn from(tenant: Tenant) -> Self {
        let today = chrono::Utc::now().date_naive();
        Self {
            id: tenant.id.to_string(),
            on_trial: tenant.is_on_trial(today),
            is_active: tenant.is_active(today),
            trial_days_remaining: tenant.trial_days_remaining(today),
            name: tenant.name,
            schema_name: tenant.schema_name,
            paid_until: tenant.paid_until,
            trial_end_date: tenant.trial_end_date,
            owner_id: tenant.owner_id.map(|o| o.to_string()),
            created_at: tenant.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DomainResponse {
    pub id: String,
    pub domain: String,
    pub tenant_id: String,
    pub is_primary: bool,
}

impl From<TenantDomain> for DomainResponse {
    fn from(domain: TenantDomain) -> Self {
        Self {
            id: domain.id.to_string(),
            domain: domain.domain,
            tenant_id: domain.tenant_id.to_string(),
            is_primary: domain.is_primary,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AddressResponse {
    pub id: String,
    pub country: String,
    pub state: String,
    pub city: String,
    pub address_line1: String,
    pub address_line2: String,
    pub zip_code: String,
    pub full_address: String,
}

impl From<Address> for AddressResponse {
    fn from(address: Address) -> Self {
        Self {
            id: address.id.to_string(),
            full_address: address.full_address(),
            country: address.country,
            state: address.state,
            city: address.city,
            address_line1: address.address_line1,
            address_line2: address.address_line2,
            zip_code: address.zip_code,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InvitationResponse {
    pub id: String,
    pub tenant_id: String,
    pub email: String,
    pub invited_by: String,
    pub status: InvitationStatus,
    pub created_at: String,
    pub expires_at: String,
    pub accepted_at: Option<String>,
    pub days_until_expiry: i64,
}

impl From<Invitation> for InvitationResponse {
    fn from(invitation: Invitation) -> Self {
        Self {
            id: invitation.id.to_string(),
            days_until_expiry: invitation.days_until_expiry(chrono::Utc::now()),
            tenant_id: invitation.tenant_id.to_string(),
            email: invitation.email,
            invited_by: invitation.invited_by.to_string(),
            status: invitation.status,
            created_at: invitation.created_at.to_rfc3339(),
            expires_at: invitation.expires_at.to_rfc3339(),
            accepted_at: invitation.accepted_at.map(|t| t.to_rfc3339()),
        }
    }
}
