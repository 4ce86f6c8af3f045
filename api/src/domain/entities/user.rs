//! User domain entity
//!
//! An account identified by email. Non-superusers always belong to exactly
//! one tenant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::address::AddressId;
use super::language::Language;
use super::tenant::TenantId;

/// Unique identifier for a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for UserId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Gender as stored on the profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "O")]
    Other,
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gender::Male => write!(f, "M"),
            Gender::Female => write!(f, "F"),
            Gender::Other => write!(f, "O"),
        }
    }
}

impl std::str::FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "M" => Ok(Gender::Male),
            "F" => Ok(Gender::Female),
            "O" => Ok(Gender::Other),
            _ => Err(format!("Unknown gender: {}", s)),
        }
    }
}

/// A platform account
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub gender: Option<Gender>,
    pub tenant_id: Option<TenantId>,
    pub address_id: Option<AddressId>,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub preferred_language: Language,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn short_name(&self) -> &str {
        &self.first_name
    }

    pub fn belongs_to(&self, tenant_id: &TenantId) -> bool {
        self.tenant_id.as_ref() == Some(tenant_id)
    }

    /// Superusers see every tenant, everyone else only their own
    pub fn can_access_tenant(&self, tenant_id: &TenantId) -> bool {
        self.is_superuser || self.belongs_to(tenant_id)
    }

    /// Local part of the email, used when no first name is known
    pub fn email_local_part(&self) -> &str {
        self.email.split('@').next().unwrap_or(&self.email)
    }
}

/// Data needed to create a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub gender: Option<Gender>,
    pub tenant_id: Option<TenantId>,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub preferred_language: Language,
}

/// Profile fields a user may change on themselves
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// `Some(None)` clears the phone number
    pub phone_number: Option<Option<String>>,
    pub gender: Option<Option<Gender>>,
    pub preferred_language: Option<Language>,
}

impl ProfileUpdate {
    /// Apply the present fields to a user
    pub fn apply_to(&self, user: &mut User) {
        if let Some(first) = &self.first_name {
            user.first_name = first.clone();
        }
        if let Some(last) = &self.last_name {
            user.last_name = last.clone();
        }
        if let Some(phone) = &self.phone_number {
            user.phone_number = phone.clone();
        }
        if let Some(gender) = self.gender {
            user.gender = gender;
        }
        if let Some(language) = self.preferred_language {
            user.preferred_language = language;
        }
    }
}

/// Normalize an email address: trim and lowercase the domain part
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}
