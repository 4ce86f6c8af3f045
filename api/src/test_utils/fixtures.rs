//! Test fixtures
//!
//! Factory functions for creating test data with sensible defaults.
//! Each fixture function creates a valid entity that can be customized.

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::domain::entities::{
    Invitation, InvitationId, InvitationStatus, Language, NewAddress, Tenant, TenantId, User,
    UserId, DEFAULT_INVITATION_TTL_DAYS, DEFAULT_TRIAL_DAYS,
};

/// Password accepted by the strength rules for every fixture user
pub const TEST_PASSWORD: &str = "Sup3r-Secret-Pw!";

/// Alice Martin, active, not bound to a tenant
pub fn test_user() -> User {
    User {
        id: UserId::new(),
        email: "alice@example.com".to_string(),
        password_hash: "!unusable".to_string(),
        first_name: "Alice".to_string(),
        last_name: "Martin".to_string(),
        phone_number: None,
        gender: None,
        tenant_id: None,
        address_id: None,
        is_active: true,
        is_staff: false,
        is_superuser: false,
        date_joined: Utc::now(),
        last_login: None,
        preferred_language: Language::En,
    }
}

/// A member of a tenant with a unique email
pub fn test_user_in(tenant_id: &TenantId) -> User {
    let tag = Uuid::new_v4().simple().to_string();
    User {
        email: format!("member-{}@example.com", &tag[..8]),
        first_name: "Bruno".to_string(),
        last_name: "Lefort".to_string(),
        tenant_id: Some(*tenant_id),
        ..test_user()
    }
}

pub fn test_superuser() -> User {
    User {
        email: "root@example.com".to_string(),
        first_name: "Root".to_string(),
        last_name: "Admin".to_string(),
        is_staff: true,
        is_superuser: true,
        ..test_user()
    }
}

/// Tenant "Acme" on an active trial, without owner
pub fn test_tenant() -> Tenant {
    let today = Utc::now().date_naive();
    Tenant {
        id: TenantId::new(),
        schema_name: "acme".to_string(),
        name: "Acme".to_string(),
        paid_until: None,
        trial_end_date: Some(today + Duration::days(DEFAULT_TRIAL_DAYS)),
        owner_id: None,
        created_at: Utc::now(),
    }
}

pub fn test_tenant_owned_by(owner: &UserId) -> Tenant {
    Tenant {
        owner_id: Some(*owner),
        ..test_tenant()
    }
}

/// Pending invitation expiring in seven days
pub fn test_invitation(tenant_id: &TenantId, email: &str, invited_by: &UserId) -> Invitation {
    let now = Utc::now();
    Invitation {
        id: InvitationId::new(),
        tenant_id: *tenant_id,
        email: email.to_string(),
        invited_by: *invited_by,
        status: InvitationStatus::Pending,
        created_at: now,
        expires_at: now + Duration::days(DEFAULT_INVITATION_TTL_DAYS),
        accepted_at: None,
    }
}

pub fn test_address() -> NewAddress {
    NewAddress {
        country: "FR".to_string(),
        state: "IDF".to_string(),
        city: "Paris".to_string(),
        address_line1: "12 rue de Rivoli".to_string(),
        address_line2: String::new(),
        zip_code: "75001".to_string(),
    }
}
