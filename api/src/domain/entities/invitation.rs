//! Invitation domain entity
//!
//! An invitation for an email address to join a tenant.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::tenant::TenantId;
use super::user::UserId;
use crate::error::DomainError;

/// Default lifetime of an invitation
pub const DEFAULT_INVITATION_TTL_DAYS: i64 = 7;

/// Unique identifier for an invitation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvitationId(pub Uuid);

impl InvitationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for InvitationId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for InvitationId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for InvitationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Invitation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Expired,
    Declined,
}

impl std::fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvitationStatus::Pending => write!(f, "pending"),
            InvitationStatus::Accepted => write!(f, "accepted"),
            InvitationStatus::Expired => write!(f, "expired"),
            InvitationStatus::Declined => write!(f, "declined"),
        }
    }
}

impl std::str::FromStr for InvitationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(InvitationStatus::Pending),
            "accepted" => Ok(InvitationStatus::Accepted),
            "expired" => Ok(InvitationStatus::Expired),
            "declined" => Ok(InvitationStatus::Declined),
            _ => Err(format!("Unknown invitation status: {}", s)),
        }
    }
}

/// An invitation to join a tenant
#[derive(Debug, Clone, Serialize)]
pub struct Invitation {
    pub id: InvitationId,
    pub tenant_id: TenantId,
    pub email: String,
    pub invited_by: UserId,
    pub status: InvitationStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
}

impl Invitation {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn is_pending(&self) -> bool {
        self.status == InvitationStatus::Pending
    }

    /// Accept the invitation
    pub fn accept(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.is_expired(now) {
            return Err(DomainError::Validation("Invitation has expired".to_string()));
        }
        if !self.is_pending() {
            return Err(DomainError::Validation(
                "Invitation is not pending".to_string(),
            ));
        }

        self.status = InvitationStatus::Accepted;
        self.accepted_at = Some(now);
        Ok(())
    }

    /// Decline the invitation
    pub fn decline(&mut self) -> Result<(), DomainError> {
        if !self.is_pending() {
            return Err(DomainError::Validation(
                "Invitation is not pending".to_string(),
            ));
        }

        self.status = InvitationStatus::Declined;
        Ok(())
    }

    /// Mark a pending invitation past its window as expired.
    ///
    /// Returns true when the status changed.
    pub fn expire_if_due(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_pending() && self.is_expired(now) {
            self.status = InvitationStatus::Expired;
            true
        } else {
            false
        }
    }

    /// Push the expiry out to a fresh window
    pub fn renew(&mut self, now: DateTime<Utc>, ttl_days: i64) {
        self.expires_at = now + Duration::days(ttl_days);
    }

    /// Reopen a declined or expired invitation with a fresh window
    pub fn reopen(&mut self, invited_by: UserId, now: DateTime<Utc>, ttl_days: i64) {
        self.status = InvitationStatus::Pending;
        self.invited_by = invited_by;
        self.accepted_at = None;
        self.renew(now, ttl_days);
    }

    /// Whole days until expiry, never negative
    pub fn days_until_expiry(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_days().max(0)
    }

    /// Check the invitation is addressed to this email
    pub fn is_for_email(&self, email: &str) -> bool {
        self.email.eq_ignore_ascii_case(email)
    }
}

/// Data needed to create a new invitation
#[derive(Debug, Clone)]
pub struct NewInvitation {
    pub tenant_id: TenantId,
    pub email: String,
    pub invited_by: UserId,
    pub expires_at: DateTime<Utc>,
}

impl NewInvitation {
    /// Invitation expiring `ttl_days` after `now`
    pub fn new(
        tenant_id: TenantId,
        email: String,
        invited_by: UserId,
        now: DateTime<Utc>,
        ttl_days: i64,
    ) -> Self {
        Self {
            tenant_id,
            email,
            invited_by,
            expires_at: now + Duration::days(ttl_days),
        }
    }
}
