//! Tenant domain entity
//!
//! A customer organization with its own Postgres schema and subdomain.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserId;

/// Longest schema name derived from a tenant name
pub const SCHEMA_NAME_MAX_LEN: usize = 50;

/// Default trial length for new tenants
pub const DEFAULT_TRIAL_DAYS: i64 = 30;

/// Schema names that can never be handed to a tenant
const RESERVED_SCHEMAS: &[&str] = &["public", "information_schema"];

/// Unique identifier for a tenant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantId(pub Uuid);

impl TenantId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TenantId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for TenantId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for TenantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A customer organization
#[derive(Debug, Clone, Serialize)]
pub struct Tenant {
    pub id: TenantId,
    pub schema_name: String,
    pub name: String,
    pub paid_until: Option<NaiveDate>,
    pub trial_end_date: Option<NaiveDate>,
    /// The user who created the tenant. They administer it.
    pub owner_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

impl Tenant {
    /// Check if the tenant is inside its trial window
    pub fn is_on_trial(&self, today: NaiveDate) -> bool {
        match self.trial_end_date {
            Some(end) => today <= end,
            None => false,
        }
    }

    /// A paid subscription wins over the trial when both are set
    pub fn is_active(&self, today: NaiveDate) -> bool {
        match self.paid_until {
            Some(paid_until) => today <= paid_until,
            None => self.is_on_trial(today),
        }
    }

    /// Whole days left on the trial, never negative
    pub fn trial_days_remaining(&self, today: NaiveDate) -> i64 {
        match self.trial_end_date {
            Some(end) => (end - today).num_days().max(0),
            None => 0,
        }
    }

    /// Start (or restart) the trial period
    pub fn start_trial(&mut self, today: NaiveDate, days: i64) {
        self.trial_end_date = Some(today + Duration::days(days));
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        self.owner_id.as_ref() == Some(user_id)
    }
}

/// Data needed to create a new tenant
#[derive(Debug, Clone)]
pub struct NewTenant {
    pub schema_name: String,
    pub name: String,
    pub paid_until: Option<NaiveDate>,
    pub trial_end_date: Option<NaiveDate>,
    pub owner_id: Option<UserId>,
}

/// Derive a schema name from a tenant name.
///
/// Lowercases, replaces every character outside `[a-z0-9]` with `_`,
/// truncates to [`SCHEMA_NAME_MAX_LEN`] and strips leading and trailing `_`.
/// Returns `None` when nothing alphanumeric survives.
pub fn schema_name_from(name: &str) -> Option<String> {
    let schema: String = name
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else {
                '_'
            }
        })
        .take(SCHEMA_NAME_MAX_LEN)
        .collect();
    let schema = schema.trim_matches('_');

    if schema.chars().any(|c| c.is_ascii_alphanumeric()) {
        Some(schema.to_string())
    } else {
        None
    }
}

/// Names Postgres or the platform keep for themselves
pub fn is_reserved_schema(schema: &str) -> bool {
    RESERVED_SCHEMAS.contains(&schema) || schema.starts_with("pg_")
}

/// Candidate schema names for deduplication: `base`, `base_1`, `base_2`, ...
pub fn schema_candidate(base: &str, attempt: u32) -> String {
    if attempt == 0 {
        base.to_string()
    } else {
        format!("{}_{}", base, attempt)
    }
}

/// Host label for a schema name (underscores are not valid in host names).
///
/// One-to-one for names from [`schema_name_from`] and [`schema_candidate`],
/// which never start or end with `_`.
pub fn subdomain_label(schema: &str) -> String {
    schema.replace('_', "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn tenant() -> Tenant {
        Tenant {
            id: TenantId::new(),
            schema_name: "acme".to_string(),
            name: "Acme".to_string(),
            paid_until: None,
            trial_end_date: None,
            owner_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn schema_name_sanitizes() {
        assert_eq!(
            schema_name_from("Alice's Tenant").as_deref(),
            Some("alice_s_tenant")
        );
        assert_eq!(schema_name_from("ACME Corp 2").as_deref(), Some("acme_corp_2"));
    }

    #[test]
    fn schema_name_replaces_non_ascii() {
        assert_eq!(schema_name_from("Café").as_deref(), Some("caf"));
    }

    #[test]
    fn schema_name_strips_edge_underscores() {
        assert_eq!(schema_name_from("Acme!").as_deref(), Some("acme"));
        assert_eq!(schema_name_from("_Acme").as_deref(), Some("acme"));
        assert_eq!(schema_name_from("  Acme Corp  ").as_deref(), Some("acme_corp"));

        let long = format!("{}!{}", "a".repeat(SCHEMA_NAME_MAX_LEN - 1), "b".repeat(10));
        assert_eq!(schema_name_from(&long).unwrap(), "a".repeat(SCHEMA_NAME_MAX_LEN - 1));
    }

    #[test]
    fn schema_name_truncates_to_fifty() {
        let long = "a".repeat(80);
        assert_eq!(schema_name_from(&long).unwrap().len(), SCHEMA_NAME_MAX_LEN);
    }

    #[test]
    fn schema_name_rejects_symbols_only() {
        assert!(schema_name_from("!!! ???").is_none());
        assert!(schema_name_from("").is_none());
    }

    #[test]
    fn reserved_schemas() {
        assert!(is_reserved_schema("public"));
        assert!(is_reserved_schema("pg_catalog"));
        assert!(!is_reserved_schema("acme"));
    }

    #[test]
    fn schema_candidates_append_counter() {
        assert_eq!(schema_candidate("acme", 0), "acme");
        assert_eq!(schema_candidate("acme", 2), "acme_2");
    }

    #[test]
    fn subdomain_label_uses_hyphens() {
        assert_eq!(subdomain_label("alice_s_tenant"), "alice-s-tenant");
        assert_eq!(subdomain_label("acme_1"), "acme-1");
        assert_ne!(subdomain_label("acme_1"), subdomain_label("acme1"));
    }

    #[test]
    fn no_trial_means_not_on_trial() {
        let t = tenant();
        assert!(!t.is_on_trial(date(2024, 1, 1)));
        assert!(!t.is_active(date(2024, 1, 1)));
        assert_eq!(t.trial_days_remaining(date(2024, 1, 1)), 0);
    }

    #[test]
    fn trial_is_inclusive_of_end_date() {
        let mut t = tenant();
        t.start_trial(date(2024, 1, 1), 30);
        assert_eq!(t.trial_end_date, Some(date(2024, 1, 31)));
        assert!(t.is_on_trial(date(2024, 1, 31)));
        assert!(!t.is_on_trial(date(2024, 2, 1)));
        assert_eq!(t.trial_days_remaining(date(2024, 1, 21)), 10);
        assert_eq!(t.trial_days_remaining(date(2024, 3, 1)), 0);
    }

    #[test]
    fn paid_subscription_overrides_trial() {
        let mut t = tenant();
        t.start_trial(date(2024, 1, 1), 30);
        t.paid_until = Some(date(2024, 1, 10));
        // Trial still running, but the paid date decides
        assert!(!t.is_active(date(2024, 1, 15)));
        assert!(t.is_active(date(2024, 1, 10)));
    }

    #[test]
    fn ownership_check() {
        let owner = UserId::new();
        let mut t = tenant();
        assert!(!t.is_owned_by(&owner));
        t.owner_id = Some(owner);
        assert!(t.is_owned_by(&owner));
    }
}
