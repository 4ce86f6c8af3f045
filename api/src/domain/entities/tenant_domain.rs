//! Tenant domain entity
//!
//! Host names that route requests to a tenant.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::tenant::TenantId;

/// Unique identifier for a domain binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DomainId(pub Uuid);

impl DomainId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DomainId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for DomainId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for DomainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A host name bound to a tenant
#[derive(Debug, Clone, Serialize)]
pub struct TenantDomain {
    pub id: DomainId,
    pub domain: String,
    pub tenant_id: TenantId,
    pub is_primary: bool,
}

/// Data needed to bind a new domain
#[derive(Debug, Clone)]
pub struct NewTenantDomain {
    pub domain: String,
    pub tenant_id: TenantId,
    pub is_primary: bool,
}

/// Normalize a host header value: drop the port, trailing dot and case
pub fn normalize_host(host: &str) -> String {
    let host = host.trim();
    let without_port = match host.rsplit_once(':') {
        Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host,
    };
    without_port.trim_end_matches('.').to_ascii_lowercase()
}

/// Check a host name is made of valid DNS labels
pub fn is_valid_host(host: &str) -> bool {
    if host.is_empty() || host.len() > 253 {
        return false;
    }
    host.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    })
}
