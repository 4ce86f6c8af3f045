//! Address domain entity

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AddressId(pub Uuid);

impl AddressId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AddressId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for AddressId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for AddressId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A postal address, shared between the users pointing at it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Address {
    pub id: AddressId,
    pub country: String,
    pub state: String,
    pub city: String,
    pub address_line1: String,
    pub address_line2: String,
    pub zip_code: String,
}

impl Address {
    /// All non-empty parts joined with ", "
    pub fn full_address(&self) -> String {
        [
            &self.address_line1,
            &self.address_line2,
            &self.city,
            &self.state,
            &self.country,
            &self.zip_code,
        ]
        .iter()
        .filter(|part| !part.is_empty())
        .map(|part| part.as_str())
        .collect::<Vec<_>>()
        .join(", ")
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}, {}", self.address_line1, self.city, self.country)
    }
}

/// Data needed to create or replace an address
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewAddress {
    pub country: String,
    pub state: String,
    pub city: String,
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: String,
    pub zip_code: String,
}
