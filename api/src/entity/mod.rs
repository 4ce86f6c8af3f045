//! SeaORM entity models
//!
//! Table definitions for the public schema. Domain models live in
//! `domain::entities`; adapters convert between the two.

pub mod addresses;
pub mod domains;
pub mod invitations;
pub mod revoked_tokens;
pub mod tenants;
pub mod users;
