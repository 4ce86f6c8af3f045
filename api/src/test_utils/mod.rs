//! Test utilities
//!
//! Manual mock implementations and test fixtures for unit testing.
//!
//! Why manual mocks instead of mockall?
//! - mockall has lifetime issues with traits containing `&str` parameters
//! - Manual mocks are more explicit and easier to debug
//! - The repositories of a `TestStore` share tables, which a per-trait mock
//!   cannot express
//!
//! HTTP level behaviour is covered by the middleware tests and by the
//! Postgres-backed integration tests.

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
