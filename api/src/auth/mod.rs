//! Authentication: password hashing, JWT tokens and request middleware

pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::{Claims, JwtKeys, TokenPair, TokenType};
pub use middleware::{
    auth_middleware, language_middleware, optional_auth_middleware, tenant_access_middleware,
    tenant_middleware, TenantContext,
};
pub use password::{hash_password, verify_password};
