//! Authentication service
//!
//! Email/password login, token refresh with rotation, logout and bearer
//! token authentication.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::auth::{verify_password, JwtKeys, TokenPair, TokenType};
use crate::domain::entities::{User, UserId};
use crate::domain::ports::{RevokedTokenRepository, UserRepository};
use crate::error::{AppError, DomainError};

const BAD_CREDENTIALS: &str = "No active account found with the given credentials";

/// Tokens and profile returned by a successful login
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub tokens: TokenPair,
    pub user: User,
}

/// Service for token based authentication
pub struct AuthService<UR, RT>
where
    UR: UserRepository,
    RT: RevokedTokenRepository,
{
    users: Arc<UR>,
    revoked: Arc<RT>,
    keys: JwtKeys,
}

impl<UR, RT> AuthService<UR, RT>
where
    UR: UserRepository,
    RT: RevokedTokenRepository,
{
    pub fn new(users: Arc<UR>, revoked: Arc<RT>, keys: JwtKeys) -> Self {
        Self {
            users,
            revoked,
            keys,
        }
    }

    /// Exchange email and password for a token pair
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResult, AppError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .filter(|u| u.is_active && verify_password(password, &u.password_hash))
            .ok_or_else(|| unauthorized(BAD_CREDENTIALS))?;

        let tokens = self.keys.issue_pair(&user, Utc::now())?;

        if let Err(e) = self.users.update_last_login(&user.id).await {
            tracing::warn!(error = %e, user_id = %user.id, "Failed to update last_login");
        }

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(LoginResult { tokens, user })
    }

    /// Issue a new pair and revoke the refresh token that was used
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AppError> {
        let claims = self.keys.verify(refresh_token, TokenType::Refresh)?;
        if self.revoked.is_revoked(&claims.jti).await? {
            return Err(unauthorized("Token is blacklisted"));
        }

        let user = self.active_user(&UserId(claims.sub)).await?;

        // Concurrent refreshes may all pass the check above; only one revokes
        if !self.revoked.revoke(&claims.jti, claims.expires_at()).await? {
            return Err(unauthorized("Token is blacklisted"));
        }

        Ok(self.keys.issue_pair(&user, Utc::now())?)
    }

    /// Revoke a refresh token
    pub async fn logout(&self, refresh_token: &str) -> Result<(), AppError> {
        let claims = self
            .keys
            .verify(refresh_token, TokenType::Refresh)
            .map_err(|_| AppError::BadRequest("Token is invalid or expired".to_string()))?;

        self.revoked.revoke(&claims.jti, claims.expires_at()).await?;

        tracing::info!(user_id = %claims.sub, "User logged out");
        Ok(())
    }

    /// Resolve a bearer access token to its user
    pub async fn authenticate(&self, access_token: &str) -> Result<User, AppError> {
        let claims = self.keys.verify(access_token, TokenType::Access)?;
        if self.revoked.is_revoked(&claims.jti).await? {
            return Err(unauthorized("Token is blacklisted"));
        }

        self.active_user(&UserId(claims.sub)).await
    }

    /// Forget revocations of tokens that expired anyway
    pub async fn purge_revoked(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        Ok(self.revoked.purge_expired(now).await?)
    }

    async fn active_user(&self, id: &UserId) -> Result<User, AppError> {
        self.users
            .find_by_id(id)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| unauthorized("User not found or inactive"))
    }
}

fn unauthorized(msg: &str) -> AppError {
    AppError::Domain(DomainError::Unauthorized(msg.to_string()))
}
