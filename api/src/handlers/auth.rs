//! Auth handlers
//!
//! Sign-up, token issuance, refresh and logout.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{DomainResponse, TenantResponse, UserResponse};
use crate::app::Registration;
use crate::auth::TokenPair;
use crate::domain::entities::{InvitationId, Language};
use crate::error::AppError;
use crate::AppState;

/// Request body for registration
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    /// Must repeat `password`
    pub password2: String,
    pub first_name: String,
    pub last_name: String,
    /// Organization to create; defaults to "{first_name}'s Tenant"
    pub tenant_name: Option<String>,
    /// Join the tenant of this invitation instead of creating one
    pub invitation_id: Option<Uuid>,
    pub preferred_language: Option<Language>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: UserResponse,
    pub tenant: TenantResponse,
    /// Only set when a new tenant was created
    pub primary_domain: Option<DomainResponse>,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
    pub user_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub tenant_id: Option<String>,
    pub is_superuser: bool,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// POST /api/auth/register
///
/// Create an account. Without an invitation a tenant is provisioned with the
/// new user as owner.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let account = state
        .account_service
        .register(Registration {
            email: request.email,
            password: request.password,
            password2: request.password2,
            first_name: request.first_name,
            last_name: request.last_name,
            tenant_name: request.tenant_name,
            invitation_id: request.invitation_id.map(InvitationId),
            preferred_language: request.preferred_language,
        })
        .await?;

    let message = match &account.primary_domain {
        Some(domain) => format!(
            "Account created. Your workspace is available at {}",
            domain.domain
        ),
        None => format!("Account created. You joined {}", account.tenant.name),
    };

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user: account.user.into(),
            tenant: account.tenant.into(),
            primary_domain: account.primary_domain.map(Into::into),
            message,
        }),
    ))
}

/// POST /api/auth/login, POST /api/auth/token
///
/// Exchange credentials for an access/refresh token pair.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let result = state
        .auth_service
        .login(&request.email, &request.password)
        .await?;

    let user = result.user;
    Ok(Json(LoginResponse {
        access: result.tokens.access,
        refresh: result.tokens.refresh,
        user_id: user.id.to_string(),
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
        tenant_id: user.tenant_id.map(|t| t.to_string()),
        is_superuser: user.is_superuser,
    }))
}

/// POST /api/auth/token/refresh
///
/// Rotate a refresh token. The presented token stops working.
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<TokenPair>, AppError> {
    let pair = state.auth_service.refresh(&request.refresh).await?;
    Ok(Json(pair))
}

/// POST /api/auth/logout
///
/// Revoke a refresh token. Answers 205 Reset Content.
pub async fn logout(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<StatusCode, AppError> {
    state.auth_service.logout(&request.refresh).await?;
    Ok(StatusCode::RESET_CONTENT)
}
