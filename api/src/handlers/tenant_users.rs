//! Tenant member handlers
//!
//! Served on tenant hosts only; `tenant_access_middleware` has already
//! checked membership and the subscription.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use super::common::{AddressResponse, PageQuery, PageResponse, UserResponse};
use super::users::UpdateProfileRequest;
use crate::app::NewAccount;
use crate::domain::entities::{Gender, Language, Tenant, User, UserId};
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateMemberRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub gender: Option<Gender>,
    #[serde(default)]
    pub preferred_language: Language,
}

/// GET /api/tenant/users
pub async fn list_members(
    State(state): State<AppState>,
    Extension(tenant): Extension<Tenant>,
    Extension(user): Extension<User>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageResponse<UserResponse>>, AppError> {
    let (limit, offset) = query.bounds();
    let (members, count) = state
        .account_service
        .tenant_members(&user, &tenant.id, limit, offset)
        .await?;

    Ok(Json(PageResponse {
        count,
        results: members.into_iter().map(Into::into).collect(),
    }))
}

/// POST /api/tenant/users
///
/// The tenant owner adds an account to the tenant.
pub async fn create_member(
    State(state): State<AppState>,
    Extension(tenant): Extension<Tenant>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateMemberRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let member = state
        .account_service
        .create_member(
            &user,
            &tenant.id,
            NewAccount {
                email: request.email,
                password: request.password,
                first_name: request.first_name,
                last_name: request.last_name,
                phone_number: request.phone_number,
                gender: request.gender,
                tenant_id: Some(tenant.id),
                preferred_language: request.preferred_language,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(member.into())))
}

/// GET /api/tenant/users/:id
pub async fn get_member(
    State(state): State<AppState>,
    Extension(tenant): Extension<Tenant>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, AppError> {
    let member = state
        .account_service
        .tenant_member(&user, &tenant.id, &UserId(id))
        .await?;
    Ok(Json(member.into()))
}

/// PATCH /api/tenant/users/:id
pub async fn update_member(
    State(state): State<AppState>,
    Extension(tenant): Extension<Tenant>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let member = state
        .account_service
        .update_member(&user, &tenant.id, &UserId(id), request.into())
        .await?;
    Ok(Json(member.into()))
}

/// DELETE /api/tenant/users/:id
pub async fn delete_member(
    State(state): State<AppState>,
    Extension(tenant): Extension<Tenant>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let member = state
        .account_service
        .tenant_member(&user, &tenant.id, &UserId(id))
        .await?;

    state.account_service.delete_user(&user, &member.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/tenant/addresses
pub async fn list_addresses(
    State(state): State<AppState>,
    Extension(tenant): Extension<Tenant>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<AddressResponse>>, AppError> {
    let addresses = state
        .account_service
        .tenant_addresses(&user, &tenant.id)
        .await?;
    Ok(Json(addresses.into_iter().map(Into::into).collect()))
}
