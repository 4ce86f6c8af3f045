//! Domain handlers
//!
//! Superuser management of the host names bound to tenants.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use super::common::{require_superuser, DomainResponse};
use crate::domain::entities::{DomainId, TenantId, User};
use crate::error::AppError;
use crate::AppState;

/// Query parameters for listing domains
#[derive(Debug, Deserialize)]
pub struct ListDomainsQuery {
    /// Only the domains of this tenant
    pub tenant_id: Option<Uuid>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

#[derive(Debug, Deserialize)]
pub struct CreateDomainRequest {
    pub domain: String,
    pub tenant_id: Uuid,
    #[serde(default)]
    pub is_primary: bool,
}

/// GET /api/domains
pub async fn list_domains(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(query): Query<ListDomainsQuery>,
) -> Result<Json<Vec<DomainResponse>>, AppError> {
    require_superuser(&user)?;

    let domains = match query.tenant_id {
        Some(tenant_id) => state.tenant_service.domains_of(&TenantId(tenant_id)).await?,
        None => {
            state
                .tenant_service
                .list_domains(query.limit.clamp(1, 100), query.offset.max(0))
                .await?
        }
    };

    Ok(Json(domains.into_iter().map(Into::into).collect()))
}

/// POST /api/domains
pub async fn create_domain(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateDomainRequest>,
) -> Result<(StatusCode, Json<DomainResponse>), AppError> {
    require_superuser(&user)?;

    let domain = state
        .tenant_service
        .add_domain(&TenantId(request.tenant_id), &request.domain, request.is_primary)
        .await?;

    Ok((StatusCode::CREATED, Json(domain.into())))
}

/// GET /api/domains/:id
pub async fn get_domain(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<Json<DomainResponse>, AppError> {
    require_superuser(&user)?;
    let domain = state.tenant_service.get_domain(&DomainId(id)).await?;
    Ok(Json(domain.into()))
}

/// POST /api/domains/:id/primary
///
/// Make this the tenant's primary domain. The previous primary is demoted.
pub async fn make_primary(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<Json<DomainResponse>, AppError> {
    require_superuser(&user)?;
    let domain = state.tenant_service.make_primary(&DomainId(id)).await?;
    Ok(Json(domain.into()))
}

/// DELETE /api/domains/:id
pub async fn delete_domain(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    require_superuser(&user)?;
    state.tenant_service.delete_domain(&DomainId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
