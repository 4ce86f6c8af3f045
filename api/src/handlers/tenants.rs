//! Tenant handlers
//!
//! Superuser administration of tenants, and the tenant served on the
//! current host.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::{
    double_option, require_superuser, DomainResponse, PageQuery, TenantResponse,
};
use crate::app::TenantUpdate;
use crate::domain::entities::{Tenant, TenantId, User};
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateTenantRequest {
    pub name: String,
    pub paid_until: Option<NaiveDate>,
}

/// Partial tenant update. `"paid_until": null` ends the subscription.
#[derive(Debug, Deserialize)]
pub struct UpdateTenantRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub paid_until: Option<Option<NaiveDate>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StartTrialRequest {
    /// Trial length; the configured default when absent
    pub days: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ProvisionedTenantResponse {
    pub tenant: TenantResponse,
    pub primary_domain: DomainResponse,
}

#[derive(Debug, Serialize)]
pub struct CurrentTenantResponse {
    #[serde(flatten)]
    pub tenant: TenantResponse,
    pub domains: Vec<DomainResponse>,
}

/// GET /api/tenants
pub async fn list_tenants(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<TenantResponse>>, AppError> {
    require_superuser(&user)?;
    let (limit, offset) = query.bounds();

    let tenants = state.tenant_service.list(limit, offset).await?;
    Ok(Json(tenants.into_iter().map(Into::into).collect()))
}

/// POST /api/tenants
///
/// Create a tenant with its schema, primary domain and trial.
pub async fn create_tenant(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateTenantRequest>,
) -> Result<(StatusCode, Json<ProvisionedTenantResponse>), AppError> {
    require_superuser(&user)?;

    let provisioned = state
        .tenant_service
        .create_tenant(&request.name, request.paid_until)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ProvisionedTenantResponse {
            tenant: provisioned.tenant.into(),
            primary_domain: provisioned.primary_domain.into(),
        }),
    ))
}

/// GET /api/tenants/:id
pub async fn get_tenant(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<Json<TenantResponse>, AppError> {
    require_superuser(&user)?;
    let tenant = state.tenant_service.get(&TenantId(id)).await?;
    Ok(Json(tenant.into()))
}

/// PATCH /api/tenants/:id
pub async fn update_tenant(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTenantRequest>,
) -> Result<Json<TenantResponse>, AppError> {
    require_superuser(&user)?;

    let tenant = state
        .tenant_service
        .update(
            &TenantId(id),
            TenantUpdate {
                name: request.name,
                paid_until: request.paid_until,
            },
        )
        .await?;

    Ok(Json(tenant.into()))
}

/// DELETE /api/tenants/:id
pub async fn delete_tenant(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    require_superuser(&user)?;
    state.tenant_service.delete(&TenantId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/tenants/:id/trial
///
/// Restart the trial from today.
pub async fn start_trial(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
    request: Option<Json<StartTrialRequest>>,
) -> Result<Json<TenantResponse>, AppError> {
    require_superuser(&user)?;
    let Json(request) = request.unwrap_or_default();

    let tenant = state
        .tenant_service
        .start_trial(&TenantId(id), request.days)
        .await?;

    Ok(Json(tenant.into()))
}

/// GET /api/tenant
///
/// The tenant served on this host, with its domains.
pub async fn current_tenant(
    State(state): State<AppState>,
    Extension(tenant): Extension<Tenant>,
) -> Result<Json<CurrentTenantResponse>, AppError> {
    let domains = state.tenant_service.domains_of(&tenant.id).await?;

    Ok(Json(CurrentTenantResponse {
        tenant: tenant.into(),
        domains: domains.into_iter().map(Into::into).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_create_tenant_request() {
        let json = r#"{"name": "Acme", "paid_until": "2030-12-31"}"#;
        let request: CreateTenantRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.name, "Acme");
        assert_eq!(request.paid_until, NaiveDate::from_ymd_opt(2030, 12, 31));
    }

    #[test]
    fn parse_update_tenant_request_null_ends_subscription() {
        let request: UpdateTenantRequest =
            serde_json::from_str(r#"{"paid_until": null}"#).unwrap();
        assert_eq!(request.paid_until, Some(None));
        assert!(request.name.is_none());

        let request: UpdateTenantRequest = serde_json::from_str(r#"{"name": "Beta"}"#).unwrap();
        assert!(request.paid_until.is_none());
    }

    #[test]
    fn parse_start_trial_request() {
        let request: StartTrialRequest = serde_json::from_str(r#"{"days": 14}"#).unwrap();
        assert_eq!(request.days, Some(14));

        let request: StartTrialRequest = serde_json::from_str("{}").unwrap();
        assert!(request.days.is_none());
    }
}
