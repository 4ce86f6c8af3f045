//! Request middleware: bearer authentication, tenant resolution from the
//! `Host` header, tenant access rules and request language.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use crate::domain::entities::{Language, Tenant, User};
use crate::error::AppError;
use crate::AppState;

/// Tenant served on the request host; `None` on the public schema
#[derive(Debug, Clone)]
pub struct TenantContext(pub Option<Tenant>);

/// Extract the token from the Authorization header
fn extract_bearer(request: &Request<Body>) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Host the request was sent to, port included
fn request_host(request: &Request<Body>) -> Option<String> {
    request
        .headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .or_else(|| request.uri().host().map(str::to_string))
}

/// Authentication middleware
///
/// Validates the access token and injects the User into request extensions.
/// Routes that require authentication should use this middleware.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer(&request).ok_or(AppError::Unauthorized)?;

    let user = state.auth_service.authenticate(token).await?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Optional authentication middleware
///
/// Like auth_middleware but doesn't fail if no valid token is provided.
/// The user will be absent from extensions if not authenticated.
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    if let Some(token) = extract_bearer(&request) {
        match state.auth_service.authenticate(token).await {
            Ok(user) => {
                request.extensions_mut().insert(user);
            }
            Err(e) => tracing::debug!(error = %e, "Ignoring invalid bearer token"),
        }
    }

    next.run(request).await
}

/// Resolve the tenant from the `Host` header
pub async fn tenant_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let tenant = match request_host(&request) {
        Some(host) => state.tenant_service.resolve_host(&host).await?,
        None => None,
    };

    if let Some(tenant) = &tenant {
        tracing::debug!(tenant_id = %tenant.id, schema = %tenant.schema_name, "Tenant resolved");
    }

    request.extensions_mut().insert(TenantContext(tenant));
    Ok(next.run(request).await)
}

/// Guard for tenant routes.
///
/// Needs `tenant_middleware` and `auth_middleware` in front of it. The
/// caller must be a member of the host's tenant (or a superuser), and the
/// tenant must be paid or on trial unless the caller is a superuser. The
/// resolved `Tenant` is injected for the handlers.
pub async fn tenant_access_middleware(
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let tenant = request
        .extensions()
        .get::<TenantContext>()
        .and_then(|ctx| ctx.0.clone())
        .ok_or_else(|| AppError::NotFound("No tenant is served on this host".to_string()))?;
    let user = request
        .extensions()
        .get::<User>()
        .ok_or(AppError::Unauthorized)?;

    if !user.can_access_tenant(&tenant.id) {
        return Err(AppError::forbidden("You are not a member of this tenant"));
    }
    if !user.is_superuser && !tenant.is_active(Utc::now().date_naive()) {
        return Err(AppError::forbidden(
            "The subscription or trial of this tenant has ended",
        ));
    }

    request.extensions_mut().insert(tenant);
    Ok(next.run(request).await)
}

/// Pick the request language from `Accept-Language` and echo it back in
/// `Content-Language`
pub async fn language_middleware(mut request: Request<Body>, next: Next) -> Response {
    let language = Language::from_accept_language(
        request
            .headers()
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|h| h.to_str().ok()),
    );
    request.extensions_mut().insert(language);

    let mut response = next.run(request).await;
    response
        .headers_mut()
        .entry(header::CONTENT_LANGUAGE)
        .or_insert(HeaderValue::from_static(language.code()));
    response
}
