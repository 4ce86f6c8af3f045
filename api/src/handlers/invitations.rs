//! Invitation handlers
//!
//! Inviting people to a tenant and answering invitations.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use super::common::{InvitationResponse, PageQuery};
use crate::domain::entities::{InvitationId, TenantId, User};
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateInvitationRequest {
    pub email: String,
    /// Defaults to the inviter's own tenant
    pub tenant_id: Option<Uuid>,
}

/// GET /api/invitations
///
/// Invitations of the tenants the caller owns and invitations addressed to
/// the caller. Superusers see all.
pub async fn list_invitations(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<InvitationResponse>>, AppError> {
    let (limit, offset) = query.bounds();
    let invitations = state
        .invitation_service
        .list(&user, limit, offset)
        .await?;

    Ok(Json(invitations.into_iter().map(Into::into).collect()))
}

/// POST /api/invitations
///
/// Invite an email address and send the invitation mail.
pub async fn create_invitation(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateInvitationRequest>,
) -> Result<(StatusCode, Json<InvitationResponse>), AppError> {
    let tenant_id = request
        .tenant_id
        .map(TenantId)
        .or(user.tenant_id)
        .ok_or_else(|| AppError::validation("tenant_id is required"))?;

    let invitation = state
        .invitation_service
        .create(&user, &tenant_id, &request.email)
        .await?;

    Ok((StatusCode::CREATED, Json(invitation.into())))
}

/// GET /api/invitations/:id
pub async fn get_invitation(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<Json<InvitationResponse>, AppError> {
    let invitation = state
        .invitation_service
        .get(&user, &InvitationId(id))
        .await?;
    Ok(Json(invitation.into()))
}

/// DELETE /api/invitations/:id
pub async fn delete_invitation(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state
        .invitation_service
        .delete(&user, &InvitationId(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/invitations/:id/resend
pub async fn resend_invitation(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<Json<InvitationResponse>, AppError> {
    let invitation = state
        .invitation_service
        .resend(&user, &InvitationId(id))
        .await?;
    Ok(Json(invitation.into()))
}

/// POST /api/invitations/:id/accept
///
/// Join the invitation's tenant.
pub async fn accept_invitation(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<Json<InvitationResponse>, AppError> {
    let invitation = state
        .invitation_service
        .accept(&user, &InvitationId(id))
        .await?;
    Ok(Json(invitation.into()))
}

/// POST /api/invitations/:id/decline
pub async fn decline_invitation(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<Json<InvitationResponse>, AppError> {
    let invitation = state
        .invitation_service
        .decline(&user, &InvitationId(id))
        .await?;
    Ok(Json(invitation.into()))
}
