//! Invitation service
//!
//! Invitation lifecycle: pending -> accepted / declined / expired, plus the
//! invitation mail.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::entities::user::normalize_email;
use crate::domain::entities::{
    Invitation, InvitationId, InvitationStatus, NewInvitation, Tenant, TenantId, User,
    DEFAULT_INVITATION_TTL_DAYS,
};
use crate::domain::ports::{
    InvitationRepository, Mailer, OutgoingMail, TenantRepository, UserRepository,
};
use crate::domain::validation::validate_email;
use crate::error::AppError;

/// Mail and expiry settings
#[derive(Debug, Clone)]
pub struct InvitationSettings {
    /// Base URL of the frontend; accept links point there
    pub frontend_url: String,
    pub from_email: String,
    pub ttl_days: i64,
}

impl Default for InvitationSettings {
    fn default() -> Self {
        Self {
            frontend_url: "http://localhost:3000".to_string(),
            from_email: "noreply@budgenus.local".to_string(),
            ttl_days: DEFAULT_INVITATION_TTL_DAYS,
        }
    }
}

/// Service for tenant invitations
pub struct InvitationService<IR, TR, UR, ML>
where
    IR: InvitationRepository,
    TR: TenantRepository,
    UR: UserRepository,
    ML: Mailer,
{
    invitations: Arc<IR>,
    tenants: Arc<TR>,
    users: Arc<UR>,
    mailer: Arc<ML>,
    settings: InvitationSettings,
}

impl<IR, TR, UR, ML> InvitationService<IR, TR, UR, ML>
where
    IR: InvitationRepository,
    TR: TenantRepository,
    UR: UserRepository,
    ML: Mailer,
{
    pub fn new(
        invitations: Arc<IR>,
        tenants: Arc<TR>,
        users: Arc<UR>,
        mailer: Arc<ML>,
        settings: InvitationSettings,
    ) -> Self {
        Self {
            invitations,
            tenants,
            users,
            mailer,
            settings,
        }
    }

    /// Invite an email address to a tenant and send the invitation mail.
    ///
    /// A declined or expired invitation for the same address is reopened.
    pub async fn create(
        &self,
        actor: &User,
        tenant_id: &TenantId,
        email: &str,
    ) -> Result<Invitation, AppError> {
        let email = normalize_email(email);
        validate_email(&email)?;

        let tenant = self.tenant(tenant_id).await?;
        if !actor.is_superuser && !tenant.is_owned_by(&actor.id) {
            return Err(AppError::forbidden(
                "You can only invite users to tenants you own",
            ));
        }

        if let Some(existing) = self.users.find_by_email(&email).await? {
            if existing.belongs_to(tenant_id) {
                return Err(AppError::conflict(
                    "This user is already a member of the tenant",
                ));
            }
        }

        let now = Utc::now();
        let invitation = match self
            .invitations
            .find_by_tenant_and_email(tenant_id, &email)
            .await?
        {
            Some(mut existing) => {
                existing.expire_if_due(now);
                match existing.status {
                    InvitationStatus::Pending => {
                        return Err(AppError::conflict(
                            "An invitation is already pending for this email",
                        ))
                    }
                    InvitationStatus::Accepted => {
                        return Err(AppError::conflict("Invitation has already been used"))
                    }
                    InvitationStatus::Declined | InvitationStatus::Expired => {}
                }
                existing.reopen(actor.id, now, self.settings.ttl_days);
                self.invitations.update(&existing).await?
            }
            None => {
                self.invitations
                    .create(&NewInvitation::new(
                        *tenant_id,
                        email,
                        actor.id,
                        now,
                        self.settings.ttl_days,
                    ))
                    .await?
            }
        };

        tracing::info!(
            invitation_id = %invitation.id,
            tenant_id = %tenant.id,
            invited_by = %actor.id,
            "Invitation created"
        );

        self.send_invitation(&invitation, &tenant, actor).await?;
        Ok(invitation)
    }

    /// Invitations visible to the actor.
    ///
    /// Superusers see everything; others see invitations of tenants they own
    /// and invitations addressed to them.
    pub async fn list(
        &self,
        actor: &User,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Invitation>, AppError> {
        let invitations = if actor.is_superuser {
            self.invitations.find_all(limit, offset).await?
        } else {
            let owned: Vec<TenantId> = self
                .tenants
                .find_by_owner(&actor.id)
                .await?
                .into_iter()
                .map(|t| t.id)
                .collect();

            let mut seen = HashSet::new();
            let mut visible = self.invitations.find_by_tenants(&owned).await?;
            visible.extend(self.invitations.find_by_email(&actor.email).await?);
            visible.retain(|i| seen.insert(i.id));
            visible.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            visible
                .into_iter()
                .skip(offset.max(0) as usize)
                .take(limit.max(0) as usize)
                .collect()
        };

        let now = Utc::now();
        let mut result = Vec::with_capacity(invitations.len());
        for invitation in invitations {
            result.push(self.refresh_status(invitation, now).await?);
        }
        Ok(result)
    }

    pub async fn get(&self, actor: &User, id: &InvitationId) -> Result<Invitation, AppError> {
        let invitation = self.find(id).await?;
        let tenant = self.tenant(&invitation.tenant_id).await?;

        let visible = actor.is_superuser
            || tenant.is_owned_by(&actor.id)
            || invitation.is_for_email(&actor.email);
        if !visible {
            return Err(AppError::NotFound(format!("Invitation {} not found", id)));
        }

        self.refresh_status(invitation, Utc::now()).await
    }

    /// Send a pending invitation again with a fresh expiry window
    pub async fn resend(&self, actor: &User, id: &InvitationId) -> Result<Invitation, AppError> {
        let mut invitation = self.find(id).await?;
        let tenant = self.managed_tenant(actor, &invitation.tenant_id).await?;

        let now = Utc::now();
        if invitation.is_expired(now) {
            return Err(AppError::validation("Invitation has expired"));
        }
        if !invitation.is_pending() {
            return Err(AppError::validation("Invitation has already been used"));
        }

        invitation.renew(now, self.settings.ttl_days);
        let invitation = self.invitations.update(&invitation).await?;

        let inviter = self.users.find_by_id(&invitation.invited_by).await?;
        self.send_invitation(&invitation, &tenant, inviter.as_ref().unwrap_or(actor))
            .await?;

        tracing::info!(invitation_id = %invitation.id, "Invitation resent");
        Ok(invitation)
    }

    pub async fn delete(&self, actor: &User, id: &InvitationId) -> Result<(), AppError> {
        let invitation = self.find(id).await?;
        self.managed_tenant(actor, &invitation.tenant_id).await?;

        self.invitations.delete(id).await?;
        Ok(())
    }

    /// Accept an invitation and join its tenant
    pub async fn accept(&self, actor: &User, id: &InvitationId) -> Result<Invitation, AppError> {
        let now = Utc::now();
        let invitation = self.refresh_status(self.find(id).await?, now).await?;

        if !invitation.is_for_email(&actor.email) {
            return Err(AppError::forbidden(
                "This invitation was sent to a different email address.",
            ));
        }
        if !actor.is_superuser
            && actor
                .tenant_id
                .is_some_and(|current| current != invitation.tenant_id)
        {
            return Err(AppError::conflict(
                "You already belong to another tenant",
            ));
        }

        let mut invitation = invitation;
        invitation.accept(now)?;
        let invitation = self.invitations.update(&invitation).await?;

        if actor.tenant_id.is_none() {
            self.users
                .set_tenant(&actor.id, Some(invitation.tenant_id))
                .await?;
        }

        tracing::info!(
            invitation_id = %invitation.id,
            user_id = %actor.id,
            tenant_id = %invitation.tenant_id,
            "Invitation accepted"
        );
        Ok(invitation)
    }

    /// Decline an invitation. The invitee or the tenant owner may decline.
    pub async fn decline(&self, actor: &User, id: &InvitationId) -> Result<Invitation, AppError> {
        let mut invitation = self.find(id).await?;

        if !invitation.is_for_email(&actor.email) && !actor.is_superuser {
            let tenant = self.tenant(&invitation.tenant_id).await?;
            if !tenant.is_owned_by(&actor.id) {
                return Err(AppError::forbidden(
                    "You cannot decline this invitation",
                ));
            }
        }

        invitation.decline()?;
        let invitation = self.invitations.update(&invitation).await?;

        tracing::info!(invitation_id = %invitation.id, "Invitation declined");
        Ok(invitation)
    }

    /// Mark every pending invitation past its window as expired
    pub async fn expire_stale(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let expired = self.invitations.expire_pending(now).await?;
        if expired > 0 {
            tracing::info!(count = expired, "Expired stale invitations");
        }
        Ok(expired)
    }

    async fn find(&self, id: &InvitationId) -> Result<Invitation, AppError> {
        self.invitations
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Invitation {} not found", id)))
    }

    async fn tenant(&self, id: &TenantId) -> Result<Tenant, AppError> {
        self.tenants
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tenant {} not found", id)))
    }

    /// Tenant of an invitation, if the actor may manage it
    async fn managed_tenant(&self, actor: &User, tenant_id: &TenantId) -> Result<Tenant, AppError> {
        let tenant = self.tenant(tenant_id).await?;
        if actor.is_superuser || tenant.is_owned_by(&actor.id) {
            Ok(tenant)
        } else {
            Err(AppError::forbidden(
                "Only the tenant owner can manage invitations",
            ))
        }
    }

    /// Persist the expired status of a pending invitation found past its window
    async fn refresh_status(
        &self,
        mut invitation: Invitation,
        now: DateTime<Utc>,
    ) -> Result<Invitation, AppError> {
        if invitation.expire_if_due(now) {
            return Ok(self.invitations.update(&invitation).await?);
        }
        Ok(invitation)
    }

    fn accept_url(&self, invitation: &Invitation) -> String {
        format!(
            "{}/invitations/{}/accept",
            self.settings.frontend_url.trim_end_matches('/'),
            invitation.id
        )
    }

    async fn send_invitation(
        &self,
        invitation: &Invitation,
        tenant: &Tenant,
        inviter: &User,
    ) -> Result<(), AppError> {
        let mail = compose_invitation_mail(
            invitation,
            tenant,
            inviter,
            &self.accept_url(invitation),
            &self.settings.from_email,
        );

        self.mailer.send(&mail).await.map_err(|e| {
            tracing::error!(error = %e, invitation_id = %invitation.id, "Invitation mail failed");
            AppError::Mail(e)
        })
    }
}

fn compose_invitation_mail(
    invitation: &Invitation,
    tenant: &Tenant,
    inviter: &User,
    accept_url: &str,
    from: &str,
) -> OutgoingMail {
    let inviter_name = match inviter.full_name() {
        name if name.is_empty() => inviter.email.clone(),
        name => name,
    };

    let body = format!(
        "Hello,\n\n\
         You have been invited to join {tenant} by {inviter}.\n\n\
         To accept this invitation, please click the following link:\n\
         {url}\n\n\
         This invitation will expire in {days} days.\n\n\
         Best regards,\n\
         The Team\n",
        tenant = tenant.name,
        inviter = inviter_name,
        url = accept_url,
        days = invitation.days_until_expiry(Utc::now()),
    );

    OutgoingMail {
        from: from.to_string(),
        to: vec![invitation.email.clone()],
        subject: format!("Invitation to join {}", tenant.name),
        body,
    }
}
