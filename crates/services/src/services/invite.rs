use std::sync::Arc;

use chrono::Duration;
use db::{
    DbPool, TransactionTrait,
    models::{
        invite::{CreateInvite, Invite},
        project::Project,
        project_member::ProjectMember,
    },
    types::ProjectRole,
};
use uuid::Uuid;

use super::{
    access::{authorize, role_facts},
    actor::Actor,
    clock::Clock,
    error::{Result, ServiceError},
    policy::Action,
    token::TokenGenerator,
};

pub const DEFAULT_INVITE_TTL_DAYS: i64 = 7;

/// Email invitations to join a project as a Member.
///
/// An invite is `Pending` until accepted, then `Accepted` for good. Expiry
/// is never stored: an invite is live while `expires_at > now`, checked the
/// same way by the inbox and by acceptance.
#[derive(Clone)]
pub struct InviteService {
    clock: Arc<dyn Clock>,
    tokens: Arc<dyn TokenGenerator>,
    ttl: Duration,
}

impl InviteService {
    pub fn new(clock: Arc<dyn Clock>, tokens: Arc<dyn TokenGenerator>) -> Self {
        Self {
            clock,
            tokens,
            ttl: Duration::days(DEFAULT_INVITE_TTL_DAYS),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Issues a pending invite and returns it; the token is what gets sent
    /// to the invitee.
    pub async fn send_invite(
        &self,
        pool: &DbPool,
        actor: &Actor,
        project_id: Uuid,
        email: &str,
    ) -> Result<Invite> {
        let email = email.trim();
        if email.is_empty() {
            return Err(ServiceError::invalid("Email is required"));
        }
        if !email.contains('@') {
            return Err(ServiceError::invalid("Email address is not valid"));
        }

        let facts = role_facts(pool, actor, project_id, None).await?;
        authorize(Action::SendInvite, &facts, actor)?;
        if !Project::exists(pool, project_id).await? {
            return Err(ServiceError::not_found("Project"));
        }

        let now = self.clock.now();
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| ServiceError::invalid("Invite lifetime is out of range"))?;
        let invite = Invite::create(
            pool,
            &CreateInvite {
                project_id,
                invited_email: email.to_string(),
                invited_by_user_id: actor.user_id,
                token: self.tokens.generate(),
                expires_at,
            },
            Uuid::new_v4(),
            now,
        )
        .await?;
        tracing::info!(
            invite_id = %invite.id,
            %project_id,
            invited_by = %actor.user_id,
            "Invite sent"
        );
        Ok(invite)
    }

    /// Pending, unexpired invites for `email`, newest first.
    pub async fn get_inbox(&self, pool: &DbPool, email: &str) -> Result<Vec<Invite>> {
        let email = email.trim();
        if email.is_empty() {
            return Ok(Vec::new());
        }
        let now = self.clock.now();
        let invites = Invite::find_pending_by_email(pool, email).await?;
        Ok(invites
            .into_iter()
            .filter(|invite| !invite.is_expired(now))
            .collect())
    }

    /// Redeems `token` for `user_id`. Unknown, already accepted and expired
    /// tokens yield `false`. The membership insert and the status flip
    /// commit together.
    pub async fn accept(&self, pool: &DbPool, token: &str, user_id: Uuid) -> Result<bool> {
        let token = token.trim();
        if token.is_empty() {
            return Ok(false);
        }
        let now = self.clock.now();

        let tx = pool.begin().await?;
        let Some(invite) = Invite::find_by_token(&tx, token).await? else {
            return Ok(false);
        };
        if !invite.is_claimable(now) {
            tracing::debug!(invite_id = %invite.id, status = %invite.status, "Invite not claimable");
            return Ok(false);
        }

        ProjectMember::create_if_missing(&tx, invite.project_id, user_id, ProjectRole::Member, now)
            .await?;
        if !Invite::mark_accepted(&tx, invite.id).await? {
            return Ok(false);
        }
        tx.commit().await?;

        tracing::info!(
            invite_id = %invite.id,
            project_id = %invite.project_id,
            %user_id,
            "Invite accepted"
        );
        Ok(true)
    }
}
