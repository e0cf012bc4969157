use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set, sea_query::Expr,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ids;
use crate::{entities::invite, types::InviteStatus};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Invite {
    pub id: Uuid,
    pub project_id: Uuid,
    pub invited_email: String,
    pub invited_by_user_id: Uuid,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub status: InviteStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateInvite {
    pub project_id: Uuid,
    pub invited_email: String,
    pub invited_by_user_id: Uuid,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl Invite {
    async fn from_model<C: ConnectionTrait>(db: &C, model: invite::Model) -> Result<Self, DbErr> {
        let project_id = ids::project_uuid_by_id(db, model.project_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Project not found".to_string()))?;
        Ok(Self {
            id: model.uuid,
            project_id,
            invited_email: model.invited_email,
            invited_by_user_id: model.invited_by_user_id,
            token: model.token,
            expires_at: model.expires_at.into(),
            status: model.status,
            created_at: model.created_at.into(),
        })
    }

    /// Expiry is derived, never stored: an invite is live only while
    /// `expires_at > now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Pending and not yet expired.
    pub fn is_claimable(&self, now: DateTime<Utc>) -> bool {
        self.status == InviteStatus::Pending && !self.is_expired(now)
    }

    pub async fn find_by_token<C: ConnectionTrait>(
        db: &C,
        token: &str,
    ) -> Result<Option<Self>, DbErr> {
        let record = invite::Entity::find()
            .filter(invite::Column::Token.eq(token))
            .one(db)
            .await?;
        match record {
            Some(model) => Ok(Some(Self::from_model(db, model).await?)),
            None => Ok(None),
        }
    }

    /// Pending invites addressed to `email`, newest first. Expired rows are
    /// included; callers filter them with [`Invite::is_expired`].
    pub async fn find_pending_by_email<C: ConnectionTrait>(
        db: &C,
        email: &str,
    ) -> Result<Vec<Self>, DbErr> {
        let records = invite::Entity::find()
            .filter(invite::Column::InvitedEmail.eq(email))
            .filter(invite::Column::Status.eq(InviteStatus::Pending))
            .order_by_desc(invite::Column::CreatedAt)
            .order_by_desc(invite::Column::Id)
            .all(db)
            .await?;
        let mut invites = Vec::with_capacity(records.len());
        for model in records {
            invites.push(Self::from_model(db, model).await?);
        }
        Ok(invites)
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreateInvite,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Self, DbErr> {
        let project_row_id = ids::project_id_by_uuid(db, data.project_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Project not found".to_string()))?;
        let active = invite::ActiveModel {
            uuid: Set(id),
            project_id: Set(project_row_id),
            invited_email: Set(data.invited_email.clone()),
            invited_by_user_id: Set(data.invited_by_user_id),
            token: Set(data.token.clone()),
            expires_at: Set(data.expires_at.into()),
            status: Set(InviteStatus::Pending),
            created_at: Set(now.into()),
            ..Default::default()
        };
        let model = active.insert(db).await?;
        Self::from_model(db, model).await
    }

    /// Flips a pending invite to accepted. Returns `false` if the invite was
    /// no longer pending, so only one claimant can win.
    pub async fn mark_accepted<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<bool, DbErr> {
        let result = invite::Entity::update_many()
            .col_expr(invite::Column::Status, Expr::value(InviteStatus::Accepted))
            .filter(invite::Column::Uuid.eq(id))
            .filter(invite::Column::Status.eq(InviteStatus::Pending))
            .exec(db)
            .await?;
        Ok(result.rows_affected == 1)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn invite(status: InviteStatus, expires_at: DateTime<Utc>) -> Invite {
        Invite {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            invited_email: "new@example.com".to_string(),
            invited_by_user_id: Uuid::new_v4(),
            token: "token".to_string(),
            expires_at,
            status,
            created_at: expires_at - Duration::days(7),
        }
    }

    #[test]
    fn invites_expire_at_expires_at() {
        let now = Utc::now();
        let pending = invite(InviteStatus::Pending, now);
        assert!(!pending.is_expired(now - Duration::seconds(1)));
        assert!(pending.is_claimable(now - Duration::seconds(1)));
        assert!(pending.is_expired(now));
        assert!(!pending.is_claimable(now));
    }

    #[test]
    fn accepted_invites_are_never_claimable() {
        let now = Utc::now();
        let accepted = invite(InviteStatus::Accepted, now + Duration::days(1));
        assert!(!accepted.is_claimable(now));
    }
}
