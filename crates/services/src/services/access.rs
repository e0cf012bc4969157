use db::{
    ConnectionTrait, DbErr,
    models::{board_member::BoardMember, project_member::ProjectMember},
};
use uuid::Uuid;

use super::{
    actor::Actor,
    error::{Result, ServiceError},
    policy::{self, Action, RoleFacts},
};

/// Reads the actor's current project role, and board role when `board_id`
/// is given.
pub async fn role_facts<C: ConnectionTrait>(
    db: &C,
    actor: &Actor,
    project_id: Uuid,
    board_id: Option<Uuid>,
) -> std::result::Result<RoleFacts, DbErr> {
    let project_role = ProjectMember::find_role(db, project_id, actor.user_id).await?;
    let board_role = match board_id {
        Some(board_id) => BoardMember::find_role(db, board_id, actor.user_id).await?,
        None => None,
    };
    Ok(RoleFacts {
        is_platform_admin: actor.is_platform_admin,
        project_role,
        board_role,
    })
}

pub fn authorize(action: Action, facts: &RoleFacts, actor: &Actor) -> Result<()> {
    if policy::is_allowed(action, facts) {
        return Ok(());
    }
    tracing::debug!(
        user_id = %actor.user_id,
        %action,
        project_role = ?facts.project_role,
        board_role = ?facts.board_role,
        "authorization denied"
    );
    Err(ServiceError::Forbidden(action.to_string()))
}
