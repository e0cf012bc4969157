use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use super::ids;
use crate::{entities::board_member, types::BoardRole};

pub struct BoardMember;

impl BoardMember {
    pub async fn find_role<C: ConnectionTrait>(
        db: &C,
        board_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<BoardRole>, DbErr> {
        let Some(board_row_id) = ids::board_id_by_uuid(db, board_id).await? else {
            return Ok(None);
        };
        let record = board_member::Entity::find()
            .filter(board_member::Column::BoardId.eq(board_row_id))
            .filter(board_member::Column::UserId.eq(user_id))
            .one(db)
            .await?;
        Ok(record.map(|model| model.role))
    }

    /// Adds the user to the board with `role` unless they already hold a
    /// board role. Returns whether a row was inserted.
    pub async fn create_if_missing<C: ConnectionTrait>(
        db: &C,
        board_id: Uuid,
        user_id: Uuid,
        role: BoardRole,
        now: DateTime<Utc>,
    ) -> Result<bool, DbErr> {
        let board_row_id = ids::board_id_by_uuid(db, board_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Board not found".to_string()))?;
        let existing = board_member::Entity::find()
            .filter(board_member::Column::BoardId.eq(board_row_id))
            .filter(board_member::Column::UserId.eq(user_id))
            .one(db)
            .await?;
        if existing.is_some() {
            return Ok(false);
        }

        let active = board_member::ActiveModel {
            board_id: Set(board_row_id),
            user_id: Set(user_id),
            role: Set(role),
            assigned_at: Set(now.into()),
            ..Default::default()
        };
        active.insert(db).await?;
        Ok(true)
    }
}
