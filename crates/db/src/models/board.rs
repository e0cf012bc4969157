use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ids;
use crate::entities::{board, board_member, card, card_label, column, comment};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Board {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub is_private: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBoard {
    pub name: String,
    #[serde(default)]
    pub is_private: bool,
}

impl Board {
    fn from_model(project_id: Uuid, model: board::Model) -> Self {
        Self {
            id: model.uuid,
            project_id,
            name: model.name,
            is_private: model.is_private,
            created_at: model.created_at.into(),
        }
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Self>, DbErr> {
        let Some(record) = board::Entity::find()
            .filter(board::Column::Uuid.eq(id))
            .one(db)
            .await?
        else {
            return Ok(None);
        };
        let project_id = ids::project_uuid_by_id(db, record.project_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Project not found".to_string()))?;
        Ok(Some(Self::from_model(project_id, record)))
    }

    pub async fn find_by_project_id<C: ConnectionTrait>(
        db: &C,
        project_id: Uuid,
    ) -> Result<Vec<Self>, DbErr> {
        let Some(project_row_id) = ids::project_id_by_uuid(db, project_id).await? else {
            return Ok(Vec::new());
        };
        let records = board::Entity::find()
            .filter(board::Column::ProjectId.eq(project_row_id))
            .order_by_asc(board::Column::CreatedAt)
            .order_by_asc(board::Column::Id)
            .all(db)
            .await?;
        Ok(records
            .into_iter()
            .map(|model| Self::from_model(project_id, model))
            .collect())
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreateBoard,
        id: Uuid,
        project_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Self, DbErr> {
        let project_row_id = ids::project_id_by_uuid(db, project_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Project not found".to_string()))?;
        let active = board::ActiveModel {
            uuid: Set(id),
            project_id: Set(project_row_id),
            name: Set(data.name.clone()),
            is_private: Set(data.is_private),
            created_at: Set(now.into()),
            ..Default::default()
        };
        let model = active.insert(db).await?;
        Ok(Self::from_model(project_id, model))
    }

    /// Removes the board and everything beneath it, leaves first: card
    /// labels, comments, cards, columns, board members, then the board row.
    /// Run inside a transaction so a failure leaves the board intact.
    pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<u64, DbErr> {
        let Some(board_row_id) = ids::board_id_by_uuid(db, id).await? else {
            return Ok(0);
        };

        let card_ids: Vec<i64> = card::Entity::find()
            .select_only()
            .column(card::Column::Id)
            .filter(card::Column::BoardId.eq(board_row_id))
            .into_tuple()
            .all(db)
            .await?;
        if !card_ids.is_empty() {
            card_label::Entity::delete_many()
                .filter(card_label::Column::CardId.is_in(card_ids.clone()))
                .exec(db)
                .await?;
            comment::Entity::delete_many()
                .filter(comment::Column::CardId.is_in(card_ids))
                .exec(db)
                .await?;
        }
        card::Entity::delete_many()
            .filter(card::Column::BoardId.eq(board_row_id))
            .exec(db)
            .await?;
        column::Entity::delete_many()
            .filter(column::Column::BoardId.eq(board_row_id))
            .exec(db)
            .await?;
        board_member::Entity::delete_many()
            .filter(board_member::Column::BoardId.eq(board_row_id))
            .exec(db)
            .await?;
        let result = board::Entity::delete_many()
            .filter(board::Column::Id.eq(board_row_id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }
}
