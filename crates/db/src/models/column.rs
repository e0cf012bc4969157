use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ids;
use crate::entities::column;

/// A board column. `order` positions it left to right; values need not be
/// unique or contiguous.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Column {
    pub id: Uuid,
    pub board_id: Uuid,
    pub name: String,
    pub order: i32,
}

impl Column {
    fn from_model(board_id: Uuid, model: column::Model) -> Self {
        Self {
            id: model.uuid,
            board_id,
            name: model.name,
            order: model.sort_order,
        }
    }

    pub async fn find_by_board_id<C: ConnectionTrait>(
        db: &C,
        board_id: Uuid,
    ) -> Result<Vec<Self>, DbErr> {
        let Some(board_row_id) = ids::board_id_by_uuid(db, board_id).await? else {
            return Ok(Vec::new());
        };
        let records = column::Entity::find()
            .filter(column::Column::BoardId.eq(board_row_id))
            .order_by_asc(column::Column::SortOrder)
            .order_by_asc(column::Column::Id)
            .all(db)
            .await?;
        Ok(records
            .into_iter()
            .map(|model| Self::from_model(board_id, model))
            .collect())
    }

    /// Whether `column_id` exists and sits on `board_id`.
    pub async fn belongs_to_board<C: ConnectionTrait>(
        db: &C,
        column_id: Uuid,
        board_id: Uuid,
    ) -> Result<bool, DbErr> {
        let Some(board_row_id) = ids::board_id_by_uuid(db, board_id).await? else {
            return Ok(false);
        };
        let record = column::Entity::find()
            .filter(column::Column::Uuid.eq(column_id))
            .filter(column::Column::BoardId.eq(board_row_id))
            .one(db)
            .await?;
        Ok(record.is_some())
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        board_id: Uuid,
        name: &str,
        order: i32,
        id: Uuid,
    ) -> Result<Self, DbErr> {
        let board_row_id = ids::board_id_by_uuid(db, board_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Board not found".to_string()))?;
        let active = column::ActiveModel {
            uuid: Set(id),
            board_id: Set(board_row_id),
            name: Set(name.to_string()),
            sort_order: Set(order),
            ..Default::default()
        };
        let model = active.insert(db).await?;
        Ok(Self::from_model(board_id, model))
    }
}
