use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ids;
use crate::entities::{card_label, label};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Label {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateLabel {
    pub name: String,
    #[serde(default)]
    pub color: String,
}

impl Label {
    fn from_model(project_id: Uuid, model: label::Model) -> Self {
        Self {
            id: model.uuid,
            project_id,
            name: model.name,
            color: model.color,
        }
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Self>, DbErr> {
        let Some(record) = label::Entity::find()
            .filter(label::Column::Uuid.eq(id))
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

    pub async fn find_by_card_id<C: ConnectionTrait>(
        db: &C,
        card_id: Uuid,
    ) -> Result<Vec<Self>, DbErr> {
        let Some(card_row_id) = ids::card_id_by_uuid(db, card_id).await? else {
            return Ok(Vec::new());
        };
        let label_ids: Vec<i64> = card_label::Entity::find()
            .select_only()
            .column(card_label::Column::LabelId)
            .filter(card_label::Column::CardId.eq(card_row_id))
            .into_tuple()
            .all(db)
            .await?;
        if label_ids.is_empty() {
            return Ok(Vec::new());
        }

        let records = label::Entity::find()
            .filter(label::Column::Id.is_in(label_ids))
            .order_by_asc(label::Column::Name)
            .all(db)
            .await?;
        let mut labels = Vec::with_capacity(records.len());
        for record in records {
            let project_id = ids::project_uuid_by_id(db, record.project_id)
                .await?
                .ok_or(DbErr::RecordNotFound("Project not found".to_string()))?;
            labels.push(Self::from_model(project_id, record));
        }
        Ok(labels)
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        project_id: Uuid,
        data: &CreateLabel,
        id: Uuid,
    ) -> Result<Self, DbErr> {
        let project_row_id = ids::project_id_by_uuid(db, project_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Project not found".to_string()))?;
        let active = label::ActiveModel {
            uuid: Set(id),
            project_id: Set(project_row_id),
            name: Set(data.name.clone()),
            color: Set(data.color.clone()),
            ..Default::default()
        };
        let model = active.insert(db).await?;
        Ok(Self::from_model(project_id, model))
    }

    /// Attaches the label to the card. Returns `false` when it was already
    /// attached.
    pub async fn attach<C: ConnectionTrait>(
        db: &C,
        card_id: Uuid,
        label_id: Uuid,
    ) -> Result<bool, DbErr> {
        let (card_row_id, label_row_id) = Self::row_ids(db, card_id, label_id).await?;
        let existing = card_label::Entity::find()
            .filter(card_label::Column::CardId.eq(card_row_id))
            .filter(card_label::Column::LabelId.eq(label_row_id))
            .one(db)
            .await?;
        if existing.is_some() {
            return Ok(false);
        }

        let active = card_label::ActiveModel {
            card_id: Set(card_row_id),
            label_id: Set(label_row_id),
            ..Default::default()
        };
        active.insert(db).await?;
        Ok(true)
    }

    pub async fn detach<C: ConnectionTrait>(
        db: &C,
        card_id: Uuid,
        label_id: Uuid,
    ) -> Result<u64, DbErr> {
        let (card_row_id, label_row_id) = Self::row_ids(db, card_id, label_id).await?;
        let result = card_label::Entity::delete_many()
            .filter(card_label::Column::CardId.eq(card_row_id))
            .filter(card_label::Column::LabelId.eq(label_row_id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn attachment_count<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<u64, DbErr> {
        let Some(label_row_id) = ids::label_id_by_uuid(db, id).await? else {
            return Ok(0);
        };
        card_label::Entity::find()
            .filter(card_label::Column::LabelId.eq(label_row_id))
            .count(db)
            .await
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<u64, DbErr> {
        let result = label::Entity::delete_many()
            .filter(label::Column::Uuid.eq(id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }

    async fn row_ids<C: ConnectionTrait>(
        db: &C,
        card_id: Uuid,
        label_id: Uuid,
    ) -> Result<(i64, i64), DbErr> {
        let card_row_id = ids::card_id_by_uuid(db, card_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Card not found".to_string()))?;
        let label_row_id = ids::label_id_by_uuid(db, label_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Label not found".to_string()))?;
        Ok((card_row_id, label_row_id))
    }
}
