use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ids;
use crate::entities::daily_update;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyUpdate {
    pub id: Uuid,
    pub project_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl DailyUpdate {
    fn from_model(project_id: Uuid, model: daily_update::Model) -> Self {
        Self {
            id: model.uuid,
            project_id,
            author_id: model.author_id,
            content: model.content,
            created_at: model.created_at.into(),
        }
    }

    pub async fn count_by_project_id<C: ConnectionTrait>(
        db: &C,
        project_id: Uuid,
    ) -> Result<u64, DbErr> {
        let Some(project_row_id) = ids::project_id_by_uuid(db, project_id).await? else {
            return Ok(0);
        };
        daily_update::Entity::find()
            .filter(daily_update::Column::ProjectId.eq(project_row_id))
            .count(db)
            .await
    }

    /// One page of the project's updates, newest first. `page` is 1-based.
    pub async fn find_page_by_project_id<C: ConnectionTrait>(
        db: &C,
        project_id: Uuid,
        page: u64,
        page_size: u64,
    ) -> Result<Vec<Self>, DbErr> {
        let Some(project_row_id) = ids::project_id_by_uuid(db, project_id).await? else {
            return Ok(Vec::new());
        };
        // Stores bind OFFSET as a signed 64-bit integer.
        let offset = page
            .saturating_sub(1)
            .saturating_mul(page_size)
            .min(i64::MAX as u64);
        let records = daily_update::Entity::find()
            .filter(daily_update::Column::ProjectId.eq(project_row_id))
            .order_by_desc(daily_update::Column::CreatedAt)
            .order_by_desc(daily_update::Column::Id)
            .offset(offset)
            .limit(page_size)
            .all(db)
            .await?;
        Ok(records
            .into_iter()
            .map(|model| Self::from_model(project_id, model))
            .collect())
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        project_id: Uuid,
        author_id: Uuid,
        content: &str,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Self, DbErr> {
        let project_row_id = ids::project_id_by_uuid(db, project_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Project not found".to_string()))?;
        let active = daily_update::ActiveModel {
            uuid: Set(id),
            project_id: Set(project_row_id),
            author_id: Set(author_id),
            content: Set(content.to_string()),
            created_at: Set(now.into()),
            ..Default::default()
        };
        let model = active.insert(db).await?;
        Ok(Self::from_model(project_id, model))
    }
}
