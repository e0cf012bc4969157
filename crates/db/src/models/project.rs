use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{project, project_member};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProject {
    pub name: String,
    pub description: Option<String>,
}

/// Lightweight `{id, name}` pair used for project pickers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectOption {
    pub id: Uuid,
    pub name: String,
}

impl Project {
    fn from_model(model: project::Model) -> Self {
        Self {
            id: model.uuid,
            name: model.name,
            description: model.description,
            owner_id: model.owner_id,
            created_at: model.created_at.into(),
        }
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Self>, DbErr> {
        let record = project::Entity::find()
            .filter(project::Column::Uuid.eq(id))
            .one(db)
            .await?;
        Ok(record.map(Self::from_model))
    }

    pub async fn exists<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<bool, DbErr> {
        Ok(super::ids::project_id_by_uuid(db, id).await?.is_some())
    }

    /// Every project `user_id` belongs to, one entry per project, sorted by
    /// name with a stable ordinal (case-sensitive) comparison.
    pub async fn find_options_for_member<C: ConnectionTrait>(
        db: &C,
        user_id: Uuid,
    ) -> Result<Vec<ProjectOption>, DbErr> {
        let project_ids: Vec<i64> = project_member::Entity::find()
            .select_only()
            .column(project_member::Column::ProjectId)
            .filter(project_member::Column::UserId.eq(user_id))
            .distinct()
            .into_tuple()
            .all(db)
            .await?;
        if project_ids.is_empty() {
            return Ok(Vec::new());
        }

        let records = project::Entity::find()
            .filter(project::Column::Id.is_in(project_ids))
            .order_by_asc(project::Column::Id)
            .all(db)
            .await?;
        let mut options: Vec<ProjectOption> = records
            .into_iter()
            .map(|model| ProjectOption {
                id: model.uuid,
                name: model.name,
            })
            .collect();
        options.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(options)
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreateProject,
        id: Uuid,
        owner_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Self, DbErr> {
        let active = project::ActiveModel {
            uuid: Set(id),
            name: Set(data.name.clone()),
            description: Set(data.description.clone()),
            owner_id: Set(owner_id),
            created_at: Set(now.into()),
            ..Default::default()
        };
        let model = active.insert(db).await?;
        Ok(Self::from_model(model))
    }
}
