use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Select, Set, sea_query::Expr,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ids, user::User};
use crate::{entities::project_member, types::ProjectRole};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectMember {
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub role: ProjectRole,
    pub joined_at: DateTime<Utc>,
}

/// Membership joined with the member's account, for member lists and
/// assignee pickers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectMemberWithUser {
    pub user_id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub role: ProjectRole,
    pub joined_at: DateTime<Utc>,
}

impl ProjectMember {
    fn from_model(project_id: Uuid, model: project_member::Model) -> Self {
        Self {
            project_id,
            user_id: model.user_id,
            role: model.role,
            joined_at: model.joined_at.into(),
        }
    }

    async fn project_row_id<C: ConnectionTrait>(db: &C, project_id: Uuid) -> Result<i64, DbErr> {
        ids::project_id_by_uuid(db, project_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Project not found".to_string()))
    }

    pub async fn find<C: ConnectionTrait>(
        db: &C,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, DbErr> {
        let Some(project_row_id) = ids::project_id_by_uuid(db, project_id).await? else {
            return Ok(None);
        };
        let record = project_member::Entity::find()
            .filter(project_member::Column::ProjectId.eq(project_row_id))
            .filter(project_member::Column::UserId.eq(user_id))
            .one(db)
            .await?;
        Ok(record.map(|model| Self::from_model(project_id, model)))
    }

    /// The user's role in the project, or `None` when they are not a member
    /// (or the project does not exist).
    pub async fn find_role<C: ConnectionTrait>(
        db: &C,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ProjectRole>, DbErr> {
        Ok(Self::find(db, project_id, user_id)
            .await?
            .map(|member| member.role))
    }

    pub async fn find_by_project_id_with_users<C: ConnectionTrait>(
        db: &C,
        project_id: Uuid,
    ) -> Result<Vec<ProjectMemberWithUser>, DbErr> {
        let Some(project_row_id) = ids::project_id_by_uuid(db, project_id).await? else {
            return Ok(Vec::new());
        };
        let members = project_member::Entity::find()
            .filter(project_member::Column::ProjectId.eq(project_row_id))
            .order_by_asc(project_member::Column::Id)
            .all(db)
            .await?;

        let user_ids: Vec<Uuid> = members.iter().map(|member| member.user_id).collect();
        let users: HashMap<Uuid, User> = User::find_by_ids(db, &user_ids)
            .await?
            .into_iter()
            .map(|user| (user.id, user))
            .collect();

        Ok(members
            .into_iter()
            .filter_map(|member| {
                let user = users.get(&member.user_id)?;
                Some(ProjectMemberWithUser {
                    user_id: member.user_id,
                    email: user.email.clone(),
                    display_name: user.display_name.clone(),
                    role: member.role,
                    joined_at: member.joined_at.into(),
                })
            })
            .collect())
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        project_id: Uuid,
        user_id: Uuid,
        role: ProjectRole,
        now: DateTime<Utc>,
    ) -> Result<Self, DbErr> {
        let project_row_id = Self::project_row_id(db, project_id).await?;
        let active = project_member::ActiveModel {
            project_id: Set(project_row_id),
            user_id: Set(user_id),
            role: Set(role),
            joined_at: Set(now.into()),
            ..Default::default()
        };
        let model = active.insert(db).await?;
        Ok(Self::from_model(project_id, model))
    }

    /// Inserts the membership unless one already exists. Returns whether a
    /// row was inserted; an existing role is left untouched.
    pub async fn create_if_missing<C: ConnectionTrait>(
        db: &C,
        project_id: Uuid,
        user_id: Uuid,
        role: ProjectRole,
        now: DateTime<Utc>,
    ) -> Result<bool, DbErr> {
        if Self::find(db, project_id, user_id).await?.is_some() {
            return Ok(false);
        }
        Self::create(db, project_id, user_id, role, now).await?;
        Ok(true)
    }

    pub async fn update_role<C: ConnectionTrait>(
        db: &C,
        project_id: Uuid,
        user_id: Uuid,
        role: ProjectRole,
    ) -> Result<u64, DbErr> {
        let project_row_id = Self::project_row_id(db, project_id).await?;
        let result = project_member::Entity::update_many()
            .col_expr(project_member::Column::Role, Expr::value(role))
            .filter(project_member::Column::ProjectId.eq(project_row_id))
            .filter(project_member::Column::UserId.eq(user_id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }

    /// Every Owner row of a project, row-locked (`FOR UPDATE`) on backends
    /// that support it, in primary-key order.
    fn owners_for_update(project_row_id: i64) -> Select<project_member::Entity> {
        project_member::Entity::find()
            .filter(project_member::Column::ProjectId.eq(project_row_id))
            .filter(project_member::Column::Role.eq(ProjectRole::Owner))
            .order_by_asc(project_member::Column::Id)
            .lock_exclusive()
    }

    /// Number of owners in the project other than `user_id`. All owner rows
    /// stay locked until the caller's transaction ends, so concurrent
    /// demotions in the same project are serialized.
    pub async fn count_owners_excluding<C: ConnectionTrait>(
        db: &C,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<u64, DbErr> {
        let project_row_id = Self::project_row_id(db, project_id).await?;
        let owners = Self::owners_for_update(project_row_id).all(db).await?;
        Ok(owners.iter().filter(|owner| owner.user_id != user_id).count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{Database, DbBackend, QueryTrait};
    use sea_orm_migration::MigratorTrait;

    use super::*;
    use crate::models::{
        project::{CreateProject, Project},
        user::CreateUser,
    };

    async fn setup_db() -> sea_orm::DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db_migration::Migrator::up(&db, None).await.unwrap();
        db
    }

    async fn user(db: &sea_orm::DatabaseConnection, email: &str) -> Uuid {
        User::create(
            db,
            &CreateUser {
                email: email.to_string(),
                display_name: None,
            },
            Uuid::new_v4(),
            Utc::now(),
        )
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn membership_roles_and_owner_counts() {
        let db = setup_db().await;
        let now = Utc::now();
        let owner = user(&db, "owner@example.com").await;
        let admin = user(&db, "admin@example.com").await;
        let project_id = Uuid::new_v4();
        Project::create(
            &db,
            &CreateProject {
                name: "Roadmap".to_string(),
                description: None,
            },
            project_id,
            owner,
            now,
        )
        .await
        .unwrap();

        ProjectMember::create(&db, project_id, owner, ProjectRole::Owner, now)
            .await
            .unwrap();
        assert!(
            ProjectMember::create_if_missing(&db, project_id, admin, ProjectRole::Admin, now)
                .await
                .unwrap()
        );
        assert!(
            !ProjectMember::create_if_missing(&db, project_id, admin, ProjectRole::Member, now)
                .await
                .unwrap()
        );
        assert_eq!(
            ProjectMember::find_role(&db, project_id, admin).await.unwrap(),
            Some(ProjectRole::Admin)
        );
        assert_eq!(
            ProjectMember::count_owners_excluding(&db, project_id, owner)
                .await
                .unwrap(),
            0
        );

        ProjectMember::update_role(&db, project_id, admin, ProjectRole::Owner)
            .await
            .unwrap();
        assert_eq!(
            ProjectMember::count_owners_excluding(&db, project_id, owner)
                .await
                .unwrap(),
            1
        );

        let members = ProjectMember::find_by_project_id_with_users(&db, project_id)
            .await
            .unwrap();
        let emails: Vec<&str> = members.iter().map(|m| m.email.as_str()).collect();
        assert_eq!(emails, vec!["owner@example.com", "admin@example.com"]);
    }

    #[test]
    fn owner_rows_are_locked_on_postgres() {
        let sql = ProjectMember::owners_for_update(1)
            .build(DbBackend::Postgres)
            .to_string();
        assert!(sql.ends_with("FOR UPDATE"), "{sql}");
        assert!(!sql.contains("COUNT"), "{sql}");

        let sql = ProjectMember::owners_for_update(1)
            .build(DbBackend::Sqlite)
            .to_string();
        assert!(!sql.contains("FOR UPDATE"), "{sql}");
    }

    #[tokio::test]
    async fn role_lookup_on_unknown_project_is_none() {
        let db = setup_db().await;
        assert_eq!(
            ProjectMember::find_role(&db, Uuid::new_v4(), Uuid::new_v4())
                .await
                .unwrap(),
            None
        );
    }
}
