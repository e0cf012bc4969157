use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect};
use uuid::Uuid;

use crate::entities::{board, card, column, label, project};

pub async fn project_id_by_uuid<C: ConnectionTrait>(
    db: &C,
    uuid: Uuid,
) -> Result<Option<i64>, DbErr> {
    project::Entity::find()
        .select_only()
        .column(project::Column::Id)
        .filter(project::Column::Uuid.eq(uuid))
        .into_tuple()
        .one(db)
        .await
}

pub async fn project_uuid_by_id<C: ConnectionTrait>(
    db: &C,
    id: i64,
) -> Result<Option<Uuid>, DbErr> {
    project::Entity::find()
        .select_only()
        .column(project::Column::Uuid)
        .filter(project::Column::Id.eq(id))
        .into_tuple()
        .one(db)
        .await
}

pub async fn board_id_by_uuid<C: ConnectionTrait>(
    db: &C,
    uuid: Uuid,
) -> Result<Option<i64>, DbErr> {
    board::Entity::find()
        .select_only()
        .column(board::Column::Id)
        .filter(board::Column::Uuid.eq(uuid))
        .into_tuple()
        .one(db)
        .await
}

pub async fn board_uuid_by_id<C: ConnectionTrait>(
    db: &C,
    id: i64,
) -> Result<Option<Uuid>, DbErr> {
    board::Entity::find()
        .select_only()
        .column(board::Column::Uuid)
        .filter(board::Column::Id.eq(id))
        .into_tuple()
        .one(db)
        .await
}

pub async fn column_id_by_uuid<C: ConnectionTrait>(
    db: &C,
    uuid: Uuid,
) -> Result<Option<i64>, DbErr> {
    column::Entity::find()
        .select_only()
        .column(column::Column::Id)
        .filter(column::Column::Uuid.eq(uuid))
        .into_tuple()
        .one(db)
        .await
}

pub async fn column_uuid_by_id<C: ConnectionTrait>(
    db: &C,
    id: i64,
) -> Result<Option<Uuid>, DbErr> {
    column::Entity::find()
        .select_only()
        .column(column::Column::Uuid)
        .filter(column::Column::Id.eq(id))
        .into_tuple()
        .one(db)
        .await
}

pub async fn card_id_by_uuid<C: ConnectionTrait>(
    db: &C,
    uuid: Uuid,
) -> Result<Option<i64>, DbErr> {
    card::Entity::find()
        .select_only()
        .column(card::Column::Id)
        .filter(card::Column::Uuid.eq(uuid))
        .into_tuple()
        .one(db)
        .await
}

pub async fn label_id_by_uuid<C: ConnectionTrait>(
    db: &C,
    uuid: Uuid,
) -> Result<Option<i64>, DbErr> {
    label::Entity::find()
        .select_only()
        .column(label::Column::Id)
        .filter(label::Column::Uuid.eq(uuid))
        .into_tuple()
        .one(db)
        .await
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;

    use crate::models::{
        board::{Board, CreateBoard},
        project::{CreateProject, Project},
        user::{CreateUser, User},
    };

    use super::*;

    async fn setup_db() -> sea_orm::DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db_migration::Migrator::up(&db, None).await.unwrap();
        db
    }

    #[tokio::test]
    async fn ids_roundtrip_and_uuid_resolution() {
        let db = setup_db().await;
        let now = Utc::now();

        let owner = User::create(
            &db,
            &CreateUser {
                email: "owner@example.com".to_string(),
                display_name: None,
            },
            Uuid::new_v4(),
            now,
        )
        .await
        .unwrap();

        let project_id = Uuid::new_v4();
        Project::create(
            &db,
            &CreateProject {
                name: "Roadmap".to_string(),
                description: None,
            },
            project_id,
            owner.id,
            now,
        )
        .await
        .unwrap();

        let project_row_id = project_id_by_uuid(&db, project_id)
            .await
            .unwrap()
            .expect("project row id");
        assert_eq!(
            project_uuid_by_id(&db, project_row_id).await.unwrap(),
            Some(project_id)
        );

        let board_id = Uuid::new_v4();
        let board = Board::create(
            &db,
            &CreateBoard {
                name: "Sprint".to_string(),
                is_private: false,
            },
            board_id,
            project_id,
            now,
        )
        .await
        .unwrap();
        assert_eq!(board.project_id, project_id);

        let board_row_id = board_id_by_uuid(&db, board_id)
            .await
            .unwrap()
            .expect("board row id");
        assert_eq!(
            board_uuid_by_id(&db, board_row_id).await.unwrap(),
            Some(board_id)
        );
        assert_eq!(board_id_by_uuid(&db, Uuid::new_v4()).await.unwrap(), None);
    }
}
