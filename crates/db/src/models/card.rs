use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set, sea_query::Expr,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::ids;
use crate::{
    entities::{card, card_label, column, comment},
    types::CardPriority,
};

#[derive(Debug, Error)]
pub enum CardError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Card not found")]
    NotFound,
    #[error("Card was modified concurrently")]
    Conflict,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Card {
    pub id: Uuid,
    pub board_id: Uuid,
    pub column_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: CardPriority,
    pub assignee_id: Option<Uuid>,
    pub due_date: Option<DateTime<Utc>>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateCard {
    pub board_id: Uuid,
    pub column_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: CardPriority,
    pub assignee_id: Option<Uuid>,
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct UpdateCard {
    pub title: String,
    pub description: Option<String>,
    pub priority: CardPriority,
}

impl Card {
    fn from_parts(board_id: Uuid, column_id: Uuid, model: card::Model) -> Self {
        Self {
            id: model.uuid,
            board_id,
            column_id,
            title: model.title,
            description: model.description,
            priority: model.priority,
            assignee_id: model.assignee_id,
            due_date: model.due_date.map(Into::into),
            version: model.version,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }

    async fn from_model<C: ConnectionTrait>(db: &C, model: card::Model) -> Result<Self, DbErr> {
        let board_id = ids::board_uuid_by_id(db, model.board_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Board not found".to_string()))?;
        let column_id = ids::column_uuid_by_id(db, model.column_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Column not found".to_string()))?;
        Ok(Self::from_parts(board_id, column_id, model))
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Self>, DbErr> {
        let record = card::Entity::find()
            .filter(card::Column::Uuid.eq(id))
            .one(db)
            .await?;
        match record {
            Some(model) => Ok(Some(Self::from_model(db, model).await?)),
            None => Ok(None),
        }
    }

    pub async fn find_by_board_id<C: ConnectionTrait>(
        db: &C,
        board_id: Uuid,
    ) -> Result<Vec<Self>, DbErr> {
        let Some(board_row_id) = ids::board_id_by_uuid(db, board_id).await? else {
            return Ok(Vec::new());
        };
        let column_uuids: HashMap<i64, Uuid> = column::Entity::find()
            .filter(column::Column::BoardId.eq(board_row_id))
            .all(db)
            .await?
            .into_iter()
            .map(|model| (model.id, model.uuid))
            .collect();
        let records = card::Entity::find()
            .filter(card::Column::BoardId.eq(board_row_id))
            .order_by_asc(card::Column::CreatedAt)
            .order_by_asc(card::Column::Id)
            .all(db)
            .await?;

        records
            .into_iter()
            .map(|model| {
                let column_id = column_uuids
                    .get(&model.column_id)
                    .copied()
                    .ok_or(DbErr::RecordNotFound("Column not found".to_string()))?;
                Ok(Self::from_parts(board_id, column_id, model))
            })
            .collect()
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreateCard,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Self, DbErr> {
        let board_row_id = ids::board_id_by_uuid(db, data.board_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Board not found".to_string()))?;
        let column_row_id = ids::column_id_by_uuid(db, data.column_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Column not found".to_string()))?;

        let active = card::ActiveModel {
            uuid: Set(id),
            board_id: Set(board_row_id),
            column_id: Set(column_row_id),
            title: Set(data.title.clone()),
            description: Set(data.description.clone()),
            priority: Set(data.priority),
            assignee_id: Set(data.assignee_id),
            due_date: Set(data.due_date.map(Into::into)),
            version: Set(1),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };
        let model = active.insert(db).await?;
        Ok(Self::from_parts(data.board_id, data.column_id, model))
    }

    /// Applies `changes` only if the stored version still equals
    /// `expected_version`, bumping the version and `updated_at`.
    async fn update_versioned<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        expected_version: i32,
        now: DateTime<Utc>,
        changes: Vec<(card::Column, Expr)>,
    ) -> Result<Self, CardError> {
        let mut update = card::Entity::update_many()
            .col_expr(card::Column::Version, Expr::value(expected_version + 1))
            .col_expr(card::Column::UpdatedAt, Expr::value(now));
        for (column, expr) in changes {
            update = update.col_expr(column, expr);
        }
        let result = update
            .filter(card::Column::Uuid.eq(id))
            .filter(card::Column::Version.eq(expected_version))
            .exec(db)
            .await?;

        if result.rows_affected == 0 {
            return match Self::find_by_id(db, id).await? {
                Some(_) => Err(CardError::Conflict),
                None => Err(CardError::NotFound),
            };
        }
        Self::find_by_id(db, id).await?.ok_or(CardError::NotFound)
    }

    pub async fn move_to_column<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        column_id: Uuid,
        expected_version: i32,
        now: DateTime<Utc>,
    ) -> Result<Self, CardError> {
        let column_row_id = ids::column_id_by_uuid(db, column_id)
            .await?
            .ok_or(DbErr::RecordNotFound("Column not found".to_string()))?;
        Self::update_versioned(
            db,
            id,
            expected_version,
            now,
            vec![(card::Column::ColumnId, Expr::value(column_row_id))],
        )
        .await
    }

    pub async fn set_assignee<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        assignee_id: Option<Uuid>,
        expected_version: i32,
        now: DateTime<Utc>,
    ) -> Result<Self, CardError> {
        Self::update_versioned(
            db,
            id,
            expected_version,
            now,
            vec![(card::Column::AssigneeId, Expr::value(assignee_id))],
        )
        .await
    }

    pub async fn update_content<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        data: &UpdateCard,
        expected_version: i32,
        now: DateTime<Utc>,
    ) -> Result<Self, CardError> {
        Self::update_versioned(
            db,
            id,
            expected_version,
            now,
            vec![
                (card::Column::Title, Expr::value(data.title.clone())),
                (
                    card::Column::Description,
                    Expr::value(data.description.clone()),
                ),
                (card::Column::Priority, Expr::value(data.priority)),
            ],
        )
        .await
    }

    /// Deletes the card with its labels and comments. Only removes the row
    /// when the version still matches.
    pub async fn delete<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        expected_version: i32,
    ) -> Result<(), CardError> {
        let record = card::Entity::find()
            .filter(card::Column::Uuid.eq(id))
            .one(db)
            .await?
            .ok_or(CardError::NotFound)?;
        if record.version != expected_version {
            return Err(CardError::Conflict);
        }

        card_label::Entity::delete_many()
            .filter(card_label::Column::CardId.eq(record.id))
            .exec(db)
            .await?;
        comment::Entity::delete_many()
            .filter(comment::Column::CardId.eq(record.id))
            .exec(db)
            .await?;
        let result = card::Entity::delete_many()
            .filter(card::Column::Id.eq(record.id))
            .filter(card::Column::Version.eq(expected_version))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(CardError::Conflict);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;

    use super::*;
    use crate::models::{
        board::{Board, CreateBoard},
        column::Column,
        project::{CreateProject, Project},
        user::{CreateUser, User},
    };

    async fn setup_db() -> sea_orm::DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db_migration::Migrator::up(&db, None).await.unwrap();
        db
    }

    async fn seed_card(db: &sea_orm::DatabaseConnection) -> (Card, Column, Column) {
        let now = Utc::now();
        let owner = User::create(
            db,
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
            db,
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
        let board = Board::create(
            db,
            &CreateBoard {
                name: "Sprint".to_string(),
                is_private: false,
            },
            Uuid::new_v4(),
            project_id,
            now,
        )
        .await
        .unwrap();
        let todo = Column::create(db, board.id, "To Do", 0, Uuid::new_v4())
            .await
            .unwrap();
        let done = Column::create(db, board.id, "Done", 1, Uuid::new_v4())
            .await
            .unwrap();
        let card = Card::create(
            db,
            &CreateCard {
                board_id: board.id,
                column_id: todo.id,
                title: "Write docs".to_string(),
                description: None,
                priority: CardPriority::High,
                assignee_id: None,
                due_date: None,
            },
            Uuid::new_v4(),
            now,
        )
        .await
        .unwrap();
        (card, todo, done)
    }

    #[tokio::test]
    async fn mutations_bump_the_version() {
        let db = setup_db().await;
        let (card, _, done) = seed_card(&db).await;
        assert_eq!(card.version, 1);

        let moved = Card::move_to_column(&db, card.id, done.id, card.version, Utc::now())
            .await
            .unwrap();
        assert_eq!(moved.column_id, done.id);
        assert_eq!(moved.version, 2);
    }

    #[tokio::test]
    async fn stale_version_is_a_conflict() {
        let db = setup_db().await;
        let (card, todo, done) = seed_card(&db).await;

        Card::move_to_column(&db, card.id, done.id, card.version, Utc::now())
            .await
            .unwrap();
        let stale = Card::move_to_column(&db, card.id, todo.id, card.version, Utc::now()).await;
        assert!(matches!(stale, Err(CardError::Conflict)));

        let current = Card::find_by_id(&db, card.id).await.unwrap().unwrap();
        assert_eq!(current.column_id, done.id);
    }

    #[tokio::test]
    async fn missing_card_is_not_a_conflict() {
        let db = setup_db().await;
        let result = Card::set_assignee(&db, Uuid::new_v4(), None, 1, Utc::now()).await;
        assert!(matches!(result, Err(CardError::NotFound)));
    }

    #[tokio::test]
    async fn deleting_a_board_removes_its_cards() {
        let db = setup_db().await;
        let (card, _, _) = seed_card(&db).await;

        assert_eq!(Board::delete(&db, card.board_id).await.unwrap(), 1);
        assert!(Card::find_by_id(&db, card.id).await.unwrap().is_none());
        assert!(Column::find_by_board_id(&db, card.board_id)
            .await
            .unwrap()
            .is_empty());
    }
}
