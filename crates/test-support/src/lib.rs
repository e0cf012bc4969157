//! Fixtures shared by the service and server test suites.

use chrono::{DateTime, TimeZone, Utc};
use db::{
    DbPool,
    models::{
        board::{Board, CreateBoard},
        board_member::BoardMember,
        column::Column,
        project::{CreateProject, Project},
        project_member::ProjectMember,
        user::{CreateUser, User},
    },
    types::{BoardRole, ProjectRole},
};
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

/// Fresh in-memory sqlite database with the full schema applied.
pub async fn setup_db() -> DbPool {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    db_migration::Migrator::up(&db, None).await.unwrap();
    db
}

/// A fixed instant so tests never depend on the wall clock.
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap()
}

pub async fn create_user(db: &DbPool, email: &str) -> User {
    User::create(
        db,
        &CreateUser {
            email: email.to_string(),
            display_name: None,
        },
        Uuid::new_v4(),
        epoch(),
    )
    .await
    .unwrap()
}

/// Inserts a project with `owner` as its only (Owner) member.
pub async fn create_project(db: &DbPool, name: &str, owner: Uuid) -> Project {
    let project = Project::create(
        db,
        &CreateProject {
            name: name.to_string(),
            description: None,
        },
        Uuid::new_v4(),
        owner,
        epoch(),
    )
    .await
    .unwrap();
    add_member(db, project.id, owner, ProjectRole::Owner).await;
    project
}

pub async fn add_member(db: &DbPool, project_id: Uuid, user_id: Uuid, role: ProjectRole) {
    ProjectMember::create(db, project_id, user_id, role, epoch())
        .await
        .unwrap();
}

/// Inserts a board with "To Do" and "Done" columns and no board members.
pub async fn create_board(
    db: &DbPool,
    project_id: Uuid,
    name: &str,
    is_private: bool,
) -> (Board, Vec<Column>) {
    let board = Board::create(
        db,
        &CreateBoard {
            name: name.to_string(),
            is_private,
        },
        Uuid::new_v4(),
        project_id,
        epoch(),
    )
    .await
    .unwrap();
    let mut columns = Vec::new();
    for (order, column_name) in ["To Do", "Done"].into_iter().enumerate() {
        columns.push(
            Column::create(db, board.id, column_name, order as i32, Uuid::new_v4())
                .await
                .unwrap(),
        );
    }
    (board, columns)
}

pub async fn add_board_member(db: &DbPool, board_id: Uuid, user_id: Uuid, role: BoardRole) {
    BoardMember::create_if_missing(db, board_id, user_id, role, epoch())
        .await
        .unwrap();
}
