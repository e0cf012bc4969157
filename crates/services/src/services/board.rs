use std::sync::Arc;

use db::{
    DbPool, TransactionTrait,
    models::{
        board::{Board, CreateBoard},
        board_member::BoardMember,
        card::Card,
        column::Column,
        project::Project,
    },
    types::BoardRole,
};
use serde::Serialize;
use uuid::Uuid;

use super::{
    access::{authorize, role_facts},
    actor::Actor,
    clock::Clock,
    error::{Result, ServiceError},
    policy::{self, Action},
};

/// Columns every new board starts with, left to right.
pub const DEFAULT_COLUMNS: [&str; 3] = ["To Do", "In Progress", "Done"];

#[derive(Debug, Clone, Serialize)]
pub struct BoardDetails {
    #[serde(flatten)]
    pub board: Board,
    pub columns: Vec<Column>,
    pub cards: Vec<Card>,
}

#[derive(Clone)]
pub struct BoardService {
    clock: Arc<dyn Clock>,
}

impl BoardService {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Creates a board, makes the creator a board Admin and seeds the
    /// default columns, all in one transaction.
    pub async fn create_board(
        &self,
        pool: &DbPool,
        actor: &Actor,
        project_id: Uuid,
        data: &CreateBoard,
    ) -> Result<Board> {
        let name = data.name.trim();
        if name.is_empty() {
            return Err(ServiceError::invalid("Board name is required"));
        }

        let facts = role_facts(pool, actor, project_id, None).await?;
        authorize(Action::CreateBoard, &facts, actor)?;

        if !Project::exists(pool, project_id).await? {
            return Err(ServiceError::not_found("Project"));
        }

        let now = self.clock.now();
        let tx = pool.begin().await?;
        let board = Board::create(
            &tx,
            &CreateBoard {
                name: name.to_string(),
                is_private: data.is_private,
            },
            Uuid::new_v4(),
            project_id,
            now,
        )
        .await?;
        BoardMember::create_if_missing(&tx, board.id, actor.user_id, BoardRole::Admin, now).await?;
        for (order, column_name) in (0..).zip(DEFAULT_COLUMNS) {
            Column::create(&tx, board.id, column_name, order, Uuid::new_v4()).await?;
        }
        tx.commit().await?;

        tracing::info!(
            board_id = %board.id,
            %project_id,
            created_by = %actor.user_id,
            "Board created"
        );
        Ok(board)
    }

    /// Board with its columns and cards, or `None` when it does not exist or
    /// is private and the actor may not see it.
    pub async fn get_board_details(
        &self,
        pool: &DbPool,
        actor: &Actor,
        board_id: Uuid,
    ) -> Result<Option<BoardDetails>> {
        let Some(board) = Board::find_by_id(pool, board_id).await? else {
            return Ok(None);
        };
        if board.is_private {
            let facts = role_facts(pool, actor, board.project_id, None).await?;
            if !policy::is_allowed(Action::ViewPrivateBoard, &facts) {
                return Ok(None);
            }
        }

        let columns = Column::find_by_board_id(pool, board.id).await?;
        let cards = Card::find_by_board_id(pool, board.id).await?;
        Ok(Some(BoardDetails {
            board,
            columns,
            cards,
        }))
    }

    /// Boards of a project in creation order. Private boards are left out
    /// for callers who may not view them.
    pub async fn list_project_boards(
        &self,
        pool: &DbPool,
        actor: &Actor,
        project_id: Uuid,
    ) -> Result<Vec<Board>> {
        if !Project::exists(pool, project_id).await? {
            return Err(ServiceError::not_found("Project"));
        }
        let facts = role_facts(pool, actor, project_id, None).await?;
        let can_view_private = policy::is_allowed(Action::ViewPrivateBoard, &facts);

        let boards = Board::find_by_project_id(pool, project_id).await?;
        Ok(boards
            .into_iter()
            .filter(|board| !board.is_private || can_view_private)
            .collect())
    }

    /// Deletes a board and everything on it. Returns the owning project id.
    pub async fn delete_board(&self, pool: &DbPool, actor: &Actor, board_id: Uuid) -> Result<Uuid> {
        let board = Board::find_by_id(pool, board_id)
            .await?
            .ok_or(ServiceError::not_found("Board"))?;
        let facts = role_facts(pool, actor, board.project_id, None).await?;
        authorize(Action::DeleteBoard, &facts, actor)?;

        let tx = pool.begin().await?;
        Board::delete(&tx, board.id).await?;
        tx.commit().await?;

        tracing::info!(%board_id, project_id = %board.project_id, deleted_by = %actor.user_id, "Board deleted");
        Ok(board.project_id)
    }
}
