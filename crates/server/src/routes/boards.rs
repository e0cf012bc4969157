use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::board::{Board, CreateBoard};
use serde::Serialize;
use services::services::{Actor, board::BoardDetails};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Serialize)]
pub struct DeletedBoard {
    pub project_id: Uuid,
}

pub async fn list_boards(
    Extension(actor): Extension<Actor>,
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<Board>>>, ApiError> {
    let boards = state
        .boards()
        .list_project_boards(&state.db().pool, &actor, project_id)
        .await?;
    Ok(ResponseJson(ApiResponse::success(boards)))
}

pub async fn create_board(
    Extension(actor): Extension<Actor>,
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(payload): Json<CreateBoard>,
) -> Result<ResponseJson<ApiResponse<Board>>, ApiError> {
    let board = state
        .boards()
        .create_board(&state.db().pool, &actor, project_id, &payload)
        .await?;
    Ok(ResponseJson(ApiResponse::success(board)))
}

pub async fn get_board(
    Extension(actor): Extension<Actor>,
    State(state): State<AppState>,
    Path(board_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<BoardDetails>>, ApiError> {
    let details = state
        .boards()
        .get_board_details(&state.db().pool, &actor, board_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Board not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(details)))
}

pub async fn delete_board(
    Extension(actor): Extension<Actor>,
    State(state): State<AppState>,
    Path(board_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<DeletedBoard>>, ApiError> {
    let project_id = state
        .boards()
        .delete_board(&state.db().pool, &actor, board_id)
        .await?;
    Ok(ResponseJson(ApiResponse::success(DeletedBoard { project_id })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/projects/{project_id}/boards",
            get(list_boards).post(create_board),
        )
        .route("/boards/{board_id}", get(get_board).delete(delete_board))
}
