use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::card::Card;
use serde::{Deserialize, Serialize};
use services::services::{
    Actor,
    card::{CardDetails, CardEdit, NewCard},
};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct MoveCardRequest {
    pub column_id: Uuid,
}

/// A blank or missing `assignee_id` unassigns the card.
#[derive(Debug, Deserialize)]
pub struct AssignCardRequest {
    pub assignee_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeletedCard {
    pub board_id: Uuid,
}

fn parse_assignee(raw: Option<&str>) -> Result<Option<Uuid>, ApiError> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(None),
        Some(value) => Uuid::parse_str(value).map(Some).map_err(|_| {
            ApiError::BadRequest("Assignee must be a member of the project".to_string())
        }),
    }
}

pub async fn create_card(
    Extension(actor): Extension<Actor>,
    State(state): State<AppState>,
    Path(board_id): Path<Uuid>,
    Json(payload): Json<NewCard>,
) -> Result<ResponseJson<ApiResponse<Card>>, ApiError> {
    let card = state
        .cards()
        .create(&state.db().pool, &actor, board_id, &payload)
        .await?;
    Ok(ResponseJson(ApiResponse::success(card)))
}

pub async fn get_card(
    Extension(actor): Extension<Actor>,
    State(state): State<AppState>,
    Path(card_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<CardDetails>>, ApiError> {
    let details = state
        .cards()
        .get_details(&state.db().pool, &actor, card_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Card not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(details)))
}

pub async fn update_card(
    Extension(actor): Extension<Actor>,
    State(state): State<AppState>,
    Path(card_id): Path<Uuid>,
    Json(payload): Json<CardEdit>,
) -> Result<ResponseJson<ApiResponse<Card>>, ApiError> {
    let card = state
        .cards()
        .update(&state.db().pool, &actor, card_id, &payload)
        .await?;
    Ok(ResponseJson(ApiResponse::success(card)))
}

pub async fn delete_card(
    Extension(actor): Extension<Actor>,
    State(state): State<AppState>,
    Path(card_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<DeletedCard>>, ApiError> {
    let board_id = state
        .cards()
        .delete(&state.db().pool, &actor, card_id)
        .await?;
    Ok(ResponseJson(ApiResponse::success(DeletedCard { board_id })))
}

pub async fn move_card(
    Extension(actor): Extension<Actor>,
    State(state): State<AppState>,
    Path(card_id): Path<Uuid>,
    Json(payload): Json<MoveCardRequest>,
) -> Result<ResponseJson<ApiResponse<Card>>, ApiError> {
    let card = state
        .cards()
        .move_card(&state.db().pool, &actor, card_id, payload.column_id)
        .await?;
    Ok(ResponseJson(ApiResponse::success(card)))
}

pub async fn assign_card(
    Extension(actor): Extension<Actor>,
    State(state): State<AppState>,
    Path(card_id): Path<Uuid>,
    Json(payload): Json<AssignCardRequest>,
) -> Result<ResponseJson<ApiResponse<Card>>, ApiError> {
    let assignee_id = parse_assignee(payload.assignee_id.as_deref())?;
    let card = state
        .cards()
        .assign(&state.db().pool, &actor, card_id, assignee_id)
        .await?;
    Ok(ResponseJson(ApiResponse::success(card)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/boards/{board_id}/cards", post(create_card))
        .route(
            "/cards/{card_id}",
            get(get_card).put(update_card).delete(delete_card),
        )
        .route("/cards/{card_id}/move", post(move_card))
        .route("/cards/{card_id}/assign", post(assign_card))
}
