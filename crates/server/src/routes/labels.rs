use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{delete, post},
};
use db::models::label::{CreateLabel, Label};
use services::services::Actor;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

pub async fn create_label(
    Extension(actor): Extension<Actor>,
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(payload): Json<CreateLabel>,
) -> Result<ResponseJson<ApiResponse<Label>>, ApiError> {
    let label = state
        .labels()
        .create_label(&state.db().pool, &actor, project_id, &payload)
        .await?;
    Ok(ResponseJson(ApiResponse::success(label)))
}

pub async fn delete_label(
    Extension(actor): Extension<Actor>,
    State(state): State<AppState>,
    Path(label_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    state
        .labels()
        .delete_label(&state.db().pool, &actor, label_id)
        .await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub async fn attach_label(
    Extension(actor): Extension<Actor>,
    State(state): State<AppState>,
    Path((card_id, label_id)): Path<(Uuid, Uuid)>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    state
        .labels()
        .attach_label(&state.db().pool, &actor, card_id, label_id)
        .await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub async fn detach_label(
    Extension(actor): Extension<Actor>,
    State(state): State<AppState>,
    Path((card_id, label_id)): Path<(Uuid, Uuid)>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    state
        .labels()
        .detach_label(&state.db().pool, &actor, card_id, label_id)
        .await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/projects/{project_id}/labels", post(create_label))
        .route("/labels/{label_id}", delete(delete_label))
        .route(
            "/cards/{card_id}/labels/{label_id}",
            post(attach_label).delete(detach_label),
        )
}
