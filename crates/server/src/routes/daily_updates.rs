use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::daily_update::DailyUpdate;
use serde::Deserialize;
use services::services::{Actor, daily_update::DailyUpdatePage};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

const DEFAULT_PAGE_SIZE: u64 = 20;

#[derive(Debug, Deserialize)]
pub struct DailyUpdateQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct PostDailyUpdateRequest {
    pub content: String,
}

pub async fn list_updates(
    Extension(actor): Extension<Actor>,
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Query(query): Query<DailyUpdateQuery>,
) -> Result<ResponseJson<ApiResponse<DailyUpdatePage>>, ApiError> {
    let page = state
        .daily_updates()
        .list_updates(
            &state.db().pool,
            &actor,
            project_id,
            query.page.unwrap_or(1),
            query.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        )
        .await?;
    Ok(ResponseJson(ApiResponse::success(page)))
}

pub async fn post_update(
    Extension(actor): Extension<Actor>,
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(payload): Json<PostDailyUpdateRequest>,
) -> Result<ResponseJson<ApiResponse<DailyUpdate>>, ApiError> {
    let update = state
        .daily_updates()
        .post_update(&state.db().pool, &actor, project_id, &payload.content)
        .await?;
    Ok(ResponseJson(ApiResponse::success(update)))
}

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/projects/{project_id}/daily-updates",
        get(list_updates).post(post_update),
    )
}
