use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::{invite::Invite, user::User};
use serde::{Deserialize, Serialize};
use services::services::Actor;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct SendInviteRequest {
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AcceptInviteResponse {
    pub accepted: bool,
}

pub async fn send_invite(
    Extension(actor): Extension<Actor>,
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(payload): Json<SendInviteRequest>,
) -> Result<ResponseJson<ApiResponse<Invite>>, ApiError> {
    let invite = state
        .invites()
        .send_invite(&state.db().pool, &actor, project_id, &payload.email)
        .await?;
    Ok(ResponseJson(ApiResponse::success(invite)))
}

/// Invites addressed to the caller's own account email.
pub async fn get_inbox(
    Extension(actor): Extension<Actor>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Invite>>>, ApiError> {
    let pool = &state.db().pool;
    let email = User::find_by_id(pool, actor.user_id)
        .await?
        .map(|user| user.email)
        .unwrap_or_default();
    let invites = state.invites().get_inbox(pool, &email).await?;
    Ok(ResponseJson(ApiResponse::success(invites)))
}

pub async fn accept_invite(
    Extension(actor): Extension<Actor>,
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<ResponseJson<ApiResponse<AcceptInviteResponse>>, ApiError> {
    let accepted = state
        .invites()
        .accept(&state.db().pool, &token, actor.user_id)
        .await?;
    Ok(ResponseJson(ApiResponse::success(AcceptInviteResponse {
        accepted,
    })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/projects/{project_id}/invites", post(send_invite))
        .route("/invites/inbox", get(get_inbox))
        .route("/invites/{token}/accept", post(accept_invite))
}
