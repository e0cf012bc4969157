use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, put},
};
use db::{
    models::{
        project::{CreateProject, Project, ProjectOption},
        project_member::ProjectMember,
    },
    types::ProjectRole,
};
use serde::Deserialize;
use services::services::{Actor, project::ProjectDetails};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    pub role: ProjectRole,
}

pub async fn get_projects(
    Extension(actor): Extension<Actor>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<ProjectOption>>>, ApiError> {
    let projects = state
        .projects()
        .get_user_projects(&state.db().pool, actor.user_id)
        .await?;
    Ok(ResponseJson(ApiResponse::success(projects)))
}

pub async fn create_project(
    Extension(actor): Extension<Actor>,
    State(state): State<AppState>,
    Json(payload): Json<CreateProject>,
) -> Result<ResponseJson<ApiResponse<Project>>, ApiError> {
    tracing::debug!("Creating project '{}'", payload.name);
    let project = state
        .projects()
        .create_project(&state.db().pool, &actor, &payload)
        .await?;
    Ok(ResponseJson(ApiResponse::success(project)))
}

pub async fn get_project(
    Extension(actor): Extension<Actor>,
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<ProjectDetails>>, ApiError> {
    let details = state
        .projects()
        .get_project(&state.db().pool, &actor, project_id)
        .await?;
    Ok(ResponseJson(ApiResponse::success(details)))
}

pub async fn change_member_role(
    Extension(actor): Extension<Actor>,
    State(state): State<AppState>,
    Path((project_id, user_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<ChangeRoleRequest>,
) -> Result<ResponseJson<ApiResponse<ProjectMember>>, ApiError> {
    let member = state
        .projects()
        .change_member_role(&state.db().pool, &actor, project_id, user_id, payload.role)
        .await?;
    Ok(ResponseJson(ApiResponse::success(member)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/projects", get(get_projects).post(create_project))
        .route("/projects/{project_id}", get(get_project))
        .route(
            "/projects/{project_id}/members/{user_id}/role",
            put(change_member_role),
        )
}
