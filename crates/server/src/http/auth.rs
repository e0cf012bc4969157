use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use db::models::user::User;
use services::services::Actor;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::state::AppState;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const PLATFORM_ADMIN_HEADER: &str = "x-platform-admin";

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn parse_user_id(headers: &HeaderMap) -> Option<Uuid> {
    header_str(headers, USER_ID_HEADER).and_then(|value| Uuid::parse_str(value).ok())
}

fn parse_platform_admin(headers: &HeaderMap) -> bool {
    header_str(headers, PLATFORM_ADMIN_HEADER)
        .is_some_and(|value| value == "1" || value.eq_ignore_ascii_case("true"))
}

fn unauthorized() -> Response {
    let response = ApiResponse::<()>::error("Unauthorized");
    (StatusCode::UNAUTHORIZED, Json(response)).into_response()
}

/// Resolves the caller identity supplied by the upstream authenticator and
/// stores it as an [`Actor`] request extension. Unknown users are rejected.
pub async fn require_actor(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(user_id) = parse_user_id(req.headers()) else {
        tracing::warn!(
            path = %req.uri().path(),
            method = %req.method(),
            reason = "missing_user_id",
            "Unauthorized API request"
        );
        return unauthorized();
    };

    match User::find_by_id(&state.db().pool, user_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            tracing::warn!(%user_id, reason = "unknown_user", "Unauthorized API request");
            return unauthorized();
        }
        Err(e) => {
            tracing::error!(%user_id, "Failed to load user: {e}");
            let response = ApiResponse::<()>::error("Something went wrong. Please try again.");
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(response)).into_response();
        }
    }

    let actor = Actor {
        user_id,
        is_platform_admin: parse_platform_admin(req.headers()),
    };
    req.extensions_mut().insert(actor);
    next.run(req).await
}
