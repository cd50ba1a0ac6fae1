//! Profile routes

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::routes::json::ApiJson;
use crate::services::UserService;
use crate::state::AppState;
use auth_service_shared::{UpdateProfileRequest, UserProfile};
use axum::{extract::State, routing::put, Json, Router};

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/", put(update_profile))
}

/// Update names and email of the current user
///
/// PUT /api/v1/profile
async fn update_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ApiJson(req): ApiJson<UpdateProfileRequest>,
) -> ApiResult<Json<UserProfile>> {
    let profile = UserService::update_profile(state.users(), auth_user.user_id, &req).await?;
    Ok(Json(profile))
}
