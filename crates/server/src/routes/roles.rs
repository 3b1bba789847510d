use axum::{extract::State, http::Uri, Json};
use service::dto::RoleDto;

use crate::errors::{ApiError, AtPath};
use crate::state::AppState;

#[utoipa::path(get, path = "/roles", tag = "users", responses((status = 200, body = Vec<crate::openapi::RoleDoc>)))]
pub async fn find_all(State(state): State<AppState>, uri: Uri) -> Result<Json<Vec<RoleDto>>, ApiError> {
    Ok(Json(state.users.find_all_roles().await.at(&uri)?))
}
