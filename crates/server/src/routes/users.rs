use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::Response,
    Json,
};
use service::dto::{UserDto, UserInsertDto};
use service::pagination::Page;
use service::user::repository::SORTABLE;

use crate::errors::{ApiError, AtPath};
use crate::extract::{IdPath, PageParams, ValidatedJson};
use crate::routes::created;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    params(
        ("page" = Option<u64>, Query, description = "Zero-based page index"),
        ("size" = Option<u64>, Query, description = "Page size"),
        ("sort" = Option<Vec<String>>, Query, description = "property[,asc|desc]; repeatable")
    ),
    responses(
        (status = 200, body = crate::openapi::UserPageDoc),
        (status = 422, body = crate::openapi::ValidationErrorDoc)
    )
)]
pub async fn find_all(State(state): State<AppState>, uri: Uri, params: PageParams) -> Result<Json<Page<UserDto>>, ApiError> {
    let request = params.to_request(&state.paging, SORTABLE).at(&uri)?;
    Ok(Json(state.users.find_all_paged(request).await.at(&uri)?))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, body = crate::openapi::UserDoc),
        (status = 404, body = crate::openapi::StandardErrorDoc)
    )
)]
pub async fn find_by_id(State(state): State<AppState>, uri: Uri, IdPath(id): IdPath) -> Result<Json<UserDto>, ApiError> {
    Ok(Json(state.users.find_by_id(id).await.at(&uri)?))
}

#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = crate::openapi::UserInsertDoc,
    responses(
        (status = 201, body = crate::openapi::UserDoc),
        (status = 404, description = "Unknown role", body = crate::openapi::StandardErrorDoc),
        (status = 422, description = "Invalid payload or email already in use", body = crate::openapi::ValidationErrorDoc)
    )
)]
pub async fn insert(
    State(state): State<AppState>,
    uri: Uri,
    ValidatedJson(dto): ValidatedJson<UserInsertDto>,
) -> Result<Response, ApiError> {
    let user = state.users.insert(dto).await.at(&uri)?;
    Ok(created(&uri, user.id, user))
}

#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User id")),
    request_body = crate::openapi::UserDoc,
    responses(
        (status = 200, body = crate::openapi::UserDoc),
        (status = 404, body = crate::openapi::StandardErrorDoc),
        (status = 422, body = crate::openapi::ValidationErrorDoc)
    )
)]
pub async fn update(
    State(state): State<AppState>,
    uri: Uri,
    IdPath(id): IdPath,
    ValidatedJson(dto): ValidatedJson<UserDto>,
) -> Result<Json<UserDto>, ApiError> {
    Ok(Json(state.users.update(id, dto).await.at(&uri)?))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User id")),
    responses((status = 204, description = "Deleted"), (status = 404, body = crate::openapi::StandardErrorDoc))
)]
pub async fn delete(State(state): State<AppState>, uri: Uri, IdPath(id): IdPath) -> Result<StatusCode, ApiError> {
    state.users.delete(id).await.at(&uri)?;
    Ok(StatusCode::NO_CONTENT)
}
