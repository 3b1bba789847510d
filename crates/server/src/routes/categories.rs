use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::Response,
    Json,
};
use service::category::repository::SORTABLE;
use service::dto::CategoryDto;
use service::pagination::Page;

use crate::errors::{ApiError, AtPath};
use crate::extract::{IdPath, PageParams, ValidatedJson};
use crate::routes::created;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/categories",
    tag = "categories",
    params(
        ("page" = Option<u64>, Query, description = "Zero-based page index"),
        ("size" = Option<u64>, Query, description = "Page size"),
        ("sort" = Option<Vec<String>>, Query, description = "property[,asc|desc]; repeatable")
    ),
    responses((status = 200, body = crate::openapi::CategoryPageDoc))
)]
pub async fn find_all(
    State(state): State<AppState>,
    uri: Uri,
    params: PageParams,
) -> Result<Json<Page<CategoryDto>>, ApiError> {
    let request = params.to_request(&state.paging, SORTABLE).at(&uri)?;
    Ok(Json(state.categories.find_all_paged(request).await.at(&uri)?))
}

#[utoipa::path(
    get,
    path = "/categories/{id}",
    tag = "categories",
    params(("id" = i64, Path, description = "Category id")),
    responses(
        (status = 200, body = crate::openapi::CategoryDoc),
        (status = 404, body = crate::openapi::StandardErrorDoc)
    )
)]
pub async fn find_by_id(State(state): State<AppState>, uri: Uri, IdPath(id): IdPath) -> Result<Json<CategoryDto>, ApiError> {
    Ok(Json(state.categories.find_by_id(id).await.at(&uri)?))
}

#[utoipa::path(
    post,
    path = "/categories",
    tag = "categories",
    request_body = crate::openapi::CategoryDoc,
    responses(
        (status = 201, body = crate::openapi::CategoryDoc),
        (status = 422, body = crate::openapi::ValidationErrorDoc)
    )
)]
pub async fn insert(
    State(state): State<AppState>,
    uri: Uri,
    ValidatedJson(dto): ValidatedJson<CategoryDto>,
) -> Result<Response, ApiError> {
    let category = state.categories.insert(dto).await.at(&uri)?;
    Ok(created(&uri, category.id, category))
}

#[utoipa::path(
    put,
    path = "/categories/{id}",
    tag = "categories",
    params(("id" = i64, Path, description = "Category id")),
    request_body = crate::openapi::CategoryDoc,
    responses(
        (status = 200, body = crate::openapi::CategoryDoc),
        (status = 404, body = crate::openapi::StandardErrorDoc)
    )
)]
pub async fn update(
    State(state): State<AppState>,
    uri: Uri,
    IdPath(id): IdPath,
    ValidatedJson(dto): ValidatedJson<CategoryDto>,
) -> Result<Json<CategoryDto>, ApiError> {
    Ok(Json(state.categories.update(id, dto).await.at(&uri)?))
}

#[utoipa::path(
    delete,
    path = "/categories/{id}",
    tag = "categories",
    params(("id" = i64, Path, description = "Category id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, body = crate::openapi::StandardErrorDoc),
        (status = 422, description = "Referenced by a product", body = crate::openapi::StandardErrorDoc)
    )
)]
pub async fn delete(State(state): State<AppState>, uri: Uri, IdPath(id): IdPath) -> Result<StatusCode, ApiError> {
    state.categories.delete(id).await.at(&uri)?;
    Ok(StatusCode::NO_CONTENT)
}
