use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::Response,
    Json,
};
use service::dto::ProductDto;
use service::pagination::Page;
use service::product::repository::SORTABLE;

use crate::errors::{ApiError, AtPath};
use crate::extract::{IdPath, PageParams, ValidatedJson};
use crate::routes::created;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/products",
    tag = "products",
    params(
        ("page" = Option<u64>, Query, description = "Zero-based page index"),
        ("size" = Option<u64>, Query, description = "Page size"),
        ("sort" = Option<Vec<String>>, Query, description = "property[,asc|desc]; repeatable")
    ),
    responses(
        (status = 200, body = crate::openapi::ProductPageDoc),
        (status = 422, body = crate::openapi::ValidationErrorDoc)
    )
)]
pub async fn find_all(
    State(state): State<AppState>,
    uri: Uri,
    params: PageParams,
) -> Result<Json<Page<ProductDto>>, ApiError> {
    let request = params.to_request(&state.paging, SORTABLE).at(&uri)?;
    Ok(Json(state.products.find_all_paged(request).await.at(&uri)?))
}

#[utoipa::path(
    get,
    path = "/products/{id}",
    tag = "products",
    params(("id" = i64, Path, description = "Product id")),
    responses(
        (status = 200, body = crate::openapi::ProductDoc),
        (status = 404, body = crate::openapi::StandardErrorDoc)
    )
)]
pub async fn find_by_id(State(state): State<AppState>, uri: Uri, IdPath(id): IdPath) -> Result<Json<ProductDto>, ApiError> {
    Ok(Json(state.products.find_by_id(id).await.at(&uri)?))
}

#[utoipa::path(
    post,
    path = "/products",
    tag = "products",
    request_body = crate::openapi::ProductDoc,
    responses(
        (status = 201, body = crate::openapi::ProductDoc),
        (status = 404, description = "Unknown category", body = crate::openapi::StandardErrorDoc),
        (status = 422, body = crate::openapi::ValidationErrorDoc)
    )
)]
pub async fn insert(
    State(state): State<AppState>,
    uri: Uri,
    ValidatedJson(dto): ValidatedJson<ProductDto>,
) -> Result<Response, ApiError> {
    let product = state.products.insert(dto).await.at(&uri)?;
    Ok(created(&uri, product.id, product))
}

#[utoipa::path(
    put,
    path = "/products/{id}",
    tag = "products",
    params(("id" = i64, Path, description = "Product id")),
    request_body = crate::openapi::ProductDoc,
    responses(
        (status = 200, body = crate::openapi::ProductDoc),
        (status = 404, body = crate::openapi::StandardErrorDoc),
        (status = 422, body = crate::openapi::ValidationErrorDoc)
    )
)]
pub async fn update(
    State(state): State<AppState>,
    uri: Uri,
    IdPath(id): IdPath,
    ValidatedJson(dto): ValidatedJson<ProductDto>,
) -> Result<Json<ProductDto>, ApiError> {
    Ok(Json(state.products.update(id, dto).await.at(&uri)?))
}

#[utoipa::path(
    delete,
    path = "/products/{id}",
    tag = "products",
    params(("id" = i64, Path, description = "Product id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, body = crate::openapi::StandardErrorDoc),
        (status = 422, description = "Still referenced", body = crate::openapi::StandardErrorDoc)
    )
)]
pub async fn delete(State(state): State<AppState>, uri: Uri, IdPath(id): IdPath) -> Result<StatusCode, ApiError> {
    state.products.delete(id).await.at(&uri)?;
    Ok(StatusCode::NO_CONTENT)
}
