pub mod categories;
pub mod products;
pub mod roles;
pub mod users;

use axum::{
    http::{header, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use common::types::Health;
use serde::Serialize;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;

use crate::openapi::ApiDoc;
use crate::state::AppState;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// 201 with a `Location` pointing at the new resource.
pub(crate) fn created<T: Serialize>(uri: &Uri, id: Option<i64>, body: T) -> Response {
    let mut resp = (StatusCode::CREATED, Json(body)).into_response();
    let location = id.map(|id| format!("{}/{}", uri.path().trim_end_matches('/'), id));
    if let Some(value) = location.and_then(|l| HeaderValue::from_str(&l).ok()) {
        resp.headers_mut().insert(header::LOCATION, value);
    }
    resp
}

/// Build the full application router
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi_json))
        .route("/products", get(products::find_all).post(products::insert))
        .route("/products/:id", get(products::find_by_id).put(products::update).delete(products::delete))
        .route("/categories", get(categories::find_all).post(categories::insert))
        .route(
            "/categories/:id",
            get(categories::find_by_id).put(categories::update).delete(categories::delete),
        )
        .route("/users", get(users::find_all).post(users::insert))
        .route("/users/:id", get(users::find_by_id).put(users::update).delete(users::delete))
        .route("/roles", get(roles::find_all))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 5xx
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
