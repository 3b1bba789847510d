//! Request extractors that report failures through `ApiError`.

use axum::async_trait;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use axum::Json;
use configs::PaginationConfig;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use service::errors::ServiceError;
use service::pagination::PageRequest;
use service::validation::{Validate, ValidationErrors};

use crate::errors::ApiError;

/// JSON body that has been deserialized and passed `Validate`.
///
/// Malformed bodies surface as a validation failure on field `body`.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let path = req.uri().path().to_string();
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            let errors = ValidationErrors::single("body", rejection.body_text());
            ApiError::new(ServiceError::Validation(errors), path.clone())
        })?;
        value.validate().map_err(|errors| ApiError::new(errors.into(), path))?;
        Ok(Self(value))
    }
}

/// Numeric `:id` path segment; a non-numeric value is a validation failure on field `id`.
#[derive(Debug, Clone, Copy)]
pub struct IdPath(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let path = parts.uri.path().to_string();
        let Path(id) = Path::<i64>::from_request_parts(parts, state).await.map_err(|rejection| {
            let errors = ValidationErrors::single("id", rejection.body_text());
            ApiError::new(ServiceError::Validation(errors), path)
        })?;
        Ok(Self(id))
    }
}

/// Raw `page`, `size` and repeated `sort` query values.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u64>,
    pub size: Option<u64>,
    #[serde(default)]
    pub sort: Vec<String>,
}

#[async_trait]
impl<S> FromRequestParts<S> for PageParams
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let path = parts.uri.path().to_string();
        let axum_extra::extract::Query(params) =
            axum_extra::extract::Query::<PageParams>::from_request_parts(parts, state).await.map_err(|rejection| {
                let errors = ValidationErrors::single("query", rejection.to_string());
                ApiError::new(ServiceError::Validation(errors), path)
            })?;
        Ok(params)
    }
}

impl PageParams {
    pub fn to_request(&self, paging: &PaginationConfig, sortable: &[&str]) -> Result<PageRequest, ServiceError> {
        PageRequest::from_query(self.page, self.size, &self.sort, paging.default_size, paging.max_size, sortable)
    }
}
