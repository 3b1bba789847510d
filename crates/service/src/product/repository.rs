use async_trait::async_trait;
use chrono::{DateTime, Utc};
use models::{category, product};

use crate::errors::ServiceError;
use crate::pagination::{Page, PageRequest};

/// Properties a product page may be ordered by.
pub const SORTABLE: &[&str] = &["id", "name", "price", "date"];

/// A product together with its current category set.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    pub product: product::Model,
    pub categories: Vec<category::Model>,
}

/// Scalar fields written on insert and overwritten on update.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFields {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub img_url: String,
}

/// Repository abstraction for product persistence.
///
/// `insert` and `update` write the scalar row and the full association set in one
/// transaction; `update` replaces the association set wholesale and never touches `date`.
/// Categories are re-checked inside that transaction: one deleted since the caller resolved
/// it fails the write with `NotFound`.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_page(&self, request: &PageRequest) -> Result<Page<ProductRecord>, ServiceError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<ProductRecord>, ServiceError>;
    async fn exists(&self, id: i64) -> Result<bool, ServiceError>;
    async fn insert(
        &self,
        fields: ProductFields,
        date: DateTime<Utc>,
        categories: Vec<category::Model>,
    ) -> Result<ProductRecord, ServiceError>;
    async fn update(
        &self,
        id: i64,
        fields: ProductFields,
        categories: Vec<category::Model>,
    ) -> Result<Option<ProductRecord>, ServiceError>;
    /// `false` when no row had that id.
    async fn delete(&self, id: i64) -> Result<bool, ServiceError>;
}
