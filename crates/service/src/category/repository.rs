use async_trait::async_trait;
use models::category;

use crate::errors::ServiceError;
use crate::pagination::{Page, PageRequest};

/// Properties a category page may be ordered by.
pub const SORTABLE: &[&str] = &["id", "name"];

/// Repository abstraction for category persistence.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn find_page(&self, request: &PageRequest) -> Result<Page<category::Model>, ServiceError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<category::Model>, ServiceError>;
    /// Rows for the given ids; unknown ids are simply absent from the result.
    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<category::Model>, ServiceError>;
    async fn insert(&self, name: String) -> Result<category::Model, ServiceError>;
    async fn update(&self, id: i64, name: String) -> Result<Option<category::Model>, ServiceError>;
    /// `false` when no row had that id.
    async fn delete(&self, id: i64) -> Result<bool, ServiceError>;
}
