use std::sync::Arc;

use tracing::{info, instrument};

use super::repository::CategoryRepository;
use crate::dto::CategoryDto;
use crate::errors::ServiceError;
use crate::mapping::category_to_dto;
use crate::pagination::{Page, PageRequest};

/// Category use cases.
pub struct CategoryService {
    repo: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    pub fn new(repo: Arc<dyn CategoryRepository>) -> Self { Self { repo } }

    #[instrument(skip(self))]
    pub async fn find_all_paged(&self, request: PageRequest) -> Result<Page<CategoryDto>, ServiceError> {
        let page = self.repo.find_page(&request).await?;
        Ok(page.map(|c| category_to_dto(&c)))
    }

    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: i64) -> Result<CategoryDto, ServiceError> {
        let category = self.repo.find_by_id(id).await?.ok_or_else(|| ServiceError::not_found("Category", id))?;
        Ok(category_to_dto(&category))
    }

    #[instrument(skip(self, dto), fields(name = %dto.name))]
    pub async fn insert(&self, dto: CategoryDto) -> Result<CategoryDto, ServiceError> {
        let created = self.repo.insert(dto.name).await?;
        info!(category_id = created.id, "category_created");
        Ok(category_to_dto(&created))
    }

    #[instrument(skip(self, dto))]
    pub async fn update(&self, id: i64, dto: CategoryDto) -> Result<CategoryDto, ServiceError> {
        let updated = self.repo.update(id, dto.name).await?.ok_or_else(|| ServiceError::not_found("Category", id))?;
        info!(category_id = id, "category_updated");
        Ok(category_to_dto(&updated))
    }

    /// Fails with `IntegrityConflict` while any product still references the category.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        if !self.repo.delete(id).await? {
            return Err(ServiceError::not_found("Category", id));
        }
        info!(category_id = id, "category_deleted");
        Ok(())
    }
}
