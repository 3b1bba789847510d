use std::sync::Arc;

use chrono::Utc;
use models::category;
use tracing::{info, instrument};

use super::repository::{ProductRecord, ProductRepository};
use crate::category::repository::CategoryRepository;
use crate::dto::ProductDto;
use crate::errors::ServiceError;
use crate::mapping::{association_ids, product_fields, product_to_dto, resolve_associations};
use crate::pagination::{Page, PageRequest};

/// Product use cases: paged listing, lookup and atomic writes of a product with its
/// category set.
pub struct ProductService {
    products: Arc<dyn ProductRepository>,
    categories: Arc<dyn CategoryRepository>,
}

fn to_dto(record: &ProductRecord) -> ProductDto { product_to_dto(&record.product, &record.categories) }

impl ProductService {
    pub fn new(products: Arc<dyn ProductRepository>, categories: Arc<dyn CategoryRepository>) -> Self {
        Self { products, categories }
    }

    /// Every referenced category must exist; the first unknown id fails the call.
    async fn resolve_categories(&self, dto: &ProductDto) -> Result<Vec<category::Model>, ServiceError> {
        let ids = association_ids(dto.categories.iter().map(|c| c.id));
        let found = self.categories.find_by_ids(&ids).await?;
        resolve_associations("Category", &ids, found, |c| c.id)
    }

    /// One page of products, each with its categories.
    ///
    /// A page index past the end yields empty content with accurate totals.
    #[instrument(skip(self))]
    pub async fn find_all_paged(&self, request: PageRequest) -> Result<Page<ProductDto>, ServiceError> {
        let page = self.products.find_page(&request).await?;
        Ok(page.map(|r| to_dto(&r)))
    }

    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: i64) -> Result<ProductDto, ServiceError> {
        let record = self.products.find_by_id(id).await?.ok_or_else(|| ServiceError::not_found("Product", id))?;
        Ok(to_dto(&record))
    }

    /// Create a product. `date` defaults to now when the payload has none.
    ///
    /// # Examples
    /// ```
    /// use service::{memory::MemoryStore, product::ProductService, dto::{ProductDto, CategoryDto}};
    /// use std::sync::Arc;
    /// let store = Arc::new(MemoryStore::new());
    /// let notebooks = store.seed_category("Notebooks");
    /// let svc = ProductService::new(store.clone(), store);
    /// let dto = ProductDto {
    ///     id: None,
    ///     name: "Notebook Dell".into(),
    ///     description: "Good Notebook".into(),
    ///     price: 3000.0,
    ///     img_url: "https://img.example.com/dell.png".into(),
    ///     date: None,
    ///     categories: vec![CategoryDto { id: Some(notebooks.id), name: String::new() }],
    /// };
    /// let created = tokio_test::block_on(svc.insert(dto)).unwrap();
    /// assert!(created.id.is_some());
    /// assert_eq!(created.categories[0].name, "Notebooks");
    /// ```
    #[instrument(skip(self, dto), fields(name = %dto.name))]
    pub async fn insert(&self, dto: ProductDto) -> Result<ProductDto, ServiceError> {
        let categories = self.resolve_categories(&dto).await?;
        let date = dto.date.unwrap_or_else(Utc::now);
        let record = self.products.insert(product_fields(&dto), date, categories).await?;
        info!(product_id = record.product.id, categories = record.categories.len(), "product_created");
        Ok(to_dto(&record))
    }

    /// Overwrite the scalar fields and replace the category set. The creation date is kept.
    #[instrument(skip(self, dto))]
    pub async fn update(&self, id: i64, dto: ProductDto) -> Result<ProductDto, ServiceError> {
        if !self.products.exists(id).await? {
            return Err(ServiceError::not_found("Product", id));
        }
        let categories = self.resolve_categories(&dto).await?;
        let record = self
            .products
            .update(id, product_fields(&dto), categories)
            .await?
            .ok_or_else(|| ServiceError::not_found("Product", id))?;
        info!(product_id = id, "product_updated");
        Ok(to_dto(&record))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        if !self.products.delete(id).await? {
            return Err(ServiceError::not_found("Product", id));
        }
        info!(product_id = id, "product_deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::CategoryDto;
    use crate::memory::MemoryStore;
    use crate::pagination::SortOrder;
    use chrono::{DateTime, Duration};

    fn setup() -> (Arc<MemoryStore>, ProductService) {
        let store = Arc::new(MemoryStore::new());
        let svc = ProductService::new(store.clone(), store.clone());
        (store, svc)
    }

    fn dto(name: &str, category_ids: &[i64]) -> ProductDto {
        ProductDto {
            id: None,
            name: name.into(),
            description: "Lorem ipsum dolor sit amet".into(),
            price: 800.0,
            img_url: "https://img.example.com/p.png".into(),
            date: None,
            categories: category_ids.iter().map(|id| CategoryDto { id: Some(*id), name: String::new() }).collect(),
        }
    }

    #[tokio::test]
    async fn insert_resolves_categories_and_defaults_date() {
        let (store, svc) = setup();
        let notebooks = store.seed_category("Notebooks");
        let before = Utc::now();
        let created = svc.insert(dto("Notebook Dell", &[notebooks.id, notebooks.id])).await.unwrap();

        assert_eq!(created.categories, vec![CategoryDto { id: Some(notebooks.id), name: "Notebooks".into() }]);
        assert!(created.date.unwrap() >= before);

        let found = svc.find_by_id(created.id.unwrap()).await.unwrap();
        assert_eq!(found, created);
    }

    #[tokio::test]
    async fn insert_keeps_supplied_date() {
        let (_, svc) = setup();
        let date: DateTime<Utc> = "2020-07-13T20:50:07Z".parse().unwrap();
        let mut input = dto("Smart TV", &[]);
        input.date = Some(date);
        let created = svc.insert(input).await.unwrap();
        assert_eq!(created.date, Some(date));
    }

    #[tokio::test]
    async fn unknown_category_fails_before_any_write() {
        let (store, svc) = setup();
        let err = svc.insert(dto("Notebook Dell", &[77])).await.unwrap_err();
        assert_eq!(err.to_string(), "Category 77 not found");
        assert_eq!(store.product_count(), 0);
    }

    #[tokio::test]
    async fn update_replaces_categories_and_keeps_date() {
        let (store, svc) = setup();
        let a = store.seed_category("Electronics");
        let b = store.seed_category("Computers");
        let mut input = dto("PC Gamer", &[a.id]);
        input.date = Some(Utc::now() - Duration::days(30));
        let created = svc.insert(input).await.unwrap();
        let id = created.id.unwrap();

        let mut changes = dto("PC Gamer Pro", &[b.id]);
        changes.price = 1200.0;
        changes.date = Some(Utc::now());
        let updated = svc.update(id, changes).await.unwrap();

        assert_eq!(updated.name, "PC Gamer Pro");
        assert_eq!(updated.price, 1200.0);
        assert_eq!(updated.date, created.date);
        let ids: Vec<_> = updated.categories.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![Some(b.id)]);
    }

    #[tokio::test]
    async fn update_of_missing_product_is_not_found() {
        let (_, svc) = setup();
        let err = svc.update(1000, dto("Ghost product", &[])).await.unwrap_err();
        assert_eq!(err.to_string(), "Product 1000 not found");
    }

    #[tokio::test]
    async fn update_with_unknown_category_leaves_row_untouched() {
        let (store, svc) = setup();
        let c = store.seed_category("Books");
        let created = svc.insert(dto("The Hobbit", &[c.id])).await.unwrap();
        let id = created.id.unwrap();

        let err = svc.update(id, dto("The Silmarillion", &[c.id, 999])).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert_eq!(svc.find_by_id(id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn delete_then_lookup_is_not_found() {
        let (_, svc) = setup();
        let id = svc.insert(dto("Macbook Pro", &[])).await.unwrap().id.unwrap();
        svc.delete(id).await.unwrap();
        assert!(matches!(svc.find_by_id(id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(svc.delete(id).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn paged_listing_sorted_by_name() {
        let (_, svc) = setup();
        for i in (0..25).rev() {
            svc.insert(dto(&format!("Product {:02}", i), &[])).await.unwrap();
        }
        let page = svc.find_all_paged(PageRequest::new(0, 12).sorted_by(SortOrder::asc("name"))).await.unwrap();
        assert_eq!(page.total_elements, 25);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.content.len(), 12);
        assert!(page.content.windows(2).all(|w| w[0].name <= w[1].name));
        assert_eq!(page.content[0].name, "Product 00");

        let beyond = svc.find_all_paged(PageRequest::new(50, 12)).await.unwrap();
        assert!(beyond.content.is_empty());
        assert_eq!(beyond.total_elements, 25);
    }
}
