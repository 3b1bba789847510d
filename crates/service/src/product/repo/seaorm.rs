use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, LoaderTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use models::{category, product, product_category};

use crate::errors::ServiceError;
use crate::mapping::resolve_associations;
use crate::pagination::{Page, PageRequest};
use crate::product::repository::{ProductFields, ProductRecord, ProductRepository};

pub struct SeaOrmProductRepository {
    pub db: DatabaseConnection,
}

fn sort_column(property: &str) -> Option<product::Column> {
    match property {
        "id" => Some(product::Column::Id),
        "name" => Some(product::Column::Name),
        "price" => Some(product::Column::Price),
        "date" => Some(product::Column::Date),
        _ => None,
    }
}

/// Re-read the association targets with `FOR SHARE`; a target deleted since the caller
/// resolved it is `NotFound`, and none can be deleted until the transaction ends.
async fn lock_categories<C: ConnectionTrait>(
    conn: &C,
    categories: &[category::Model],
) -> Result<Vec<category::Model>, ServiceError> {
    if categories.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i64> = categories.iter().map(|c| c.id).collect();
    let found = category::Entity::find()
        .filter(category::Column::Id.is_in(ids.iter().copied()))
        .lock_shared()
        .all(conn)
        .await?;
    resolve_associations("Category", &ids, found, |c| c.id)
}

/// Point the product's association rows at exactly `categories`.
async fn replace_categories<C: ConnectionTrait>(
    conn: &C,
    product_id: i64,
    categories: &[category::Model],
) -> Result<(), sea_orm::DbErr> {
    product_category::Entity::delete_many()
        .filter(product_category::Column::ProductId.eq(product_id))
        .exec(conn)
        .await?;
    if categories.is_empty() {
        return Ok(());
    }
    let links = categories
        .iter()
        .map(|c| product_category::ActiveModel { product_id: Set(product_id), category_id: Set(c.id) });
    product_category::Entity::insert_many(links).exec_without_returning(conn).await?;
    Ok(())
}

#[async_trait::async_trait]
impl ProductRepository for SeaOrmProductRepository {
    async fn find_page(&self, request: &PageRequest) -> Result<Page<ProductRecord>, ServiceError> {
        let mut query = product::Entity::find();
        for order in &request.sort {
            if let Some(col) = sort_column(&order.property) {
                query = query.order_by(col, order.direction.into());
            }
        }
        let paginator = query.order_by_asc(product::Column::Id).paginate(&self.db, request.size);
        let total = paginator.num_items().await?;
        if !request.has_rows(total) {
            return Ok(Page::new(Vec::new(), request, total));
        }
        let rows = paginator.fetch_page(request.page).await?;
        let categories = rows.load_many_to_many(category::Entity, product_category::Entity, &self.db).await?;
        let records = rows
            .into_iter()
            .zip(categories)
            .map(|(product, categories)| ProductRecord { product, categories })
            .collect();
        Ok(Page::new(records, request, total))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ProductRecord>, ServiceError> {
        let Some(product) = product::Entity::find_by_id(id).one(&self.db).await? else { return Ok(None) };
        let categories = product.find_related(category::Entity).all(&self.db).await?;
        Ok(Some(ProductRecord { product, categories }))
    }

    async fn exists(&self, id: i64) -> Result<bool, ServiceError> {
        Ok(product::Entity::find_by_id(id).count(&self.db).await? > 0)
    }

    async fn insert(
        &self,
        fields: ProductFields,
        date: DateTime<Utc>,
        categories: Vec<category::Model>,
    ) -> Result<ProductRecord, ServiceError> {
        let txn = self.db.begin().await?;
        let categories = lock_categories(&txn, &categories).await?;
        let am = product::ActiveModel {
            name: Set(fields.name),
            description: Set(fields.description),
            price: Set(fields.price),
            img_url: Set(fields.img_url),
            date: Set(date.into()),
            ..Default::default()
        };
        let product = am.insert(&txn).await?;
        replace_categories(&txn, product.id, &categories).await?;
        txn.commit().await?;
        Ok(ProductRecord { product, categories })
    }

    async fn update(
        &self,
        id: i64,
        fields: ProductFields,
        categories: Vec<category::Model>,
    ) -> Result<Option<ProductRecord>, ServiceError> {
        let txn = self.db.begin().await?;
        let Some(existing) = product::Entity::find_by_id(id).lock_exclusive().one(&txn).await? else {
            return Ok(None);
        };
        let categories = lock_categories(&txn, &categories).await?;
        let mut am: product::ActiveModel = existing.into();
        am.name = Set(fields.name);
        am.description = Set(fields.description);
        am.price = Set(fields.price);
        am.img_url = Set(fields.img_url);
        let product = am.update(&txn).await?;
        replace_categories(&txn, id, &categories).await?;
        txn.commit().await?;
        Ok(Some(ProductRecord { product, categories }))
    }

    async fn delete(&self, id: i64) -> Result<bool, ServiceError> {
        let res = product::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(res.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::repo::seaorm::SeaOrmCategoryRepository;
    use crate::category::repository::CategoryRepository;
    use crate::pagination::SortOrder;
    use crate::test_support::get_db;
    use uuid::Uuid;

    fn fields(name: &str, price: f64) -> ProductFields {
        ProductFields {
            name: name.to_string(),
            description: "Lorem ipsum".into(),
            price,
            img_url: "https://img.example.com/p.png".into(),
        }
    }

    #[tokio::test]
    async fn update_replaces_association_set_and_keeps_date() -> anyhow::Result<()> {
        let Some(db) = get_db().await? else { return Ok(()) };
        let categories = SeaOrmCategoryRepository { db: db.clone() };
        let repo = SeaOrmProductRepository { db };

        let a = categories.insert(format!("cat_{}", Uuid::new_v4())).await?;
        let b = categories.insert(format!("cat_{}", Uuid::new_v4())).await?;
        let created = repo.insert(fields("Phone case", 12.5), Utc::now(), vec![a.clone()]).await?;

        let updated = repo
            .update(created.product.id, fields("Phone cover", 14.0), vec![b.clone()])
            .await?
            .expect("row exists");
        assert_eq!(updated.product.date, created.product.date);

        let reloaded = repo.find_by_id(created.product.id).await?.expect("row exists");
        assert_eq!(reloaded.product.name, "Phone cover");
        assert_eq!(reloaded.categories, vec![b.clone()]);

        assert!(repo.delete(created.product.id).await?);
        assert!(!repo.exists(created.product.id).await?);
        categories.delete(a.id).await?;
        categories.delete(b.id).await?;
        Ok(())
    }

    #[tokio::test]
    async fn page_loads_categories_per_row() -> anyhow::Result<()> {
        let Some(db) = get_db().await? else { return Ok(()) };
        let categories = SeaOrmCategoryRepository { db: db.clone() };
        let repo = SeaOrmProductRepository { db };

        let c = categories.insert(format!("cat_{}", Uuid::new_v4())).await?;
        let p = repo.insert(fields("Desk lamp", 30.0), Utc::now(), vec![c.clone()]).await?;

        let request = PageRequest::new(0, 5).sorted_by(SortOrder::desc("id"));
        let page = repo.find_page(&request).await?;
        let row = page.content.iter().find(|r| r.product.id == p.product.id).expect("newest row on first page");
        assert_eq!(row.categories, vec![c.clone()]);

        repo.delete(p.product.id).await?;
        categories.delete(c.id).await?;
        Ok(())
    }

    #[tokio::test]
    async fn long_strings_are_stored_whole() -> anyhow::Result<()> {
        let Some(db) = get_db().await? else { return Ok(()) };
        let categories = SeaOrmCategoryRepository { db: db.clone() };
        let repo = SeaOrmProductRepository { db };

        let c = categories.insert(format!("cat_{}_{}", Uuid::new_v4(), "c".repeat(300))).await?;
        let mut long = fields(&"n".repeat(200), 1.0);
        long.img_url = format!("https://img.example.com/{}.png", "x".repeat(600));
        let p = repo.insert(long.clone(), Utc::now(), vec![c.clone()]).await?;

        let reloaded = repo.find_by_id(p.product.id).await?.expect("row exists");
        assert_eq!(reloaded.product.img_url, long.img_url);
        assert_eq!(reloaded.product.name.len(), 200);
        assert_eq!(reloaded.categories, vec![c.clone()]);

        repo.delete(p.product.id).await?;
        categories.delete(c.id).await?;
        Ok(())
    }

    #[tokio::test]
    async fn category_deleted_after_resolution_is_not_found() -> anyhow::Result<()> {
        let Some(db) = get_db().await? else { return Ok(()) };
        let categories = SeaOrmCategoryRepository { db: db.clone() };
        let repo = SeaOrmProductRepository { db };

        let kept = categories.insert(format!("cat_{}", Uuid::new_v4())).await?;
        let stale = categories.insert(format!("cat_{}", Uuid::new_v4())).await?;
        let p = repo.insert(fields("Webcam", 45.0), Utc::now(), vec![kept.clone()]).await?;
        assert!(categories.delete(stale.id).await?);

        let err = repo
            .insert(fields("Headset", 60.0), Utc::now(), vec![kept.clone(), stale.clone()])
            .await
            .expect_err("stale category");
        assert!(matches!(err, ServiceError::NotFound(ref m) if *m == format!("Category {} not found", stale.id)));

        let err = repo.update(p.product.id, fields("Webcam HD", 50.0), vec![stale.clone()]).await.expect_err("stale");
        assert!(matches!(err, ServiceError::NotFound(_)));
        let reloaded = repo.find_by_id(p.product.id).await?.expect("row exists");
        assert_eq!(reloaded.product.name, "Webcam");
        assert_eq!(reloaded.categories, vec![kept.clone()]);

        repo.delete(p.product.id).await?;
        categories.delete(kept.id).await?;
        Ok(())
    }

    #[tokio::test]
    async fn huge_page_index_is_empty_with_totals() -> anyhow::Result<()> {
        let Some(db) = get_db().await? else { return Ok(()) };
        let repo = SeaOrmProductRepository { db };
        let p = repo.insert(fields("Mouse pad", 9.0), Utc::now(), vec![]).await?;

        let page = repo.find_page(&PageRequest::new(1 << 62, 8)).await?;
        assert!(page.content.is_empty());
        assert!(page.total_elements >= 1);
        assert_eq!(page.total_pages, page.total_elements.div_ceil(8));

        repo.delete(p.product.id).await?;
        Ok(())
    }

    #[tokio::test]
    async fn referenced_category_cannot_be_deleted() -> anyhow::Result<()> {
        let Some(db) = get_db().await? else { return Ok(()) };
        let categories = SeaOrmCategoryRepository { db: db.clone() };
        let repo = SeaOrmProductRepository { db };

        let c = categories.insert(format!("cat_{}", Uuid::new_v4())).await?;
        let p = repo.insert(fields("Monitor arm", 80.0), Utc::now(), vec![c.clone()]).await?;

        let err = categories.delete(c.id).await.expect_err("category is referenced");
        assert!(matches!(err, ServiceError::IntegrityConflict(_)));

        repo.delete(p.product.id).await?;
        assert!(categories.delete(c.id).await?);
        Ok(())
    }
}
