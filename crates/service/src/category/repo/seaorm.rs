use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use models::category;

use crate::category::repository::CategoryRepository;
use crate::errors::ServiceError;
use crate::pagination::{Page, PageRequest};

pub struct SeaOrmCategoryRepository {
    pub db: DatabaseConnection,
}

fn sort_column(property: &str) -> Option<category::Column> {
    match property {
        "id" => Some(category::Column::Id),
        "name" => Some(category::Column::Name),
        _ => None,
    }
}

#[async_trait::async_trait]
impl CategoryRepository for SeaOrmCategoryRepository {
    async fn find_page(&self, request: &PageRequest) -> Result<Page<category::Model>, ServiceError> {
        let mut query = category::Entity::find();
        for order in &request.sort {
            if let Some(col) = sort_column(&order.property) {
                query = query.order_by(col, order.direction.into());
            }
        }
        let paginator = query.order_by_asc(category::Column::Id).paginate(&self.db, request.size);
        let total = paginator.num_items().await?;
        if !request.has_rows(total) {
            return Ok(Page::new(Vec::new(), request, total));
        }
        let rows = paginator.fetch_page(request.page).await?;
        Ok(Page::new(rows, request, total))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<category::Model>, ServiceError> {
        Ok(category::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<category::Model>, ServiceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = category::Entity::find()
            .filter(category::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await?;
        Ok(rows)
    }

    async fn insert(&self, name: String) -> Result<category::Model, ServiceError> {
        let am = category::ActiveModel { name: Set(name), ..Default::default() };
        Ok(am.insert(&self.db).await?)
    }

    async fn update(&self, id: i64, name: String) -> Result<Option<category::Model>, ServiceError> {
        let Some(existing) = category::Entity::find_by_id(id).one(&self.db).await? else { return Ok(None) };
        let mut am: category::ActiveModel = existing.into();
        am.name = Set(name);
        Ok(Some(am.update(&self.db).await?))
    }

    async fn delete(&self, id: i64) -> Result<bool, ServiceError> {
        let res = category::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(res.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::SortOrder;
    use crate::test_support::get_db;
    use uuid::Uuid;

    #[tokio::test]
    async fn insert_rename_and_delete() -> anyhow::Result<()> {
        let Some(db) = get_db().await? else { return Ok(()) };
        let repo = SeaOrmCategoryRepository { db };

        let created = repo.insert(format!("cat_{}", Uuid::new_v4())).await?;
        let renamed = repo.update(created.id, "Renamed".into()).await?.expect("row exists");
        assert_eq!(renamed.name, "Renamed");
        assert_eq!(repo.find_by_ids(&[created.id, -1]).await?.len(), 1);

        assert!(repo.delete(created.id).await?);
        assert!(!repo.delete(created.id).await?);
        assert!(repo.update(created.id, "gone".into()).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn page_reports_total_count() -> anyhow::Result<()> {
        let Some(db) = get_db().await? else { return Ok(()) };
        let repo = SeaOrmCategoryRepository { db };
        let a = repo.insert(format!("cat_{}", Uuid::new_v4())).await?;

        let request = PageRequest::new(0, 1).sorted_by(SortOrder::desc("id"));
        let page = repo.find_page(&request).await?;
        assert!(page.total_elements >= 1);
        assert_eq!(page.content.len(), 1);
        assert!(page.content[0].id >= a.id);

        repo.delete(a.id).await?;
        Ok(())
    }
}
