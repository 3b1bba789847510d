use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, LoaderTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use models::{role, user, user_role};

use crate::errors::ServiceError;
use crate::mapping::resolve_associations;
use crate::pagination::{Page, PageRequest};
use crate::user::repository::{RoleRepository, UserFields, UserRecord, UserRepository};

pub struct SeaOrmUserRepository {
    pub db: DatabaseConnection,
}

pub struct SeaOrmRoleRepository {
    pub db: DatabaseConnection,
}

fn sort_column(property: &str) -> Option<user::Column> {
    match property {
        "id" => Some(user::Column::Id),
        "firstName" => Some(user::Column::FirstName),
        "lastName" => Some(user::Column::LastName),
        "email" => Some(user::Column::Email),
        _ => None,
    }
}

/// Re-read the roles with `FOR SHARE` inside the write; a role gone since resolution is `NotFound`.
async fn lock_roles<C: ConnectionTrait>(conn: &C, roles: &[role::Model]) -> Result<Vec<role::Model>, ServiceError> {
    if roles.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i64> = roles.iter().map(|r| r.id).collect();
    let found = role::Entity::find()
        .filter(role::Column::Id.is_in(ids.iter().copied()))
        .lock_shared()
        .all(conn)
        .await?;
    resolve_associations("Role", &ids, found, |r| r.id)
}

async fn replace_roles<C: ConnectionTrait>(conn: &C, user_id: i64, roles: &[role::Model]) -> Result<(), sea_orm::DbErr> {
    user_role::Entity::delete_many()
        .filter(user_role::Column::UserId.eq(user_id))
        .exec(conn)
        .await?;
    if roles.is_empty() {
        return Ok(());
    }
    let links = roles.iter().map(|r| user_role::ActiveModel { user_id: Set(user_id), role_id: Set(r.id) });
    user_role::Entity::insert_many(links).exec_without_returning(conn).await?;
    Ok(())
}

#[async_trait::async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn find_page(&self, request: &PageRequest) -> Result<Page<UserRecord>, ServiceError> {
        let mut query = user::Entity::find();
        for order in &request.sort {
            if let Some(col) = sort_column(&order.property) {
                query = query.order_by(col, order.direction.into());
            }
        }
        let paginator = query.order_by_asc(user::Column::Id).paginate(&self.db, request.size);
        let total = paginator.num_items().await?;
        if !request.has_rows(total) {
            return Ok(Page::new(Vec::new(), request, total));
        }
        let rows = paginator.fetch_page(request.page).await?;
        let roles = rows.load_many_to_many(role::Entity, user_role::Entity, &self.db).await?;
        let records = rows.into_iter().zip(roles).map(|(user, roles)| UserRecord { user, roles }).collect();
        Ok(Page::new(records, request, total))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>, ServiceError> {
        let Some(user) = user::Entity::find_by_id(id).one(&self.db).await? else { return Ok(None) };
        let roles = user.find_related(role::Entity).all(&self.db).await?;
        Ok(Some(UserRecord { user, roles }))
    }

    async fn exists(&self, id: i64) -> Result<bool, ServiceError> {
        Ok(user::Entity::find_by_id(id).count(&self.db).await? > 0)
    }

    async fn insert(
        &self,
        fields: UserFields,
        password_hash: String,
        roles: Vec<role::Model>,
    ) -> Result<UserRecord, ServiceError> {
        let txn = self.db.begin().await?;
        let roles = lock_roles(&txn, &roles).await?;
        let am = user::ActiveModel {
            first_name: Set(fields.first_name),
            last_name: Set(fields.last_name),
            email: Set(fields.email),
            password: Set(password_hash),
            ..Default::default()
        };
        let user = am.insert(&txn).await?;
        replace_roles(&txn, user.id, &roles).await?;
        txn.commit().await?;
        Ok(UserRecord { user, roles })
    }

    async fn update(&self, id: i64, fields: UserFields, roles: Vec<role::Model>) -> Result<Option<UserRecord>, ServiceError> {
        let txn = self.db.begin().await?;
        let Some(existing) = user::Entity::find_by_id(id).lock_exclusive().one(&txn).await? else {
            return Ok(None);
        };
        let roles = lock_roles(&txn, &roles).await?;
        let mut am: user::ActiveModel = existing.into();
        am.first_name = Set(fields.first_name);
        am.last_name = Set(fields.last_name);
        am.email = Set(fields.email);
        let user = am.update(&txn).await?;
        replace_roles(&txn, id, &roles).await?;
        txn.commit().await?;
        Ok(Some(UserRecord { user, roles }))
    }

    async fn delete(&self, id: i64) -> Result<bool, ServiceError> {
        let res = user::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(res.rows_affected > 0)
    }
}

#[async_trait::async_trait]
impl RoleRepository for SeaOrmRoleRepository {
    async fn find_all(&self) -> Result<Vec<role::Model>, ServiceError> {
        Ok(role::Entity::find().order_by_asc(role::Column::Id).all(&self.db).await?)
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<role::Model>, ServiceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = role::Entity::find()
            .filter(role::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await?;
        Ok(rows)
    }
}
