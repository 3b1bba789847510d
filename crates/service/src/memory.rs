//! In-process store implementing every repository trait.
//!
//! Backs unit tests, HTTP tests and benchmarks. Enforces the same integrity rules as the
//! relational schema: unique email and no deletion of a category still referenced by a
//! product. Association targets that no longer exist at write time are `NotFound`.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use models::{category, product, role, user};

use crate::category::repository::CategoryRepository;
use crate::errors::ServiceError;
use crate::pagination::{Direction, Page, PageRequest, SortOrder};
use crate::product::repository::{ProductFields, ProductRecord, ProductRepository};
use crate::user::repository::{RoleRepository, UserFields, UserRecord, UserRepository};

#[derive(Default)]
struct State {
    last_id: i64,
    categories: BTreeMap<i64, category::Model>,
    products: BTreeMap<i64, product::Model>,
    product_categories: BTreeSet<(i64, i64)>,
    roles: BTreeMap<i64, role::Model>,
    users: BTreeMap<i64, user::Model>,
    user_roles: BTreeSet<(i64, i64)>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn product_record(&self, product: &product::Model) -> ProductRecord {
        let categories = linked(&self.product_categories, product.id)
            .filter_map(|id| self.categories.get(&id).cloned())
            .collect();
        ProductRecord { product: product.clone(), categories }
    }

    fn user_record(&self, user: &user::Model) -> UserRecord {
        let roles = linked(&self.user_roles, user.id).filter_map(|id| self.roles.get(&id).cloned()).collect();
        UserRecord { user: user.clone(), roles }
    }

    fn link_categories(&mut self, product_id: i64, categories: &[category::Model]) -> Result<(), ServiceError> {
        if let Some(gone) = categories.iter().find(|c| !self.categories.contains_key(&c.id)) {
            return Err(ServiceError::not_found("Category", gone.id));
        }
        self.product_categories.retain(|(p, _)| *p != product_id);
        self.product_categories.extend(categories.iter().map(|c| (product_id, c.id)));
        Ok(())
    }

    fn link_roles(&mut self, user_id: i64, roles: &[role::Model]) -> Result<(), ServiceError> {
        if let Some(gone) = roles.iter().find(|r| !self.roles.contains_key(&r.id)) {
            return Err(ServiceError::not_found("Role", gone.id));
        }
        self.user_roles.retain(|(u, _)| *u != user_id);
        self.user_roles.extend(roles.iter().map(|r| (user_id, r.id)));
        Ok(())
    }

    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.users.values().any(|u| u.email == email && Some(u.id) != except)
    }
}

/// Right-hand ids linked to `owner` in a join set.
fn linked(links: &BTreeSet<(i64, i64)>, owner: i64) -> impl Iterator<Item = i64> + '_ {
    links.range((owner, i64::MIN)..=(owner, i64::MAX)).map(|(_, target)| *target)
}

/// Order rows by the requested keys, then by id; slice out the requested page.
fn paged<T>(
    mut rows: Vec<T>,
    request: &PageRequest,
    compare: impl Fn(&str, &T, &T) -> Option<Ordering>,
    id_of: impl Fn(&T) -> i64,
) -> Page<T> {
    rows.sort_by(|a, b| {
        for SortOrder { property, direction } in &request.sort {
            let Some(ord) = compare(property.as_str(), a, b) else { continue };
            let ord = if *direction == Direction::Desc { ord.reverse() } else { ord };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        id_of(a).cmp(&id_of(b))
    });
    let total = rows.len() as u64;
    let content = rows
        .into_iter()
        .skip(usize::try_from(request.offset()).unwrap_or(usize::MAX))
        .take(usize::try_from(request.size).unwrap_or(usize::MAX))
        .collect();
    Page::new(content, request, total)
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    fn state(&self) -> MutexGuard<'_, State> { self.state.lock().unwrap_or_else(PoisonError::into_inner) }

    pub fn seed_category(&self, name: &str) -> category::Model {
        let mut state = self.state();
        let model = category::Model { id: state.next_id(), name: name.to_string() };
        state.categories.insert(model.id, model.clone());
        model
    }

    pub fn seed_role(&self, authority: &str) -> role::Model {
        let mut state = self.state();
        let model = role::Model { id: state.next_id(), authority: authority.to_string() };
        state.roles.insert(model.id, model.clone());
        model
    }

    /// Stored password hash of a user, for assertions on the hashing path.
    pub fn password_of(&self, user_id: i64) -> Option<String> {
        self.state().users.get(&user_id).map(|u| u.password.clone())
    }

    pub fn product_count(&self) -> usize { self.state().products.len() }
}

#[async_trait]
impl CategoryRepository for MemoryStore {
    async fn find_page(&self, request: &PageRequest) -> Result<Page<category::Model>, ServiceError> {
        let rows: Vec<_> = self.state().categories.values().cloned().collect();
        Ok(paged(
            rows,
            request,
            |prop, a, b| match prop {
                "id" => Some(a.id.cmp(&b.id)),
                "name" => Some(a.name.cmp(&b.name)),
                _ => None,
            },
            |c| c.id,
        ))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<category::Model>, ServiceError> {
        Ok(self.state().categories.get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<category::Model>, ServiceError> {
        let state = self.state();
        Ok(state.categories.values().filter(|c| ids.contains(&c.id)).cloned().collect())
    }

    async fn insert(&self, name: String) -> Result<category::Model, ServiceError> {
        let mut state = self.state();
        let model = category::Model { id: state.next_id(), name };
        state.categories.insert(model.id, model.clone());
        Ok(model)
    }

    async fn update(&self, id: i64, name: String) -> Result<Option<category::Model>, ServiceError> {
        let mut state = self.state();
        Ok(state.categories.get_mut(&id).map(|c| {
            c.name = name;
            c.clone()
        }))
    }

    async fn delete(&self, id: i64) -> Result<bool, ServiceError> {
        let mut state = self.state();
        if state.product_categories.iter().any(|(_, c)| *c == id) {
            return Err(ServiceError::integrity_violation());
        }
        Ok(state.categories.remove(&id).is_some())
    }
}

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn find_page(&self, request: &PageRequest) -> Result<Page<ProductRecord>, ServiceError> {
        let state = self.state();
        let rows: Vec<_> = state.products.values().cloned().collect();
        let page = paged(
            rows,
            request,
            |prop, a, b| match prop {
                "id" => Some(a.id.cmp(&b.id)),
                "name" => Some(a.name.cmp(&b.name)),
                "price" => Some(a.price.total_cmp(&b.price)),
                "date" => Some(a.date.cmp(&b.date)),
                _ => None,
            },
            |p| p.id,
        );
        Ok(page.map(|p| state.product_record(&p)))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ProductRecord>, ServiceError> {
        let state = self.state();
        Ok(state.products.get(&id).map(|p| state.product_record(p)))
    }

    async fn exists(&self, id: i64) -> Result<bool, ServiceError> { Ok(self.state().products.contains_key(&id)) }

    async fn insert(
        &self,
        fields: ProductFields,
        date: DateTime<Utc>,
        categories: Vec<category::Model>,
    ) -> Result<ProductRecord, ServiceError> {
        let mut state = self.state();
        let id = state.next_id();
        state.link_categories(id, &categories)?;
        let model = product::Model {
            id,
            name: fields.name,
            description: fields.description,
            price: fields.price,
            img_url: fields.img_url,
            date: date.into(),
        };
        state.products.insert(id, model.clone());
        Ok(state.product_record(&model))
    }

    async fn update(
        &self,
        id: i64,
        fields: ProductFields,
        categories: Vec<category::Model>,
    ) -> Result<Option<ProductRecord>, ServiceError> {
        let mut state = self.state();
        if !state.products.contains_key(&id) {
            return Ok(None);
        }
        state.link_categories(id, &categories)?;
        let Some(model) = state.products.get_mut(&id) else { return Ok(None) };
        model.name = fields.name;
        model.description = fields.description;
        model.price = fields.price;
        model.img_url = fields.img_url;
        let model = model.clone();
        Ok(Some(state.product_record(&model)))
    }

    async fn delete(&self, id: i64) -> Result<bool, ServiceError> {
        let mut state = self.state();
        state.product_categories.retain(|(p, _)| *p != id);
        Ok(state.products.remove(&id).is_some())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_page(&self, request: &PageRequest) -> Result<Page<UserRecord>, ServiceError> {
        let state = self.state();
        let rows: Vec<_> = state.users.values().cloned().collect();
        let page = paged(
            rows,
            request,
            |prop, a, b| match prop {
                "id" => Some(a.id.cmp(&b.id)),
                "firstName" => Some(a.first_name.cmp(&b.first_name)),
                "lastName" => Some(a.last_name.cmp(&b.last_name)),
                "email" => Some(a.email.cmp(&b.email)),
                _ => None,
            },
            |u| u.id,
        );
        Ok(page.map(|u| state.user_record(&u)))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>, ServiceError> {
        let state = self.state();
        Ok(state.users.get(&id).map(|u| state.user_record(u)))
    }

    async fn exists(&self, id: i64) -> Result<bool, ServiceError> { Ok(self.state().users.contains_key(&id)) }

    async fn insert(
        &self,
        fields: UserFields,
        password_hash: String,
        roles: Vec<role::Model>,
    ) -> Result<UserRecord, ServiceError> {
        let mut state = self.state();
        if state.email_taken(&fields.email, None) {
            return Err(ServiceError::integrity_violation());
        }
        let id = state.next_id();
        state.link_roles(id, &roles)?;
        let model = user::Model {
            id,
            first_name: fields.first_name,
            last_name: fields.last_name,
            email: fields.email,
            password: password_hash,
        };
        state.users.insert(id, model.clone());
        Ok(state.user_record(&model))
    }

    async fn update(&self, id: i64, fields: UserFields, roles: Vec<role::Model>) -> Result<Option<UserRecord>, ServiceError> {
        let mut state = self.state();
        if !state.users.contains_key(&id) {
            return Ok(None);
        }
        if state.email_taken(&fields.email, Some(id)) {
            return Err(ServiceError::integrity_violation());
        }
        state.link_roles(id, &roles)?;
        let Some(model) = state.users.get_mut(&id) else { return Ok(None) };
        model.first_name = fields.first_name;
        model.last_name = fields.last_name;
        model.email = fields.email;
        let model = model.clone();
        Ok(Some(state.user_record(&model)))
    }

    async fn delete(&self, id: i64) -> Result<bool, ServiceError> {
        let mut state = self.state();
        state.user_roles.retain(|(u, _)| *u != id);
        Ok(state.users.remove(&id).is_some())
    }
}

#[async_trait]
impl RoleRepository for MemoryStore {
    async fn find_all(&self) -> Result<Vec<role::Model>, ServiceError> {
        Ok(self.state().roles.values().cloned().collect())
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<role::Model>, ServiceError> {
        Ok(self.state().roles.values().filter(|r| ids.contains(&r.id)).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(name: &str, price: f64) -> ProductFields {
        ProductFields { name: name.into(), description: "d".into(), price, img_url: "u".into() }
    }

    #[tokio::test]
    async fn page_sorts_and_slices() {
        let store = MemoryStore::new();
        for (name, price) in [("Cable", 5.0), ("Adapter", 9.0), ("Battery", 5.0)] {
            ProductRepository::insert(&store, fields(name, price), Utc::now(), vec![]).await.unwrap();
        }
        let request = PageRequest::new(0, 2).sorted_by(SortOrder::asc("price")).sorted_by(SortOrder::desc("name"));
        let page = ProductRepository::find_page(&store, &request).await.unwrap();
        let names: Vec<_> = page.content.iter().map(|r| r.product.name.as_str()).collect();
        assert_eq!(names, vec!["Cable", "Battery"]);
        assert_eq!(page.total_elements, 3);
        assert_eq!(page.total_pages, 2);
    }

    #[tokio::test]
    async fn referenced_category_delete_is_rejected() {
        let store = MemoryStore::new();
        let c = store.seed_category("Books");
        let p = ProductRepository::insert(&store, fields("Novel", 1.0), Utc::now(), vec![c.clone()]).await.unwrap();
        let err = CategoryRepository::delete(&store, c.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::IntegrityConflict(_)));

        assert!(ProductRepository::delete(&store, p.product.id).await.unwrap());
        assert!(CategoryRepository::delete(&store, c.id).await.unwrap());
    }

    #[tokio::test]
    async fn vanished_association_target_is_not_found() {
        let store = MemoryStore::new();
        let kept = store.seed_category("Books");
        let stale = store.seed_category("Comics");
        let p = ProductRepository::insert(&store, fields("Novel", 1.0), Utc::now(), vec![kept.clone()]).await.unwrap();
        assert!(CategoryRepository::delete(&store, stale.id).await.unwrap());

        let err = ProductRepository::insert(&store, fields("Manga", 1.0), Utc::now(), vec![stale.clone()])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), format!("Category {} not found", stale.id));
        assert_eq!(store.product_count(), 1);

        let err = ProductRepository::update(&store, p.product.id, fields("Novel II", 2.0), vec![stale]).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        let record = ProductRepository::find_by_id(&store, p.product.id).await.unwrap().unwrap();
        assert_eq!(record.product.name, "Novel");
        assert_eq!(record.categories, vec![kept]);

        let ghost = role::Model { id: 99, authority: "ROLE_GHOST".into() };
        let f = UserFields { first_name: "A".into(), last_name: "B".into(), email: "a@x.com".into() };
        let err = UserRepository::insert(&store, f, "h".into(), vec![ghost]).await.unwrap_err();
        assert_eq!(err.to_string(), "Role 99 not found");
    }

    #[tokio::test]
    async fn email_is_unique_across_insert_and_update() {
        let store = MemoryStore::new();
        let f = |email: &str| UserFields { first_name: "A".into(), last_name: "B".into(), email: email.into() };
        let a = UserRepository::insert(&store, f("a@x.com"), "h".into(), vec![]).await.unwrap();
        UserRepository::insert(&store, f("b@x.com"), "h".into(), vec![]).await.unwrap();
        assert!(UserRepository::insert(&store, f("a@x.com"), "h".into(), vec![]).await.is_err());
        assert!(UserRepository::update(&store, a.user.id, f("b@x.com"), vec![]).await.is_err());
        assert!(UserRepository::update(&store, a.user.id, f("a@x.com"), vec![]).await.unwrap().is_some());
    }
}
