use async_trait::async_trait;
use models::{role, user};

use crate::errors::ServiceError;
use crate::pagination::{Page, PageRequest};

/// Properties a user page may be ordered by.
pub const SORTABLE: &[&str] = &["id", "firstName", "lastName", "email"];

/// A user together with its current role set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub user: user::Model,
    pub roles: Vec<role::Model>,
}

/// Profile fields written on insert and overwritten on update. The password is separate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFields {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Repository abstraction for user persistence.
///
/// Writes re-check the given roles inside their transaction; a missing role is `NotFound`.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_page(&self, request: &PageRequest) -> Result<Page<UserRecord>, ServiceError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>, ServiceError>;
    async fn exists(&self, id: i64) -> Result<bool, ServiceError>;
    /// `password_hash` must already be a one-way hash.
    async fn insert(
        &self,
        fields: UserFields,
        password_hash: String,
        roles: Vec<role::Model>,
    ) -> Result<UserRecord, ServiceError>;
    /// Replaces profile fields and the role set; the stored password is left as is.
    async fn update(&self, id: i64, fields: UserFields, roles: Vec<role::Model>) -> Result<Option<UserRecord>, ServiceError>;
    async fn delete(&self, id: i64) -> Result<bool, ServiceError>;
}

/// Read-only role lookup.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<role::Model>, ServiceError>;
    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<role::Model>, ServiceError>;
}
