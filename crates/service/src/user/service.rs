use std::sync::Arc;

use models::role;
use tracing::{info, instrument};

use super::repository::{RoleRepository, UserRecord, UserRepository};
use crate::dto::{RoleDto, UserDto, UserInsertDto};
use crate::errors::ServiceError;
use crate::hashing::CredentialHasher;
use crate::mapping::{association_ids, resolve_associations, role_to_dto, user_fields, user_to_dto};
use crate::pagination::{Page, PageRequest};

/// User use cases. Mirrors the product service with roles in place of categories; the
/// password is hashed on insert and never read back.
pub struct UserService {
    users: Arc<dyn UserRepository>,
    roles: Arc<dyn RoleRepository>,
    hasher: Arc<dyn CredentialHasher>,
}

fn to_dto(record: &UserRecord) -> UserDto { user_to_dto(&record.user, &record.roles) }

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, roles: Arc<dyn RoleRepository>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self { users, roles, hasher }
    }

    async fn resolve_roles(&self, dto: &UserDto) -> Result<Vec<role::Model>, ServiceError> {
        let ids = association_ids(dto.roles.iter().map(|r| r.id));
        let found = self.roles.find_by_ids(&ids).await?;
        resolve_associations("Role", &ids, found, |r| r.id)
    }

    #[instrument(skip(self))]
    pub async fn find_all_paged(&self, request: PageRequest) -> Result<Page<UserDto>, ServiceError> {
        let page = self.users.find_page(&request).await?;
        Ok(page.map(|r| to_dto(&r)))
    }

    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: i64) -> Result<UserDto, ServiceError> {
        let record = self.users.find_by_id(id).await?.ok_or_else(|| ServiceError::not_found("User", id))?;
        Ok(to_dto(&record))
    }

    /// Create a user with a hashed password.
    ///
    /// # Examples
    /// ```
    /// use service::{memory::MemoryStore, hashing::Argon2Hasher, user::UserService};
    /// use service::dto::{RoleDto, UserDto, UserInsertDto};
    /// use std::sync::Arc;
    /// let store = Arc::new(MemoryStore::new());
    /// let operator = store.seed_role("ROLE_OPERATOR");
    /// let svc = UserService::new(store.clone(), store, Arc::new(Argon2Hasher));
    /// let input = UserInsertDto {
    ///     user: UserDto {
    ///         id: None,
    ///         first_name: "Maria".into(),
    ///         last_name: "Green".into(),
    ///         email: "maria@gmail.com".into(),
    ///         roles: vec![RoleDto { id: Some(operator.id), authority: String::new() }],
    ///     },
    ///     password: "123456789".into(),
    /// };
    /// let user = tokio_test::block_on(svc.insert(input)).unwrap();
    /// assert_eq!(user.roles[0].authority, "ROLE_OPERATOR");
    /// ```
    #[instrument(skip(self, dto), fields(email = %dto.user.email))]
    pub async fn insert(&self, dto: UserInsertDto) -> Result<UserDto, ServiceError> {
        let roles = self.resolve_roles(&dto.user).await?;
        let hash = self.hasher.hash(&dto.password)?;
        let record = self.users.insert(user_fields(&dto.user), hash, roles).await?;
        info!(user_id = record.user.id, email = %record.user.email, "user_created");
        Ok(to_dto(&record))
    }

    /// Overwrite profile fields and replace the role set; the password is left unchanged.
    #[instrument(skip(self, dto))]
    pub async fn update(&self, id: i64, dto: UserDto) -> Result<UserDto, ServiceError> {
        if !self.users.exists(id).await? {
            return Err(ServiceError::not_found("User", id));
        }
        let roles = self.resolve_roles(&dto).await?;
        let record = self
            .users
            .update(id, user_fields(&dto), roles)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", id))?;
        info!(user_id = id, "user_updated");
        Ok(to_dto(&record))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        if !self.users.delete(id).await? {
            return Err(ServiceError::not_found("User", id));
        }
        info!(user_id = id, "user_deleted");
        Ok(())
    }

    pub async fn find_all_roles(&self) -> Result<Vec<RoleDto>, ServiceError> {
        let roles = self.roles.find_all().await?;
        Ok(roles.iter().map(role_to_dto).collect())
    }
}
