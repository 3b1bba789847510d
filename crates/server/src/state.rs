use std::sync::Arc;

use configs::PaginationConfig;
use service::{category::CategoryService, product::ProductService, user::UserService};

/// Shared handler state; services are immutable and cloned by `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub products: Arc<ProductService>,
    pub categories: Arc<CategoryService>,
    pub users: Arc<UserService>,
    pub paging: PaginationConfig,
}
