use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use configs::{AppConfig, PaginationConfig, ServerConfig};
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use service::category::{repo::seaorm::SeaOrmCategoryRepository, repository::CategoryRepository, CategoryService};
use service::hashing::Argon2Hasher;
use service::memory::MemoryStore;
use service::product::{repo::seaorm::SeaOrmProductRepository, repository::ProductRepository, ProductService};
use service::user::repo::seaorm::{SeaOrmRoleRepository, SeaOrmUserRepository};
use service::user::repository::{RoleRepository, UserRepository};
use service::user::UserService;

use crate::errors::StartupError;
use crate::routes;
use crate::state::AppState;

/// Repository handles the services are assembled from.
#[derive(Clone)]
pub struct Repositories {
    pub products: Arc<dyn ProductRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub users: Arc<dyn UserRepository>,
    pub roles: Arc<dyn RoleRepository>,
}

impl Repositories {
    pub fn seaorm(db: DatabaseConnection) -> Self {
        Self {
            products: Arc::new(SeaOrmProductRepository { db: db.clone() }),
            categories: Arc::new(SeaOrmCategoryRepository { db: db.clone() }),
            users: Arc::new(SeaOrmUserRepository { db: db.clone() }),
            roles: Arc::new(SeaOrmRoleRepository { db }),
        }
    }

    pub fn memory(store: Arc<MemoryStore>) -> Self {
        Self { products: store.clone(), categories: store.clone(), users: store.clone(), roles: store }
    }
}

/// Composition root: wire repositories into services.
pub fn build_state(repos: Repositories, paging: PaginationConfig) -> AppState {
    AppState {
        products: Arc::new(ProductService::new(repos.products, repos.categories.clone())),
        categories: Arc::new(CategoryService::new(repos.categories)),
        users: Arc::new(UserService::new(repos.users, repos.roles, Arc::new(Argon2Hasher))),
        paging,
    }
}

pub fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// `config.toml` (or `CONFIG_PATH`) when present, otherwise environment variables only.
pub fn load_config() -> Result<AppConfig, StartupError> {
    let mut cfg = match configs::load_default() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(error = %e, "config file unavailable, using environment");
            AppConfig::from_env()
        }
    };
    cfg.normalize_and_validate().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    Ok(cfg)
}

fn bind_addr(server: &ServerConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", server.host, server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("server address: {}", e)))
}

/// Connect, migrate when enabled, and serve until `shutdown` resolves.
pub async fn run(cfg: AppConfig, shutdown: impl std::future::Future<Output = ()> + Send + 'static) -> Result<(), StartupError> {
    let db = models::db::connect_with_config(&cfg.database)
        .await
        .map_err(|e| StartupError::Database(e.to_string()))?;
    models::db::test_connection(&db).await.map_err(|e| StartupError::Database(e.to_string()))?;
    if cfg.database.auto_migrate {
        migration::Migrator::up(&db, None).await.context("apply migrations")?;
        info!("schema migrations applied");
    }

    let state = build_state(Repositories::seaorm(db), cfg.pagination);
    let app: Router = routes::build_router(state, build_cors());

    let addr = bind_addr(&cfg.server)?;
    info!(%addr, "catalog server listening");
    let listener = TcpListener::bind(addr).await.with_context(|| format!("bind {}", addr))?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await.context("serve")?;
    Ok(())
}
