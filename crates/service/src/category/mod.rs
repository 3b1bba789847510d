//! Categories: flat aggregate referenced by products.

pub mod repository;
pub mod repo;
pub mod service;

pub use service::CategoryService;
