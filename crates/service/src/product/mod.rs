//! Products and their category associations.

pub mod repository;
pub mod repo;
pub mod service;

pub use service::ProductService;
