//! Users, their role associations and role lookup.

pub mod repository;
pub mod repo;
pub mod service;

pub use service::UserService;
