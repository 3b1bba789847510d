//! Service layer for the catalog: products with categories, users with roles.
//! - Repository traits isolate SeaORM; `DbErr` never leaves this crate.
//! - DTO/entity conversion lives in pure functions under `mapping`.
//! - Every failure is a `ServiceError`, matched by the HTTP layer.

pub mod errors;
pub mod pagination;
pub mod dto;
pub mod mapping;
pub mod validation;
pub mod hashing;
pub mod category;
pub mod product;
pub mod user;
pub mod memory;
#[cfg(test)]
pub mod test_support;
