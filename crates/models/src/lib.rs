//! SeaORM entities for the catalog schema.
//!
//! Products and categories are linked through `product_category`, users and roles through
//! `user_role`. The join rows follow their owning aggregate on delete and block removal of
//! a category or role that is still referenced.

pub mod db;
pub mod category;
pub mod product;
pub mod product_category;
pub mod role;
pub mod user;
pub mod user_role;
