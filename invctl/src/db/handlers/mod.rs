//! Repository implementations for database access.
//!
//! Each repository wraps a `&mut PgConnection`, so it can run against a pooled
//! connection or inside an open transaction. The caller decides which.
//!
//! # Available Repositories
//!
//! - [`Categories`]: category rows
//! - [`Products`]: product scalar fields, plus row locking for tag reconciliation
//! - [`Tags`]: tag rows
//! - [`ProductTags`]: the product/tag association table; implements
//!   [`crate::sync::product_tags::TagLinkStore`]
//!
//! # Common Pattern
//!
//! ```ignore
//! use invctl::db::handlers::{Products, Repository};
//!
//! async fn example(pool: &sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
//!     let mut tx = pool.begin().await?;
//!     let mut repo = Products::new(&mut tx);
//!     let products = repo.list().await?;
//!     tx.commit().await?;
//!     Ok(())
//! }
//! ```

pub mod categories;
pub mod product_tags;
pub mod products;
pub mod repository;
pub mod tags;

pub use categories::Categories;
pub use product_tags::ProductTags;
pub use products::Products;
pub use repository::Repository;
pub use tags::Tags;
