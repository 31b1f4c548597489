//! Database layer for data persistence and access.
//!
//! This module implements the data access layer using SQLx with PostgreSQL.
//! It follows the Repository pattern to provide clean abstractions over database operations.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  (API request handlers)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │ Repositories│  (db::handlers - business logic & queries)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │   Models    │  (db::models - database records)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │  PostgreSQL │
//! └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`handlers`]: Repository implementations for CRUD operations
//! - [`models`]: Database record structures matching table schemas
//! - [`errors`]: Database-specific error types
//!
//! # Repository Pattern
//!
//! The [`handlers`] module provides repository traits and implementations
//! for each database table. Repositories encapsulate all database access
//! for a specific entity type.
//!
//! ## Example Usage
//!
//! ```ignore
//! use invctl::db::handlers::{Categories, Repository};
//!
//! async fn example(pool: &sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
//!     let mut tx = pool.begin().await?;
//!     let mut categories = Categories::new(&mut tx);
//!
//!     let shirts = categories.create(&create_request).await?;
//!     if let Some(found) = categories.get_by_id(shirts.id).await? {
//!         println!("Found category: {}", found.name);
//!     }
//!
//!     tx.commit().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Transactions
//!
//! Repositories work over any `PgConnection`, including an open transaction:
//!
//! ```ignore
//! // Writes spanning several statements: one transaction
//! let mut tx = pool.begin().await?;
//! let product = Products::new(&mut tx).create(&request).await?;
//! apply(&mut ProductTags::new(&mut tx), product.id, &TagDiff::initial(&tag_ids)).await?;
//! tx.commit().await?;
//!
//! // Single reads: a pooled connection is enough
//! let mut conn = pool.acquire().await?;
//! let tags = Tags::new(&mut conn).list().await?;
//! ```
//!
//! # Migrations
//!
//! Database migrations are managed by SQLx and located in the `migrations/` directory.
//! The [`crate::migrator`] function provides access to the migrator:
//!
//! ```ignore
//! invctl::migrator().run(&pool).await?;
//! ```

pub mod errors;
pub mod handlers;
pub mod models;
