//! HTTP request handlers for all API endpoints.
//!
//! Each handler validates its input before touching the store, runs its queries through
//! the repositories in [`crate::db::handlers`], and returns [`crate::errors::Error`] on
//! failure, which renders as `{ "error": ... }` with a matching status code.
//!
//! # Handler Modules
//!
//! - [`categories`]: Category CRUD; reads attach the category's products
//! - [`products`]: Product CRUD; create and replace reconcile the product's tags
//! - [`tags`]: Tag CRUD; reads attach the tagged products

pub mod categories;
pub mod products;
pub mod tags;
