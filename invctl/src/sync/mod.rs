//! Keeping derived rows in line with what clients ask for.
//!
//! - [`product_tags`]: minimal-write reconciliation of a product's tag associations

pub mod product_tags;
