//! Database record models matching table schemas.
//!
//! These structs are what repositories accept and return. They are kept separate
//! from the API models so the storage representation and the wire format can
//! evolve independently; API models convert from them with `From`.
//!
//! - [`categories`]: `categories` rows
//! - [`products`]: `products` rows (scalar fields only, tags live in `product_tags`)
//! - [`tags`]: `tags` rows

pub mod categories;
pub mod products;
pub mod tags;
