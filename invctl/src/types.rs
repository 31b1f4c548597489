//! Common type definitions.
//!
//! # ID Types
//!
//! Every entity is keyed by a server-generated `SERIAL` column, exposed through
//! type aliases so signatures say which table an id belongs to:
//!
//! - [`CategoryId`]: Category identifier
//! - [`ProductId`]: Product identifier
//! - [`TagId`]: Tag identifier
//!
//! # Resources
//!
//! [`Resource`] names the entity kind in log fields and user-facing error messages.

use std::fmt;

// Type aliases for IDs
pub type CategoryId = i32;
pub type ProductId = i32;
pub type TagId = i32;

// Resources exposed by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Categories,
    Products,
    Tags,
}

impl Resource {
    /// Singular display name, as used in "Product with ID 7 not found"
    pub fn singular(&self) -> &'static str {
        match self {
            Resource::Categories => "Category",
            Resource::Products => "Product",
            Resource::Tags => "Tag",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Categories => write!(f, "categories"),
            Resource::Products => write!(f, "products"),
            Resource::Tags => write!(f, "tags"),
        }
    }
}
