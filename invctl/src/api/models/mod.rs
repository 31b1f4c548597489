//! API request and response data models.
//!
//! This module contains the data structures used for HTTP request deserialization
//! and response serialization. These models define the public API contract.
//!
//! # Design Principles
//!
//! - **Separation of Concerns**: API models are distinct from database models,
//!   allowing independent evolution of API and storage representations
//! - **Explicit schema**: request bodies reject unknown fields and carry a
//!   `validate()` method that is run before anything reaches the store
//! - **OpenAPI**: All models are annotated with `utoipa` for automatic API docs
//!
//! # Modules
//!
//! - [`categories`]: Category bodies and responses
//! - [`products`]: Product bodies (including the desired tag set) and responses
//! - [`tags`]: Tag bodies and responses

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod categories;
pub mod products;
pub mod tags;

/// Upper bound on the length of every name column
pub const MAX_NAME_LENGTH: usize = 255;

/// Body returned by endpoints that only acknowledge an action
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "product was deleted")]
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Names must contain something other than whitespace and fit the column.
pub(crate) fn validate_name(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::bad_request(format!("{field} must not be blank")));
    }
    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(Error::bad_request(format!(
            "{field} must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}
