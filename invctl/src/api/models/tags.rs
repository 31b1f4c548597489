//! API request/response models for tags.

use super::{products::ProductResponse, validate_name};
use crate::db::models::tags::TagDBResponse;
use crate::errors::Result;
use crate::types::TagId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for creating a tag, and the full replacement body for `PUT`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct TagCreate {
    #[schema(example = "rock music")]
    pub tag_name: String,
}

impl TagCreate {
    pub fn validate(&self) -> Result<()> {
        validate_name("tag_name", &self.tag_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TagResponse {
    pub id: TagId,
    pub tag_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Products carrying this tag (attached on list and get)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(no_recursion)]
    pub products: Option<Vec<ProductResponse>>,
}

impl From<TagDBResponse> for TagResponse {
    fn from(db: TagDBResponse) -> Self {
        Self {
            id: db.id,
            tag_name: db.name,
            created_at: db.created_at,
            updated_at: db.updated_at,
            products: None,
        }
    }
}

impl TagResponse {
    pub fn with_products(mut self, products: Vec<ProductResponse>) -> Self {
        self.products = Some(products);
        self
    }
}
