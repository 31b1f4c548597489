//! API request/response models for categories.

use super::{products::ProductResponse, validate_name};
use crate::db::models::categories::CategoryDBResponse;
use crate::errors::Result;
use crate::types::CategoryId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for creating a category, and the full replacement body for `PUT`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CategoryCreate {
    /// Display name for the category
    #[schema(example = "Shirts")]
    pub category_name: String,
}

impl CategoryCreate {
    pub fn validate(&self) -> Result<()> {
        validate_name("category_name", &self.category_name)
    }
}

/// Full category details returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponse {
    pub id: CategoryId,
    pub category_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Products in this category (attached on list and get)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(no_recursion)]
    pub products: Option<Vec<ProductResponse>>,
}

impl From<CategoryDBResponse> for CategoryResponse {
    fn from(db: CategoryDBResponse) -> Self {
        Self {
            id: db.id,
            category_name: db.name,
            created_at: db.created_at,
            updated_at: db.updated_at,
            products: None,
        }
    }
}

impl CategoryResponse {
    pub fn with_products(mut self, products: Vec<ProductResponse>) -> Self {
        self.products = Some(products);
        self
    }
}
