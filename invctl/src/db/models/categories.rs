//! Database models for categories.

use crate::api::models::categories::CategoryCreate;
use crate::types::CategoryId;
use chrono::{DateTime, Utc};

/// Database request for creating a new category
#[derive(Debug, Clone)]
pub struct CategoryCreateDBRequest {
    pub name: String,
}

impl From<CategoryCreate> for CategoryCreateDBRequest {
    fn from(api: CategoryCreate) -> Self {
        Self { name: api.category_name }
    }
}

/// Database request for replacing a category's fields
#[derive(Debug, Clone)]
pub struct CategoryUpdateDBRequest {
    pub name: String,
}

impl From<CategoryCreate> for CategoryUpdateDBRequest {
    fn from(api: CategoryCreate) -> Self {
        Self { name: api.category_name }
    }
}

/// Database response for a category
#[derive(Debug, Clone)]
pub struct CategoryDBResponse {
    pub id: CategoryId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
