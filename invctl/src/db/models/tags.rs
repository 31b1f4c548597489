//! Database models for tags.

use crate::api::models::tags::TagCreate;
use crate::types::TagId;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct TagCreateDBRequest {
    pub name: String,
}

impl From<TagCreate> for TagCreateDBRequest {
    fn from(api: TagCreate) -> Self {
        Self { name: api.tag_name }
    }
}

#[derive(Debug, Clone)]
pub struct TagUpdateDBRequest {
    pub name: String,
}

impl From<TagCreate> for TagUpdateDBRequest {
    fn from(api: TagCreate) -> Self {
        Self { name: api.tag_name }
    }
}

#[derive(Debug, Clone)]
pub struct TagDBResponse {
    pub id: TagId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
