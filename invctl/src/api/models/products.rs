//! API request/response models for products.

use super::{categories::CategoryResponse, tags::TagResponse, validate_name};
use crate::db::models::products::ProductDBResponse;
use crate::errors::{Error, Result};
use crate::types::{CategoryId, ProductId, TagId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Largest price the `NUMERIC(12, 2)` column can hold is just under this
fn price_limit() -> Decimal {
    Decimal::from(10_000_000_000_i64)
}

/// Request body for creating a product, and the full replacement body for `PUT`.
///
/// `tag_ids` is the desired tag set: when present, the product's tags are made to
/// match it exactly (an empty list removes every tag); when absent, tags are left
/// untouched.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ProductCreate {
    #[schema(example = "Basketball")]
    pub product_name: String,
    /// Unit price; accepts a JSON number or a decimal string
    #[schema(value_type = String, example = "200.00")]
    pub price: Decimal,
    /// Units in stock
    #[schema(example = 3)]
    pub stock: i32,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default, alias = "tagIds")]
    #[schema(example = json!([1, 2, 3, 4]))]
    pub tag_ids: Option<Vec<TagId>>,
}

impl ProductCreate {
    pub fn validate(&self) -> Result<()> {
        validate_name("product_name", &self.product_name)?;

        if self.price < Decimal::ZERO {
            return Err(Error::bad_request("price must not be negative"));
        }
        if self.price.normalize().scale() > 2 {
            return Err(Error::bad_request("price must have at most 2 decimal places"));
        }
        if self.price >= price_limit() {
            return Err(Error::bad_request("price is too large"));
        }
        if self.stock < 0 {
            return Err(Error::bad_request("stock must not be negative"));
        }
        Ok(())
    }
}

/// Full product details returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    pub id: ProductId,
    pub product_name: String,
    #[schema(value_type = String, example = "200.00")]
    pub price: Decimal,
    pub stock: i32,
    pub category_id: Option<CategoryId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// The owning category (attached on product endpoints when the product has one)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(no_recursion)]
    pub category: Option<CategoryResponse>,
    /// Tags on this product (attached on product endpoints)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(no_recursion)]
    pub tags: Option<Vec<TagResponse>>,
}

impl From<ProductDBResponse> for ProductResponse {
    fn from(db: ProductDBResponse) -> Self {
        Self {
            id: db.id,
            product_name: db.name,
            price: db.price,
            stock: db.stock,
            category_id: db.category_id,
            created_at: db.created_at,
            updated_at: db.updated_at,
            category: None,
            tags: None,
        }
    }
}

impl ProductResponse {
    pub fn with_relationships(mut self, category: Option<CategoryResponse>, tags: Vec<TagResponse>) -> Self {
        self.category = category;
        self.tags = Some(tags);
        self
    }
}
