//! Database models for products.
//!
//! Only the scalar columns live here. The product's tag set is stored in
//! `product_tags` and maintained by [`crate::sync::product_tags`].

use crate::api::models::products::ProductCreate;
use crate::types::{CategoryId, ProductId};
use bon::Builder;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Database request for creating a new product
#[derive(Debug, Clone, Builder)]
pub struct ProductCreateDBRequest {
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
    pub category_id: Option<CategoryId>,
}

impl From<&ProductCreate> for ProductCreateDBRequest {
    fn from(api: &ProductCreate) -> Self {
        Self {
            name: api.product_name.clone(),
            price: api.price,
            stock: api.stock,
            category_id: api.category_id,
        }
    }
}

/// Database request for replacing a product's scalar fields
#[derive(Debug, Clone)]
pub struct ProductUpdateDBRequest {
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
    pub category_id: Option<CategoryId>,
}

impl From<&ProductCreate> for ProductUpdateDBRequest {
    fn from(api: &ProductCreate) -> Self {
        Self {
            name: api.product_name.clone(),
            price: api.price,
            stock: api.stock,
            category_id: api.category_id,
        }
    }
}

/// Database response for a product
#[derive(Debug, Clone)]
pub struct ProductDBResponse {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
    pub category_id: Option<CategoryId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
