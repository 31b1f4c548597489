//! Database repository for products.
//!
//! Only scalar columns are written here. Tag membership is reconciled separately
//! through [`crate::db::handlers::ProductTags`].

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::products::{ProductCreateDBRequest, ProductDBResponse, ProductUpdateDBRequest},
};
use crate::types::{CategoryId, ProductId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection};
use std::collections::HashMap;
use tracing::instrument;

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct Product {
    pub id: ProductId,
    pub product_name: String,
    pub price: Decimal,
    pub stock: i32,
    pub category_id: Option<CategoryId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductDBResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.product_name,
            price: product.price,
            stock: product.stock,
            category_id: product.category_id,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

pub struct Products<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Products<'c> {
    type CreateRequest = ProductCreateDBRequest;
    type UpdateRequest = ProductUpdateDBRequest;
    type Response = ProductDBResponse;
    type Id = ProductId;

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (product_name, price, stock, category_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&request.name)
        .bind(request.price)
        .bind(request.stock)
        .bind(request.category_id)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(ProductDBResponse::from(product))
    }

    #[instrument(skip(self), fields(product_id = id), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(product.map(ProductDBResponse::from))
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<ProductId>) -> Result<HashMap<ProductId, ProductDBResponse>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let products = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(products.into_iter().map(|p| (p.id, ProductDBResponse::from(p))).collect())
    }

    #[instrument(skip(self), err)]
    async fn list(&mut self) -> Result<Vec<Self::Response>> {
        let products = sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY id")
            .fetch_all(&mut *self.db)
            .await?;

        Ok(products.into_iter().map(ProductDBResponse::from).collect())
    }

    /// Association rows go with the product (`ON DELETE CASCADE`).
    #[instrument(skip(self), fields(product_id = id), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(product_id = id), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        // Whole-record replace: every scalar column is overwritten, including a NULL category
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                product_name = $2,
                price = $3,
                stock = $4,
                category_id = $5,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.name)
        .bind(request.price)
        .bind(request.stock)
        .bind(request.category_id)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(ProductDBResponse::from(product))
    }
}

impl<'c> Products<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Take a row lock on the product for the rest of the enclosing transaction.
    ///
    /// Returns false when the product does not exist. Outside a transaction the
    /// lock is released as soon as the statement completes.
    #[instrument(skip(self), fields(product_id = id), err)]
    pub async fn lock(&mut self, id: ProductId) -> Result<bool> {
        let row = sqlx::query_scalar::<_, ProductId>("SELECT id FROM products WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(row.is_some())
    }

    // Bulk relationship fetching to avoid N+1 queries

    #[instrument(skip(self, category_ids), fields(count = category_ids.len()), err)]
    pub async fn get_categories_products_bulk(
        &mut self,
        category_ids: &[CategoryId],
    ) -> Result<HashMap<CategoryId, Vec<ProductDBResponse>>> {
        if category_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let products = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE category_id = ANY($1) ORDER BY id")
            .bind(category_ids)
            .fetch_all(&mut *self.db)
            .await?;

        let mut result: HashMap<CategoryId, Vec<ProductDBResponse>> = HashMap::new();
        for product in products {
            if let Some(category_id) = product.category_id {
                result.entry(category_id).or_default().push(ProductDBResponse::from(product));
            }
        }

        Ok(result)
    }
}
