//! Database repository for categories.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::categories::{CategoryCreateDBRequest, CategoryDBResponse, CategoryUpdateDBRequest},
};
use crate::types::CategoryId;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};
use std::collections::HashMap;
use tracing::instrument;

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct Category {
    pub id: CategoryId,
    pub category_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Category> for CategoryDBResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.category_name,
            created_at: category.created_at,
            updated_at: category.updated_at,
        }
    }
}

pub struct Categories<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Categories<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Categories<'c> {
    type CreateRequest = CategoryCreateDBRequest;
    type UpdateRequest = CategoryUpdateDBRequest;
    type Response = CategoryDBResponse;
    type Id = CategoryId;

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let category = sqlx::query_as::<_, Category>("INSERT INTO categories (category_name) VALUES ($1) RETURNING *")
            .bind(&request.name)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(CategoryDBResponse::from(category))
    }

    #[instrument(skip(self), fields(category_id = id), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(category.map(CategoryDBResponse::from))
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<CategoryId>) -> Result<HashMap<CategoryId, CategoryDBResponse>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let categories = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(categories.into_iter().map(|c| (c.id, CategoryDBResponse::from(c))).collect())
    }

    #[instrument(skip(self), err)]
    async fn list(&mut self) -> Result<Vec<Self::Response>> {
        let categories = sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY id")
            .fetch_all(&mut *self.db)
            .await?;

        Ok(categories.into_iter().map(CategoryDBResponse::from).collect())
    }

    /// Products in the category survive with a NULL `category_id` (`ON DELETE SET NULL`).
    #[instrument(skip(self), fields(category_id = id), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(category_id = id), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories SET
                category_name = $2,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.name)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(CategoryDBResponse::from(category))
    }
}
