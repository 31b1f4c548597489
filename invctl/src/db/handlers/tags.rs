//! Database repository for tags.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::tags::{TagCreateDBRequest, TagDBResponse, TagUpdateDBRequest},
};
use crate::types::TagId;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};
use std::collections::HashMap;
use tracing::instrument;

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct Tag {
    pub id: TagId,
    pub tag_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Tag> for TagDBResponse {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.tag_name,
            created_at: tag.created_at,
            updated_at: tag.updated_at,
        }
    }
}

pub struct Tags<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Tags<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Tags<'c> {
    type CreateRequest = TagCreateDBRequest;
    type UpdateRequest = TagUpdateDBRequest;
    type Response = TagDBResponse;
    type Id = TagId;

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let tag = sqlx::query_as::<_, Tag>("INSERT INTO tags (tag_name) VALUES ($1) RETURNING *")
            .bind(&request.name)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(TagDBResponse::from(tag))
    }

    #[instrument(skip(self), fields(tag_id = id), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let tag = sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(tag.map(TagDBResponse::from))
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<TagId>) -> Result<HashMap<TagId, TagDBResponse>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let tags = sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE id = ANY($1)")
            .bind(&ids)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(tags.into_iter().map(|t| (t.id, TagDBResponse::from(t))).collect())
    }

    #[instrument(skip(self), err)]
    async fn list(&mut self) -> Result<Vec<Self::Response>> {
        let tags = sqlx::query_as::<_, Tag>("SELECT * FROM tags ORDER BY id")
            .fetch_all(&mut *self.db)
            .await?;

        Ok(tags.into_iter().map(TagDBResponse::from).collect())
    }

    /// Fails with `DbError::ForeignKeyViolation` while any product still carries the tag.
    #[instrument(skip(self), fields(tag_id = id), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(tag_id = id), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let tag = sqlx::query_as::<_, Tag>(
            r#"
            UPDATE tags SET
                tag_name = $2,
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

        Ok(TagDBResponse::from(tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_tag_crud(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Tags::new(&mut conn);

        let tag = repo
            .create(&TagCreateDBRequest { name: "rock music".to_string() })
            .await
            .expect("Failed to create tag");

        let replaced = repo
            .update(tag.id, &TagUpdateDBRequest { name: "pop music".to_string() })
            .await
            .unwrap();
        assert_eq!(replaced.name, "pop music");

        let all = repo.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "pop music");

        assert!(repo.delete(tag.id).await.unwrap());
        assert!(repo.get_by_id(tag.id).await.unwrap().is_none());
        assert!(!repo.delete(tag.id).await.unwrap());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_blank_tag_name_hits_check_constraint(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let result = Tags::new(&mut conn).create(&TagCreateDBRequest { name: "  ".to_string() }).await;
        assert!(matches!(result, Err(DbError::CheckViolation { .. })));
    }
}
