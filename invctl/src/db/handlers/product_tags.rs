//! Database access for the `product_tags` association table.

use crate::db::errors::Result;
use crate::sync::product_tags::TagLinkStore;
use crate::types::{ProductId, TagId};
use sqlx::PgConnection;
use std::collections::{HashMap, HashSet};
use tracing::instrument;

pub struct ProductTags<'c> {
    db: &'c mut PgConnection,
}

impl<'c> ProductTags<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    // Bulk relationship fetching to avoid N+1 queries

    #[instrument(skip(self, product_ids), fields(count = product_ids.len()), err)]
    pub async fn get_products_tags_bulk(&mut self, product_ids: &[ProductId]) -> Result<HashMap<ProductId, Vec<TagId>>> {
        if product_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, (ProductId, TagId)>(
            "SELECT product_id, tag_id FROM product_tags WHERE product_id = ANY($1) ORDER BY product_id, tag_id",
        )
        .bind(product_ids)
        .fetch_all(&mut *self.db)
        .await?;

        let mut result: HashMap<ProductId, Vec<TagId>> = HashMap::new();
        for (product_id, tag_id) in rows {
            result.entry(product_id).or_default().push(tag_id);
        }

        Ok(result)
    }

    #[instrument(skip(self, tag_ids), fields(count = tag_ids.len()), err)]
    pub async fn get_tags_products_bulk(&mut self, tag_ids: &[TagId]) -> Result<HashMap<TagId, Vec<ProductId>>> {
        if tag_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, (TagId, ProductId)>(
            "SELECT tag_id, product_id FROM product_tags WHERE tag_id = ANY($1) ORDER BY tag_id, product_id",
        )
        .bind(tag_ids)
        .fetch_all(&mut *self.db)
        .await?;

        let mut result: HashMap<TagId, Vec<ProductId>> = HashMap::new();
        for (tag_id, product_id) in rows {
            result.entry(tag_id).or_default().push(product_id);
        }

        Ok(result)
    }
}

#[async_trait::async_trait]
impl<'c> TagLinkStore for ProductTags<'c> {
    #[instrument(skip(self), err)]
    async fn linked_tag_ids(&mut self, product_id: ProductId) -> Result<HashSet<TagId>> {
        let tag_ids = sqlx::query_scalar::<_, TagId>("SELECT tag_id FROM product_tags WHERE product_id = $1")
            .bind(product_id)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(tag_ids.into_iter().collect())
    }

    #[instrument(skip(self, tag_ids), fields(count = tag_ids.len()), err)]
    async fn unlink_tags(&mut self, product_id: ProductId, tag_ids: &[TagId]) -> Result<u64> {
        let result = sqlx::query("DELETE FROM product_tags WHERE product_id = $1 AND tag_id = ANY($2)")
            .bind(product_id)
            .bind(tag_ids)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected())
    }

    /// An unknown tag id fails the whole insert with `DbError::ForeignKeyViolation`.
    #[instrument(skip(self, tag_ids), fields(count = tag_ids.len()), err)]
    async fn link_tags(&mut self, product_id: ProductId, tag_ids: &[TagId]) -> Result<u64> {
        let result = sqlx::query(
            r#"
            INSERT INTO product_tags (product_id, tag_id)
            SELECT $1, UNNEST($2::int4[])
            "#,
        )
        .bind(product_id)
        .bind(tag_ids)
        .execute(&mut *self.db)
        .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::errors::DbError;
    use crate::db::handlers::{Products, Repository, Tags};
    use crate::db::models::{products::ProductCreateDBRequest, tags::TagCreateDBRequest};
    use crate::sync::product_tags::{TagDiff, apply, reconcile};
    use sqlx::PgPool;

    async fn seed(pool: &PgPool, tag_count: usize) -> (ProductId, Vec<TagId>) {
        let mut conn = pool.acquire().await.unwrap();
        let product = Products::new(&mut conn)
            .create(
                &ProductCreateDBRequest::builder()
                    .name("Basketball".to_string())
                    .price("200.00".parse().unwrap())
                    .stock(3)
                    .build(),
            )
            .await
            .unwrap();

        let mut tags = Vec::new();
        for i in 0..tag_count {
            let tag = Tags::new(&mut conn)
                .create(&TagCreateDBRequest { name: format!("tag {i}") })
                .await
                .unwrap();
            tags.push(tag.id);
        }
        (product.id, tags)
    }

    async fn linked(pool: &PgPool, product_id: ProductId) -> Vec<TagId> {
        sqlx::query_scalar("SELECT tag_id FROM product_tags WHERE product_id = $1 ORDER BY tag_id")
            .bind(product_id)
            .fetch_all(pool)
            .await
            .unwrap()
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_reconcile_against_postgres(pool: PgPool) {
        let (product_id, tags) = seed(&pool, 4).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut store = ProductTags::new(&mut conn);

        apply(&mut store, product_id, &TagDiff::initial(&tags[0..3])).await.unwrap();
        assert_eq!(linked(&pool, product_id).await, tags[0..3].to_vec());

        let diff = reconcile(&mut store, product_id, &tags[1..4]).await.unwrap();
        assert_eq!(diff.to_delete, vec![tags[0]]);
        assert_eq!(diff.to_insert, vec![tags[3]]);
        assert_eq!(linked(&pool, product_id).await, tags[1..4].to_vec());

        let diff = reconcile(&mut store, product_id, &tags[1..4]).await.unwrap();
        assert!(diff.is_empty());

        reconcile(&mut store, product_id, &[]).await.unwrap();
        assert!(linked(&pool, product_id).await.is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_unknown_tag_rolls_back_with_the_transaction(pool: PgPool) {
        let (product_id, tags) = seed(&pool, 1).await;

        let mut tx = pool.begin().await.unwrap();
        let result = reconcile(&mut ProductTags::new(&mut tx), product_id, &[tags[0], 999_999]).await;
        assert!(matches!(result, Err(DbError::ForeignKeyViolation { .. })));
        tx.rollback().await.unwrap();

        assert!(linked(&pool, product_id).await.is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_bulk_maps_in_both_directions(pool: PgPool) {
        let (first, tags) = seed(&pool, 2).await;
        let (second, _) = seed(&pool, 0).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut store = ProductTags::new(&mut conn);
        reconcile(&mut store, first, &tags).await.unwrap();
        reconcile(&mut store, second, &tags[1..]).await.unwrap();

        let by_product = store.get_products_tags_bulk(&[first, second]).await.unwrap();
        assert_eq!(by_product[&first], tags);
        assert_eq!(by_product[&second], vec![tags[1]]);

        let by_tag = store.get_tags_products_bulk(&tags).await.unwrap();
        assert_eq!(by_tag[&tags[0]], vec![first]);
        assert_eq!(by_tag[&tags[1]], vec![first, second]);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_deleting_a_product_drops_its_links(pool: PgPool) {
        let (product_id, tags) = seed(&pool, 2).await;
        let mut conn = pool.acquire().await.unwrap();
        reconcile(&mut ProductTags::new(&mut conn), product_id, &tags).await.unwrap();

        assert!(Products::new(&mut conn).delete(product_id).await.unwrap());
        assert!(linked(&pool, product_id).await.is_empty());

        // Tags survive and can now be deleted
        assert!(Tags::new(&mut conn).delete(tags[0]).await.unwrap());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_linked_tag_cannot_be_deleted(pool: PgPool) {
        let (product_id, tags) = seed(&pool, 1).await;
        let mut conn = pool.acquire().await.unwrap();
        reconcile(&mut ProductTags::new(&mut conn), product_id, &tags).await.unwrap();

        let result = Tags::new(&mut conn).delete(tags[0]).await;
        assert!(matches!(result, Err(DbError::ForeignKeyViolation { .. })));
    }
}
