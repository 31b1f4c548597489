//! Product handlers.
//!
//! Create and replace write the scalar fields and then, when the body carries `tag_ids`,
//! reconcile the product's tags to exactly that set. Whether both steps share one
//! transaction follows `tag_sync.consistency`.

use crate::AppState;
use crate::api::extract::{AppJson, AppPath};
use crate::api::models::{
    MessageResponse,
    categories::CategoryResponse,
    products::{ProductCreate, ProductResponse},
    tags::TagResponse,
};
use crate::config::{TagConsistency, TagSyncConfig};
use crate::db::handlers::{Categories, ProductTags, Products, Repository, Tags};
use crate::db::models::products::{ProductCreateDBRequest, ProductDBResponse, ProductUpdateDBRequest};
use crate::errors::{Error, Result};
use crate::sync::product_tags::{TagDiff, apply, reconcile};
use crate::types::{CategoryId, ProductId, Resource, TagId};
use axum::{Json, extract::State, http::StatusCode};
use sqlx::PgConnection;
use std::collections::HashSet;
use tracing::debug;

/// Attach category and tags to each product, with one bulk query per relation.
async fn with_relationships(conn: &mut PgConnection, products: Vec<ProductDBResponse>) -> Result<Vec<ProductResponse>> {
    let product_ids: Vec<ProductId> = products.iter().map(|p| p.id).collect();
    let category_ids: Vec<CategoryId> = products
        .iter()
        .filter_map(|p| p.category_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    let categories = Categories::new(&mut *conn).get_bulk(category_ids).await?;
    let links = ProductTags::new(&mut *conn).get_products_tags_bulk(&product_ids).await?;

    let tag_ids: Vec<TagId> = links
        .values()
        .flat_map(|ids| ids.iter())
        .copied()
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let tags = Tags::new(&mut *conn).get_bulk(tag_ids).await?;

    Ok(products
        .into_iter()
        .map(|product| {
            let category = product
                .category_id
                .and_then(|id| categories.get(&id))
                .map(|c| CategoryResponse::from(c.clone()));
            let product_tags: Vec<TagResponse> = links
                .get(&product.id)
                .map(|ids| ids.iter().filter_map(|id| tags.get(id)).map(|t| TagResponse::from(t.clone())).collect())
                .unwrap_or_default();
            ProductResponse::from(product).with_relationships(category, product_tags)
        })
        .collect())
}

async fn load_one(conn: &mut PgConnection, product: ProductDBResponse) -> Result<ProductResponse> {
    let product_id = product.id;
    with_relationships(conn, vec![product])
        .await?
        .pop()
        .ok_or_else(|| Error::not_found(Resource::Products, product_id))
}

/// Bring the product's tags to `tag_ids`.
///
/// `fresh` marks a product created in this same transaction, which cannot have links yet,
/// so the current set is not read.
async fn sync_tags(conn: &mut PgConnection, settings: &TagSyncConfig, product_id: ProductId, tag_ids: &[TagId], fresh: bool) -> Result<()> {
    if settings.lock_product_row && !Products::new(&mut *conn).lock(product_id).await? {
        return Err(Error::not_found(Resource::Products, product_id));
    }

    let mut store = ProductTags::new(conn);
    let diff = if fresh {
        let diff = TagDiff::initial(tag_ids);
        apply(&mut store, product_id, &diff).await?;
        diff
    } else {
        reconcile(&mut store, product_id, tag_ids).await?
    };

    debug!(product_id, inserted = ?diff.to_insert, deleted = ?diff.to_delete, "Reconciled product tags");
    Ok(())
}

#[utoipa::path(
    get,
    path = "/products",
    tag = "products",
    summary = "List products",
    responses(
        (status = 200, description = "Every product with its category and tags", body = Vec<ProductResponse>),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<ProductResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let products = Products::new(&mut conn).list().await?;
    Ok(Json(with_relationships(&mut conn, products).await?))
}

#[utoipa::path(
    get,
    path = "/products/{product_id}",
    tag = "products",
    summary = "Get product",
    responses(
        (status = 200, description = "Product with its category and tags", body = ProductResponse),
        (status = 400, description = "Malformed product ID"),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("product_id" = i32, Path, description = "Product ID")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_product(State(state): State<AppState>, AppPath(product_id): AppPath<ProductId>) -> Result<Json<ProductResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let product = Products::new(&mut conn)
        .get_by_id(product_id)
        .await?
        .ok_or_else(|| Error::not_found(Resource::Products, product_id))?;

    Ok(Json(load_one(&mut conn, product).await?))
}

#[utoipa::path(
    post,
    path = "/products",
    tag = "products",
    summary = "Create product",
    description = "When `tag_ids` is given the new product is linked to exactly those tags.",
    request_body = ProductCreate,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Invalid request, or an unknown category or tag ID"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_product(
    State(state): State<AppState>,
    AppJson(create): AppJson<ProductCreate>,
) -> Result<(StatusCode, Json<ProductResponse>)> {
    create.validate()?;
    let settings = &state.config.tag_sync;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let product = Products::new(&mut tx).create(&ProductCreateDBRequest::from(&create)).await?;

    if let Some(tag_ids) = &create.tag_ids {
        match settings.consistency {
            TagConsistency::Atomic => sync_tags(&mut tx, settings, product.id, tag_ids, true).await?,
            TagConsistency::Independent => {
                tx.commit().await.map_err(|e| Error::Database(e.into()))?;
                tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
                // Visible to other requests from here on, so read the current set
                sync_tags(&mut tx, settings, product.id, tag_ids, false).await?;
            }
        }
    }

    let response = load_one(&mut tx, product).await?;
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    put,
    path = "/products/{product_id}",
    tag = "products",
    summary = "Replace product",
    description = "Overwrites every scalar field. When `tag_ids` is given the product's tags are made to \
                   match it exactly; when it is omitted the tags are left as they are.",
    request_body = ProductCreate,
    responses(
        (status = 200, description = "Product replaced", body = ProductResponse),
        (status = 400, description = "Invalid request, or an unknown category or tag ID"),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("product_id" = i32, Path, description = "Product ID")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn replace_product(
    State(state): State<AppState>,
    AppPath(product_id): AppPath<ProductId>,
    AppJson(update): AppJson<ProductCreate>,
) -> Result<Json<ProductResponse>> {
    update.validate()?;
    let settings = &state.config.tag_sync;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let product = Products::new(&mut tx)
        .update(product_id, &ProductUpdateDBRequest::from(&update))
        .await
        .map_err(|e| Error::from_db_for(e, Resource::Products, product_id))?;

    if let Some(tag_ids) = &update.tag_ids {
        if settings.consistency == TagConsistency::Independent {
            tx.commit().await.map_err(|e| Error::Database(e.into()))?;
            tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
        }
        sync_tags(&mut tx, settings, product_id, tag_ids, false).await?;
    }

    let response = load_one(&mut tx, product).await?;
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(response))
}

#[utoipa::path(
    delete,
    path = "/products/{product_id}",
    tag = "products",
    summary = "Delete product",
    description = "The product's tag links are removed with it; the tags themselves are kept.",
    responses(
        (status = 200, description = "Product deleted", body = MessageResponse),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("product_id" = i32, Path, description = "Product ID")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_product(State(state): State<AppState>, AppPath(product_id): AppPath<ProductId>) -> Result<Json<MessageResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    if Products::new(&mut conn).delete(product_id).await? {
        Ok(Json(MessageResponse::new("product was deleted")))
    } else {
        Err(Error::not_found(Resource::Products, product_id))
    }
}
