use crate::AppState;
use crate::api::extract::{AppJson, AppPath};
use crate::api::models::{
    MessageResponse,
    products::ProductResponse,
    tags::{TagCreate, TagResponse},
};
use crate::db::errors::DbError;
use crate::db::handlers::{ProductTags, Products, Repository, Tags};
use crate::db::models::tags::{TagCreateDBRequest, TagDBResponse, TagUpdateDBRequest};
use crate::errors::{Error, Result};
use crate::types::{ProductId, Resource, TagId};
use axum::{Json, extract::State, http::StatusCode};
use sqlx::PgConnection;
use std::collections::HashSet;

/// Attach each tag's products using one query for the links and one for the products.
async fn with_products(conn: &mut PgConnection, tags: Vec<TagDBResponse>) -> Result<Vec<TagResponse>> {
    let tag_ids: Vec<TagId> = tags.iter().map(|t| t.id).collect();
    let links = ProductTags::new(&mut *conn).get_tags_products_bulk(&tag_ids).await?;

    let product_ids: Vec<ProductId> = links
        .values()
        .flat_map(|ids| ids.iter())
        .copied()
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let products = Products::new(&mut *conn).get_bulk(product_ids).await?;

    Ok(tags
        .into_iter()
        .map(|tag| {
            let tagged: Vec<ProductResponse> = links
                .get(&tag.id)
                .map(|ids| {
                    ids.iter()
                        .filter_map(|id| products.get(id))
                        .map(|product| ProductResponse::from(product.clone()))
                        .collect()
                })
                .unwrap_or_default();
            TagResponse::from(tag).with_products(tagged)
        })
        .collect())
}

#[utoipa::path(
    get,
    path = "/tags",
    tag = "tags",
    summary = "List tags",
    responses(
        (status = 200, description = "Every tag with the products carrying it", body = Vec<TagResponse>),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_tags(State(state): State<AppState>) -> Result<Json<Vec<TagResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let tags = Tags::new(&mut conn).list().await?;
    Ok(Json(with_products(&mut conn, tags).await?))
}

#[utoipa::path(
    get,
    path = "/tags/{tag_id}",
    tag = "tags",
    summary = "Get tag",
    responses(
        (status = 200, description = "Tag with the products carrying it", body = TagResponse),
        (status = 400, description = "Malformed tag ID"),
        (status = 404, description = "Tag not found"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("tag_id" = i32, Path, description = "Tag ID")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_tag(State(state): State<AppState>, AppPath(tag_id): AppPath<TagId>) -> Result<Json<TagResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let tag = Tags::new(&mut conn)
        .get_by_id(tag_id)
        .await?
        .ok_or_else(|| Error::not_found(Resource::Tags, tag_id))?;

    let mut response = with_products(&mut conn, vec![tag]).await?;
    match response.pop() {
        Some(tag) => Ok(Json(tag)),
        None => Err(Error::not_found(Resource::Tags, tag_id)),
    }
}

#[utoipa::path(
    post,
    path = "/tags",
    tag = "tags",
    summary = "Create tag",
    request_body = TagCreate,
    responses(
        (status = 201, description = "Tag created", body = TagResponse),
        (status = 400, description = "Invalid request"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_tag(State(state): State<AppState>, AppJson(create): AppJson<TagCreate>) -> Result<(StatusCode, Json<TagResponse>)> {
    create.validate()?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let tag = Tags::new(&mut conn).create(&TagCreateDBRequest::from(create)).await?;

    Ok((StatusCode::CREATED, Json(TagResponse::from(tag))))
}

#[utoipa::path(
    put,
    path = "/tags/{tag_id}",
    tag = "tags",
    summary = "Replace tag",
    request_body = TagCreate,
    responses(
        (status = 200, description = "Tag replaced", body = TagResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Tag not found"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("tag_id" = i32, Path, description = "Tag ID")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn replace_tag(
    State(state): State<AppState>,
    AppPath(tag_id): AppPath<TagId>,
    AppJson(update): AppJson<TagCreate>,
) -> Result<Json<TagResponse>> {
    update.validate()?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let tag = Tags::new(&mut conn)
        .update(tag_id, &TagUpdateDBRequest::from(update))
        .await
        .map_err(|e| Error::from_db_for(e, Resource::Tags, tag_id))?;

    Ok(Json(TagResponse::from(tag)))
}

#[utoipa::path(
    delete,
    path = "/tags/{tag_id}",
    tag = "tags",
    summary = "Delete tag",
    description = "A tag can only be deleted once no product carries it.",
    responses(
        (status = 200, description = "Tag deleted", body = MessageResponse),
        (status = 404, description = "Tag not found"),
        (status = 409, description = "Tag is still attached to products"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("tag_id" = i32, Path, description = "Tag ID")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_tag(State(state): State<AppState>, AppPath(tag_id): AppPath<TagId>) -> Result<Json<MessageResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    match Tags::new(&mut conn).delete(tag_id).await {
        Ok(true) => Ok(Json(MessageResponse::new("tag was deleted"))),
        Ok(false) => Err(Error::not_found(Resource::Tags, tag_id)),
        Err(DbError::ForeignKeyViolation { .. }) => Err(Error::Conflict {
            message: format!("Tag with ID {tag_id} is still attached to one or more products"),
        }),
        Err(e) => Err(e.into()),
    }
}
