use crate::AppState;
use crate::api::extract::{AppJson, AppPath};
use crate::api::models::{
    MessageResponse,
    categories::{CategoryCreate, CategoryResponse},
    products::ProductResponse,
};
use crate::db::handlers::{Categories, Products, Repository};
use crate::db::models::categories::{CategoryCreateDBRequest, CategoryUpdateDBRequest};
use crate::errors::{Error, Result};
use crate::types::{CategoryId, Resource};
use axum::{Json, extract::State, http::StatusCode};

#[utoipa::path(
    get,
    path = "/categories",
    tag = "categories",
    summary = "List categories",
    responses(
        (status = 200, description = "Every category with its products", body = Vec<CategoryResponse>),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<CategoryResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let categories = Categories::new(&mut conn).list().await?;
    let category_ids: Vec<CategoryId> = categories.iter().map(|c| c.id).collect();
    let mut products_by_category = Products::new(&mut conn).get_categories_products_bulk(&category_ids).await?;

    let response = categories
        .into_iter()
        .map(|category| {
            let products = products_by_category
                .remove(&category.id)
                .unwrap_or_default()
                .into_iter()
                .map(ProductResponse::from)
                .collect();
            CategoryResponse::from(category).with_products(products)
        })
        .collect();

    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/categories/{category_id}",
    tag = "categories",
    summary = "Get category",
    responses(
        (status = 200, description = "Category with its products", body = CategoryResponse),
        (status = 400, description = "Malformed category ID"),
        (status = 404, description = "Category not found"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("category_id" = i32, Path, description = "Category ID")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_category(State(state): State<AppState>, AppPath(category_id): AppPath<CategoryId>) -> Result<Json<CategoryResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let category = Categories::new(&mut conn)
        .get_by_id(category_id)
        .await?
        .ok_or_else(|| Error::not_found(Resource::Categories, category_id))?;

    let products = Products::new(&mut conn)
        .get_categories_products_bulk(&[category_id])
        .await?
        .remove(&category_id)
        .unwrap_or_default()
        .into_iter()
        .map(ProductResponse::from)
        .collect();

    Ok(Json(CategoryResponse::from(category).with_products(products)))
}

#[utoipa::path(
    post,
    path = "/categories",
    tag = "categories",
    summary = "Create category",
    request_body = CategoryCreate,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Invalid request"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_category(
    State(state): State<AppState>,
    AppJson(create): AppJson<CategoryCreate>,
) -> Result<(StatusCode, Json<CategoryResponse>)> {
    create.validate()?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let category = Categories::new(&mut conn).create(&CategoryCreateDBRequest::from(create)).await?;

    Ok((StatusCode::CREATED, Json(CategoryResponse::from(category))))
}

#[utoipa::path(
    put,
    path = "/categories/{category_id}",
    tag = "categories",
    summary = "Replace category",
    request_body = CategoryCreate,
    responses(
        (status = 200, description = "Category replaced", body = CategoryResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Category not found"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("category_id" = i32, Path, description = "Category ID")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn replace_category(
    State(state): State<AppState>,
    AppPath(category_id): AppPath<CategoryId>,
    AppJson(update): AppJson<CategoryCreate>,
) -> Result<Json<CategoryResponse>> {
    update.validate()?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let category = Categories::new(&mut conn)
        .update(category_id, &CategoryUpdateDBRequest::from(update))
        .await
        .map_err(|e| Error::from_db_for(e, Resource::Categories, category_id))?;

    Ok(Json(CategoryResponse::from(category)))
}

#[utoipa::path(
    delete,
    path = "/categories/{category_id}",
    tag = "categories",
    summary = "Delete category",
    description = "Products in the category are kept, with their category cleared.",
    responses(
        (status = 200, description = "Category deleted", body = MessageResponse),
        (status = 404, description = "Category not found"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("category_id" = i32, Path, description = "Category ID")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_category(State(state): State<AppState>, AppPath(category_id): AppPath<CategoryId>) -> Result<Json<MessageResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    if Categories::new(&mut conn).delete(category_id).await? {
        Ok(Json(MessageResponse::new("category was deleted")))
    } else {
        Err(Error::not_found(Resource::Categories, category_id))
    }
}
