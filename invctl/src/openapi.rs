//! OpenAPI documentation for the inventory API at `/api/*`.

use crate::api;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "invctl",
        description = "Inventory API for categories, products and tags."
    ),
    servers(
        (url = "/api", description = "Inventory API server")
    ),
    paths(
        api::handlers::categories::list_categories,
        api::handlers::categories::get_category,
        api::handlers::categories::create_category,
        api::handlers::categories::replace_category,
        api::handlers::categories::delete_category,
        api::handlers::products::list_products,
        api::handlers::products::get_product,
        api::handlers::products::create_product,
        api::handlers::products::replace_product,
        api::handlers::products::delete_product,
        api::handlers::tags::list_tags,
        api::handlers::tags::get_tag,
        api::handlers::tags::create_tag,
        api::handlers::tags::replace_tag,
        api::handlers::tags::delete_tag,
    ),
    components(
        schemas(
            api::models::MessageResponse,
            api::models::categories::CategoryCreate,
            api::models::categories::CategoryResponse,
            api::models::products::ProductCreate,
            api::models::products::ProductResponse,
            api::models::tags::TagCreate,
            api::models::tags::TagResponse,
        )
    ),
    tags(
        (name = "categories", description = "Product categories. Deleting a category keeps its products."),
        (name = "products", description = "Products with their category and tags. \
            Sending `tag_ids` on create or replace sets the product's tags to exactly that list."),
        (name = "tags", description = "Tags that can be attached to products."),
    )
)]
pub struct ApiDoc;
