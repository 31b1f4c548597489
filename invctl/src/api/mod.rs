//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//! - **[`extract`]**: Extractors that report malformed input in the API error format
//!
//! # API Structure
//!
//! Everything is served under `/api`:
//!
//! - **Categories** (`/api/categories/*`)
//! - **Products** (`/api/products/*`)
//! - **Tags** (`/api/tags/*`)
//!
//! # OpenAPI Documentation
//!
//! All endpoints are documented with `utoipa`. The document is served at
//! `/api-docs/openapi.json` and rendered at `/docs` when the server is running.

pub mod extract;
pub mod handlers;
pub mod models;
