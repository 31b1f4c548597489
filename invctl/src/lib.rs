//! # invctl: Inventory Control Layer
//!
//! `invctl` is a REST service for a small retail inventory: categories, products and tags,
//! persisted in PostgreSQL. Products optionally belong to one category and carry any number
//! of tags; the product↔tag association lives in its own join table.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for the HTTP layer and
//! uses PostgreSQL for all persistence.
//!
//! Requests to `/api/*` follow a traditional web application flow. Request bodies and path
//! parameters are decoded by the extractors in [`api::extract`], validated, and handed to the
//! handlers in [`api::handlers`]. Handlers talk to the database through the repositories in
//! [`db::handlers`], which all borrow a single `PgConnection` so that a handler decides where
//! transactions begin and end.
//!
//! ### Tag reconciliation
//!
//! Creating or replacing a product may carry the full desired set of tag IDs. The
//! [`sync::product_tags`] module turns the stored set and the desired set into the minimal
//! [`TagDiff`](sync::product_tags::TagDiff) and applies it: one bulk delete for links that
//! disappeared, one bulk insert for links that are new, nothing when the sets already agree.
//! Whether that happens inside the product's own transaction is governed by
//! [`config::TagSyncConfig`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use invctl::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = invctl::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     invctl::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Database Setup
//!
//! Migrations are embedded and run on startup:
//!
//! ```no_run
//! # use sqlx::PgPool;
//! # async fn example(pool: PgPool) -> Result<(), sqlx::migrate::MigrateError> {
//! invctl::migrator().run(&pool).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.
pub mod api;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod sync;
pub mod telemetry;
pub mod types;

#[cfg(test)]
mod test_utils;

use crate::config::CorsOrigin;
use crate::openapi::ApiDoc;
use api::handlers::{categories, products, tags};
use axum::http::HeaderValue;
use axum::{Router, http, routing::get};
use axum_prometheus::PrometheusMetricLayer;
use bon::Builder;
pub use config::Config;
use sqlx::{
    ConnectOptions, PgPool,
    postgres::{PgConnectOptions, PgPoolOptions},
};
use std::str::FromStr;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use types::{CategoryId, ProductId, TagId};

/// Application state shared across all request handlers.
///
/// # Example
///
/// ```ignore
/// let state = AppState::builder().db(pool).config(config).build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
}

/// Get the invctl database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

fn connect_options(config: &Config) -> anyhow::Result<PgConnectOptions> {
    let options = PgConnectOptions::from_str(&config.database.url)?
        .log_statements(log::LevelFilter::Debug)
        .log_slow_statements(log::LevelFilter::Warn, Duration::from_millis(config.slow_statement_threshold_ms));
    Ok(options)
}

fn pool_options(config: &Config) -> PgPoolOptions {
    let settings = &config.database.pool;
    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(settings.acquire_timeout)
        .idle_timeout(settings.idle_timeout)
        .max_lifetime(settings.max_lifetime)
}

async fn setup_database(config: &Config) -> anyhow::Result<PgPool> {
    info!(
        max_connections = config.database.pool.max_connections,
        "Connecting to database"
    );
    let pool = pool_options(config).connect_with(connect_options(config)?).await?;

    migrator().run(&pool).await?;
    Ok(pool)
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors_config = &config.cors;

    let mut cors = CorsLayer::new()
        .allow_methods([http::Method::GET, http::Method::POST, http::Method::PUT, http::Method::DELETE])
        .allow_headers([http::header::CONTENT_TYPE])
        .expose_headers(vec![http::header::LOCATION]);

    // `*` anywhere in the list admits every origin
    if cors_config.allowed_origins.iter().any(|origin| matches!(origin, CorsOrigin::Wildcard)) {
        cors = cors.allow_origin(Any);
    } else {
        let mut origins = Vec::new();
        for origin in &cors_config.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                origins.push(url.as_str().trim_end_matches('/').parse::<HeaderValue>()?);
            }
        }
        cors = cors.allow_origin(origins).allow_credentials(cors_config.allow_credentials);
    }

    if let Some(max_age) = cors_config.max_age {
        cors = cors.max_age(Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the main application router with all endpoints and middleware.
///
/// This function constructs the complete Axum router with:
/// - Inventory API routes under `/api`
/// - The OpenAPI document at `/api-docs/openapi.json` and its viewer at `/docs`
/// - A liveness probe at `/healthz`
/// - Optional Prometheus metrics at `/internal/metrics`
/// - CORS configuration
/// - Tracing middleware
///
/// # Errors
///
/// Returns an error if the CORS configuration cannot be turned into header values.
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    let api_routes = Router::new()
        .route("/categories", get(categories::list_categories).post(categories::create_category))
        .route(
            "/categories/{category_id}",
            get(categories::get_category)
                .put(categories::replace_category)
                .delete(categories::delete_category),
        )
        .route("/products", get(products::list_products).post(products::create_product))
        .route(
            "/products/{product_id}",
            get(products::get_product)
                .put(products::replace_product)
                .delete(products::delete_product),
        )
        .route("/tags", get(tags::list_tags).post(tags::create_tag))
        .route(
            "/tags/{tag_id}",
            get(tags::get_tag).put(tags::replace_tag).delete(tags::delete_tag),
        )
        .with_state(state.clone());

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route("/api-docs/openapi.json", get(|| async { axum::Json(ApiDoc::openapi()) }))
        .nest("/api", api_routes)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    let cors_layer = create_cors_layer(&state.config)?;
    let mut router = router.layer(cors_layer);

    if state.config.enable_metrics {
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
        router = router
            .route("/internal/metrics", get(|| async move { metric_handle.render() }))
            .layer(prometheus_layer);
    }

    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
}

impl Application {
    /// Create a new application instance: connect, migrate, build the router
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        Self::new_with_pool(config, None).await
    }

    /// Like [`Application::new`], but reuse an existing pool when one is given.
    ///
    /// Migrations still run against the provided pool.
    pub async fn new_with_pool(config: Config, pool: Option<PgPool>) -> anyhow::Result<Self> {
        debug!(
            database_url = %config.database.redacted_url(),
            bind_address = %config.bind_address(),
            enable_metrics = config.enable_metrics,
            tag_sync = ?config.tag_sync,
            "Starting inventory service"
        );

        let pool = match pool {
            Some(pool) => {
                migrator().run(&pool).await?;
                pool
            }
            None => setup_database(&config).await?,
        };

        let app_state = AppState::builder().db(pool.clone()).config(config.clone()).build();
        let router = build_router(&app_state)?;

        Ok(Self { router, config, pool })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "Inventory service listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router).with_graceful_shutdown(shutdown).await?;

        info!("Closing database connections...");
        self.pool.close().await;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}
