//! campus-web library - faculty management HTTP service
//!
//! Exposes the router and state for integration testing.

use axum::Router;
use campus_common::config::ServerConfig;
use sqlx::MySqlPool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod error;
pub mod services;

pub use crate::error::{ApiError, ApiResult};
use crate::services::DoiService;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// MySQL connection pool
    pub db: MySqlPool,
    /// DOI metadata and citation sources
    pub doi: Arc<DoiService>,
    /// Resolved configuration (shared secret, database summary)
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(db: MySqlPool, doi: DoiService, config: ServerConfig) -> Self {
        Self {
            db,
            doi: Arc::new(doi),
            config: Arc::new(config),
        }
    }
}

/// Build application router
///
/// `/api/**` sits behind the shared secret check; pages, static assets and
/// `/health` do not.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    let protected = Router::new()
        .route(
            "/api/departments",
            get(api::list_departments).post(api::create_department),
        )
        .route(
            "/api/faculty/publications",
            get(api::list_publications)
                .post(api::create_publication)
                .put(api::update_publication)
                .delete(api::delete_publication),
        )
        .route(
            "/api/faculty/publications/:id/co-authors",
            get(api::list_co_authors),
        )
        .route(
            "/api/faculty/publications/:id/refresh-citations",
            post(api::refresh_citations),
        )
        .route("/api/doi", get(api::lookup_doi))
        .route("/api/debug/database-test", get(api::database_test))
        .route("/api/buildinfo", get(api::get_build_info))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::api_secret_middleware,
        ));

    let public = Router::new()
        .route("/", get(api::serve_root))
        .route("/faculty/publications", get(api::serve_publications_page))
        .route("/departments", get(api::serve_departments_page))
        .route("/static/app.css", get(api::serve_app_css))
        .route("/static/publications.js", get(api::serve_publications_js))
        .route("/static/departments.js", get(api::serve_departments_js))
        .merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
