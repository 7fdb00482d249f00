//! HTTP API handlers for campus-web

pub mod auth;
pub mod buildinfo;
pub mod debug;
pub mod departments;
pub mod doi;
pub mod health;
pub mod publications;
pub mod ui;

pub use auth::{api_secret_middleware, CurrentUser, Role};
pub use buildinfo::get_build_info;
pub use debug::database_test;
pub use departments::{create_department, list_departments};
pub use doi::lookup_doi;
pub use health::health_routes;
pub use publications::{
    create_publication, delete_publication, list_co_authors, list_publications,
    refresh_citations, update_publication,
};
pub use ui::{
    serve_app_css, serve_departments_js, serve_departments_page, serve_publications_js,
    serve_publications_page, serve_root,
};
