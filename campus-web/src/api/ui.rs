//! UI serving routes
//!
//! Pages are static HTML shells embedded at compile time; the scripts they
//! load fetch everything else from `/api`.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};

const PUBLICATIONS_HTML: &str = include_str!("../ui/publications.html");
const PUBLICATIONS_JS: &str = include_str!("../ui/publications.js");
const DEPARTMENTS_HTML: &str = include_str!("../ui/departments.html");
const DEPARTMENTS_JS: &str = include_str!("../ui/departments.js");
const APP_CSS: &str = include_str!("../ui/app.css");

/// GET /
pub async fn serve_root() -> Redirect {
    Redirect::to("/faculty/publications")
}

/// GET /faculty/publications
pub async fn serve_publications_page() -> Html<&'static str> {
    Html(PUBLICATIONS_HTML)
}

/// GET /departments
pub async fn serve_departments_page() -> Html<&'static str> {
    Html(DEPARTMENTS_HTML)
}

/// GET /static/publications.js
pub async fn serve_publications_js() -> Response {
    static_asset("application/javascript", PUBLICATIONS_JS)
}

/// GET /static/departments.js
pub async fn serve_departments_js() -> Response {
    static_asset("application/javascript", DEPARTMENTS_JS)
}

/// GET /static/app.css
pub async fn serve_app_css() -> Response {
    static_asset("text/css", APP_CSS)
}

fn static_asset(content_type: &'static str, body: &'static str) -> Response {
    (
        StatusCode::OK,
        [
            ("content-type", content_type),
            ("cache-control", "no-cache, no-store, must-revalidate"),
        ],
        body,
    )
        .into_response()
}
