//! Bibliographic API clients against mocked services

use campus_common::config::{DatabaseConfig, ServerConfig, SourceConfig};
use campus_common::db::{connect_lazy, CitationSource, PublicationType};
use campus_web::services::google_scholar_client::GoogleScholarClient;
use campus_web::services::scopus_client::ScopusClient;
use campus_web::services::semantic_scholar_client::SemanticScholarClient;
use campus_web::services::web_of_science_client::WebOfScienceClient;
use campus_web::services::{CitationCountSource, CrossrefClient, DoiError, DoiService};
use campus_web::{build_router, AppState};
use chrono::NaiveDate;
use httpmock::prelude::*;
use serde_json::{json, Value};
use tower::util::ServiceExt;

const DOI: &str = "10.1000/test";

fn sources_for(server: &MockServer) -> SourceConfig {
    let base = server.base_url();
    SourceConfig {
        crossref_base_url: base.clone(),
        semantic_scholar_base_url: base.clone(),
        scopus_base_url: base.clone(),
        web_of_science_base_url: base.clone(),
        serpapi_base_url: base,
        timeout_secs: 5,
        ..SourceConfig::default()
    }
}

fn crossref_work() -> Value {
    json!({
        "status": "ok",
        "message": {
            "DOI": "10.1000/test",
            "title": ["Test Paper Title"],
            "author": [
                { "given": "Jane", "family": "Doe" },
                { "given": "John", "family": "Smith" }
            ],
            "container-title": ["Nature"],
            "type": "journal-article",
            "URL": "https://doi.org/10.1000/test",
            "published": { "date-parts": [[2024, 6, 1]] },
            "abstract": "<jats:p>Test abstract</jats:p>",
            "is-referenced-by-count": 12
        }
    })
}

// =============================================================================
// Crossref
// =============================================================================

#[tokio::test]
async fn test_crossref_lookup_work() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/works/10.1000/test");
            then.status(200).json_body(crossref_work());
        })
        .await;

    let client = CrossrefClient::new(&sources_for(&server)).unwrap();
    let work = client.lookup_work(DOI).await.unwrap();

    mock.assert_async().await;
    assert_eq!(work.title.as_deref(), Some("Test Paper Title"));
    assert_eq!(work.authors.as_deref(), Some("Jane Doe, John Smith"));
    assert_eq!(work.publication_type, PublicationType::Journal);
    assert_eq!(work.publication_venue.as_deref(), Some("Nature"));
    assert_eq!(work.publication_date, NaiveDate::from_ymd_opt(2024, 6, 1));
    assert_eq!(work.abstract_text.as_deref(), Some("Test abstract"));
    assert_eq!(work.citation_count, Some(12));
}

#[tokio::test]
async fn test_crossref_sends_mailto_user_agent() {
    let server = MockServer::start_async().await;
    let expected_agent = format!(
        "campus-web/{} (mailto:library@example.edu)",
        env!("CARGO_PKG_VERSION")
    );
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/works/10.1000/test")
                .header("user-agent", expected_agent.as_str());
            then.status(200).json_body(crossref_work());
        })
        .await;

    let config = SourceConfig {
        crossref_mailto: Some("library@example.edu".to_string()),
        ..sources_for(&server)
    };
    CrossrefClient::new(&config).unwrap().lookup_work(DOI).await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_crossref_not_found() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/works/10.1000/missing");
            then.status(404).body("Resource not found.");
        })
        .await;

    let client = CrossrefClient::new(&sources_for(&server)).unwrap();
    let err = client.lookup_work("10.1000/missing").await.unwrap_err();
    assert!(matches!(err, DoiError::NotFound(_)));

    // As a citation source a missing work is simply unknown
    assert_eq!(client.citation_count("10.1000/missing").await.unwrap(), None);
}

#[tokio::test]
async fn test_crossref_server_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/works/10.1000/test");
            then.status(503).body("maintenance");
        })
        .await;

    let client = CrossrefClient::new(&sources_for(&server)).unwrap();
    let err = client.lookup_work(DOI).await.unwrap_err();
    assert!(matches!(err, DoiError::ApiError(503, _)));
}

// =============================================================================
// Citation sources
// =============================================================================

#[tokio::test]
async fn test_semantic_scholar_count_with_key() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/graph/v1/paper/DOI:10.1000/test")
                .query_param("fields", "citationCount")
                .header("x-api-key", "ss-key");
            then.status(200).json_body(json!({ "paperId": "abc", "citationCount": 15 }));
        })
        .await;

    let config = SourceConfig {
        semantic_scholar_api_key: Some("ss-key".to_string()),
        ..sources_for(&server)
    };
    let client = SemanticScholarClient::new(&config).unwrap();

    assert_eq!(client.source(), CitationSource::SemanticScholar);
    assert_eq!(client.citation_count(DOI).await.unwrap(), Some(15));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_scopus_count() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/content/search/scopus")
                .query_param("query", "DOI(10.1000/test)")
                .header("X-ELS-APIKey", "els-key");
            then.status(200).json_body(json!({
                "search-results": {
                    "opensearch:totalResults": "1",
                    "entry": [{ "dc:title": "Test Paper Title", "citedby-count": "9" }]
                }
            }));
        })
        .await;

    let client = ScopusClient::new(&sources_for(&server), "els-key".to_string()).unwrap();
    assert_eq!(client.citation_count(DOI).await.unwrap(), Some(9));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_web_of_science_prefers_core_collection() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/apis/wos-starter/v1/documents")
                .query_param("q", "DO=(10.1000/test)")
                .query_param("db", "WOS")
                .header("X-ApiKey", "wos-key");
            then.status(200).json_body(json!({
                "metadata": { "total": 1 },
                "hits": [{
                    "uid": "WOS:000123",
                    "citations": [
                        { "db": "BCI", "count": 3 },
                        { "db": "WOS", "count": 8 }
                    ]
                }]
            }));
        })
        .await;

    let client = WebOfScienceClient::new(&sources_for(&server), "wos-key".to_string()).unwrap();
    assert_eq!(client.citation_count(DOI).await.unwrap(), Some(8));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_web_of_science_no_hits() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/apis/wos-starter/v1/documents");
            then.status(200).json_body(json!({ "metadata": { "total": 0 }, "hits": [] }));
        })
        .await;

    let client = WebOfScienceClient::new(&sources_for(&server), "wos-key".to_string()).unwrap();
    assert_eq!(client.citation_count(DOI).await.unwrap(), None);
}

#[tokio::test]
async fn test_google_scholar_count() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/search.json")
                .query_param("engine", "google_scholar")
                .query_param("q", DOI)
                .query_param("api_key", "serp-key");
            then.status(200).json_body(json!({
                "organic_results": [{
                    "title": "Test Paper Title",
                    "inline_links": { "cited_by": { "total": 21 } }
                }]
            }));
        })
        .await;

    let client = GoogleScholarClient::new(&sources_for(&server), "serp-key".to_string()).unwrap();
    assert_eq!(client.citation_count(DOI).await.unwrap(), Some(21));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_source_error_status() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/content/search/scopus");
            then.status(401).body("invalid key");
        })
        .await;

    let client = ScopusClient::new(&sources_for(&server), "bad".to_string()).unwrap();
    let err = client.citation_count(DOI).await.unwrap_err();
    assert!(matches!(err, DoiError::ApiError(401, _)));
}

// =============================================================================
// DoiService
// =============================================================================

async fn mock_all_sources(server: &MockServer) {
    server
        .mock_async(|when, then| {
            when.method(GET).path("/works/10.1000/test");
            then.status(200).json_body(crossref_work());
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/graph/v1/paper/DOI:10.1000/test");
            then.status(200).json_body(json!({ "citationCount": 15 }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/content/search/scopus");
            then.status(500).body("upstream exploded");
        })
        .await;
}

#[tokio::test]
async fn test_lookup_enhanced_merges_sources() {
    let server = MockServer::start_async().await;
    mock_all_sources(&server).await;

    let config = SourceConfig {
        scopus_api_key: Some("els-key".to_string()),
        ..sources_for(&server)
    };
    let service = DoiService::from_config(&config).unwrap();

    let lookup = service
        .lookup("https://doi.org/10.1000/TEST", true)
        .await
        .unwrap();

    assert_eq!(lookup.work.doi, DOI);
    assert_eq!(lookup.citations.crossref, Some(12));
    assert_eq!(lookup.citations.semantic_scholar, Some(15));
    // Scopus failed and contributes nothing
    assert_eq!(lookup.citations.scopus, None);
    assert_eq!(lookup.citations.google_scholar, None);
    assert_eq!(lookup.citation_count, Some(15));
}

#[tokio::test]
async fn test_lookup_plain_uses_crossref_only() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/works/10.1000/test");
            then.status(200).json_body(crossref_work());
        })
        .await;
    let semantic = server
        .mock_async(|when, then| {
            when.method(GET).path("/graph/v1/paper/DOI:10.1000/test");
            then.status(200).json_body(json!({ "citationCount": 15 }));
        })
        .await;

    let service = DoiService::from_config(&sources_for(&server)).unwrap();
    let lookup = service.lookup("doi:10.1000/test", false).await.unwrap();

    assert_eq!(lookup.citation_count, Some(12));
    assert_eq!(lookup.citations.semantic_scholar, None);
    semantic.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_refresh_citations_queries_crossref_too() {
    let server = MockServer::start_async().await;
    mock_all_sources(&server).await;

    let service = DoiService::from_config(&sources_for(&server)).unwrap();
    let counts = service.refresh_citations(DOI).await.unwrap();

    assert_eq!(counts.crossref, Some(12));
    assert_eq!(counts.semantic_scholar, Some(15));
    assert_eq!(counts.best(), Some(15));
}

// =============================================================================
// /api/doi end to end
// =============================================================================

#[tokio::test]
async fn test_doi_route_response() {
    let server = MockServer::start_async().await;
    mock_all_sources(&server).await;

    let mut config = ServerConfig::default();
    config.database = DatabaseConfig {
        port: 1,
        ..DatabaseConfig::default()
    };
    config.sources = sources_for(&server);

    let pool = connect_lazy(&config.database).unwrap();
    let doi = DoiService::from_config(&config.sources).unwrap();
    let app = build_router(AppState::new(pool, doi, config));

    let request = axum::http::Request::builder()
        .uri("/api/doi?doi=10.1000/test&enhanced=true")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), axum::http::StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(body["success"], true);
    assert_eq!(
        body["message"],
        "DOI metadata retrieved successfully! Citations found: Crossref: 12, Semantic Scholar: 15"
    );
    assert_eq!(body["data"]["doi"], DOI);
    assert_eq!(body["data"]["title"], "Test Paper Title");
    assert_eq!(body["data"]["publicationDate"], "2024-06-01");
    assert_eq!(body["data"]["publicationType"], "journal");
    assert_eq!(body["data"]["citationCount"], 15);
    assert_eq!(body["data"]["citations"]["crossref"], 12);
    assert!(body["data"]["citations"]["scopus"].is_null());
}

#[tokio::test]
async fn test_doi_route_not_found() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/works/10.1000/missing");
            then.status(404);
        })
        .await;

    let mut config = ServerConfig::default();
    config.sources = sources_for(&server);
    let pool = connect_lazy(&config.database).unwrap();
    let doi = DoiService::from_config(&config.sources).unwrap();
    let app = build_router(AppState::new(pool, doi, config));

    let request = axum::http::Request::builder()
        .uri("/api/doi?doi=10.1000/missing")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), axum::http::StatusCode::NOT_FOUND);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["message"], "DOI not found");
}
