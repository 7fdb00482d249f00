//! DOI metadata lookup for the publication form

use axum::{
    extract::{Query, State},
    Json,
};
use campus_common::db::CitationCounts;
use campus_common::ApiEnvelope;
use serde::{Deserialize, Serialize};

use super::publications::citation_message;
use crate::error::{ApiError, ApiResult};
use crate::services::{DoiError, DoiLookup};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct DoiQuery {
    pub doi: Option<String>,
    pub enhanced: Option<String>,
}

impl DoiQuery {
    fn is_enhanced(&self) -> bool {
        matches!(
            self.enhanced.as_deref().map(str::trim),
            Some("true" | "1" | "yes")
        )
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CitationBreakdown {
    pub crossref: Option<i32>,
    pub semantic_scholar: Option<i32>,
    pub google_scholar: Option<i32>,
    pub web_of_science: Option<i32>,
    pub scopus: Option<i32>,
}

impl From<&CitationCounts> for CitationBreakdown {
    fn from(c: &CitationCounts) -> Self {
        Self {
            crossref: c.crossref,
            semantic_scholar: c.semantic_scholar,
            google_scholar: c.google_scholar,
            web_of_science: c.web_of_science,
            scopus: c.scopus,
        }
    }
}

/// Form-ready metadata, keyed the way the publication page reads it
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoiMetadata {
    pub doi: String,
    pub title: Option<String>,
    pub authors: Option<String>,
    /// YYYY-MM-DD
    pub publication_date: Option<String>,
    pub publication_type: String,
    pub publication_venue: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub citation_count: Option<i32>,
    pub citations: CitationBreakdown,
}

impl From<DoiLookup> for DoiMetadata {
    fn from(lookup: DoiLookup) -> Self {
        let work = lookup.work;
        Self {
            doi: work.doi,
            title: work.title,
            authors: work.authors,
            publication_date: work
                .publication_date
                .map(|d| d.format("%Y-%m-%d").to_string()),
            publication_type: work.publication_type.as_str().to_string(),
            publication_venue: work.publication_venue,
            url: work.url,
            abstract_text: work.abstract_text,
            citation_count: lookup.citation_count,
            citations: CitationBreakdown::from(&lookup.citations),
        }
    }
}

/// GET /api/doi?doi=&enhanced=
pub async fn lookup_doi(
    State(state): State<AppState>,
    Query(query): Query<DoiQuery>,
) -> ApiResult<Json<ApiEnvelope<DoiMetadata>>> {
    let raw = query.doi.as_deref().unwrap_or_default();

    let lookup = state
        .doi
        .lookup(raw, query.is_enhanced())
        .await
        .map_err(doi_error)?;

    let message = citation_message("DOI metadata retrieved successfully", &lookup.citations);
    Ok(Json(ApiEnvelope::ok_with_message(
        DoiMetadata::from(lookup),
        message,
    )))
}

fn doi_error(err: DoiError) -> ApiError {
    match err {
        DoiError::Missing => ApiError::BadRequest("DOI parameter is required".to_string()),
        DoiError::InvalidFormat(_) => ApiError::BadRequest("Invalid DOI format".to_string()),
        DoiError::NotFound(_) => ApiError::NotFound("DOI not found".to_string()),
        other => ApiError::upstream("Failed to retrieve DOI metadata", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::CrossrefWork;
    use campus_common::db::PublicationType;
    use chrono::NaiveDate;

    #[test]
    fn test_enhanced_flag() {
        let q = |v: Option<&str>| DoiQuery {
            doi: None,
            enhanced: v.map(str::to_string),
        };
        assert!(q(Some("true")).is_enhanced());
        assert!(q(Some("1")).is_enhanced());
        assert!(!q(Some("false")).is_enhanced());
        assert!(!q(None).is_enhanced());
    }

    #[test]
    fn test_metadata_json_shape() {
        let lookup = DoiLookup {
            work: CrossrefWork {
                doi: "10.1000/test".to_string(),
                title: Some("Test Paper Title".to_string()),
                authors: Some("Jane Doe".to_string()),
                publication_date: NaiveDate::from_ymd_opt(2024, 6, 1),
                publication_type: PublicationType::BookChapter,
                publication_venue: Some("Nature".to_string()),
                url: None,
                abstract_text: None,
                citation_count: Some(12),
            },
            citations: CitationCounts {
                crossref: Some(12),
                semantic_scholar: Some(15),
                ..CitationCounts::default()
            },
            citation_count: Some(15),
        };

        let json = serde_json::to_value(DoiMetadata::from(lookup)).unwrap();
        assert_eq!(json["publicationDate"], "2024-06-01");
        assert_eq!(json["publicationType"], "book_chapter");
        assert_eq!(json["publicationVenue"], "Nature");
        assert_eq!(json["citationCount"], 15);
        assert_eq!(json["citations"]["semanticScholar"], 15);
        assert!(json["citations"]["webOfScience"].is_null());
        assert!(json["abstract"].is_null());
    }

    #[test]
    fn test_error_mapping() {
        use axum::http::StatusCode;

        assert_eq!(doi_error(DoiError::Missing).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            doi_error(DoiError::InvalidFormat("x".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            doi_error(DoiError::NotFound("x".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            doi_error(DoiError::ApiError(503, "down".into())).status(),
            StatusCode::BAD_GATEWAY
        );
    }
}
