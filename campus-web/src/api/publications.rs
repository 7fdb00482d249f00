//! Faculty publication routes
//!
//! Every route acts on behalf of the faculty member named by the proxy
//! headers. Owners may edit and delete; co-authors only see the publication.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    Json,
};
use campus_common::db::{CitationCounts, FacultyMember, Publication, PublicationType};
use campus_common::ApiEnvelope;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use super::auth::CurrentUser;
use crate::db::{faculty, publications, publications::PublicationFields};
use crate::error::{ApiError, ApiResult};
use crate::services::{normalize_doi, DoiError};
use crate::AppState;

const REQUIRED_FIELDS_MESSAGE: &str = "Please fill in all required fields";
const PUBLICATION_NOT_FOUND: &str = "Publication not found";
const PUBLICATION_ID_REQUIRED: &str = "Publication ID is required";

/// Create/update request body
///
/// Numeric fields accept numbers or numeric strings; the pages post form values as text.
#[derive(Debug, Default, Deserialize)]
pub struct PublicationRequest {
    #[serde(default, deserialize_with = "lenient_int")]
    pub id: Option<i64>,
    pub title: Option<String>,
    pub authors: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub publication_date: Option<String>,
    pub publication_type: Option<String>,
    pub publication_venue: Option<String>,
    pub doi: Option<String>,
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub citation_count: Option<i32>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub citations_crossref: Option<i32>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub citations_semantic_scholar: Option<i32>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub citations_google_scholar: Option<i32>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub citations_web_of_science: Option<i32>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub citations_scopus: Option<i32>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub citations_last_updated: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_ids")]
    pub co_authors: Option<Vec<i64>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    pub id: Option<String>,
}

/// Publication plus whether the current user owns it
#[derive(Debug, Serialize)]
pub struct PublicationView {
    #[serde(flatten)]
    pub publication: Publication,
    pub is_owner: bool,
}

#[derive(Debug, Serialize)]
pub struct CreatedId {
    pub id: i64,
}

/// GET /api/faculty/publications
pub async fn list_publications(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<ApiEnvelope<Vec<PublicationView>>>> {
    let faculty_id = user.require_faculty()?;

    let rows = publications::list_for_faculty(&state.db, faculty_id)
        .await
        .map_err(|e| ApiError::internal("Error fetching publications", e))?;

    let views = rows
        .into_iter()
        .map(|publication| PublicationView {
            is_owner: publication.faculty_id == faculty_id,
            publication,
        })
        .collect();

    Ok(Json(ApiEnvelope::ok(views)))
}

/// POST /api/faculty/publications
pub async fn create_publication(
    State(state): State<AppState>,
    user: CurrentUser,
    body: Result<Json<PublicationRequest>, JsonRejection>,
) -> ApiResult<Json<ApiEnvelope<CreatedId>>> {
    let faculty_id = user.require_faculty()?;
    let Json(body) = body?;
    let co_author_ids = body.co_authors.clone().unwrap_or_default();

    let mut fields = validate_fields(&body, false)?;
    if fields.authors.is_empty() {
        fields.authors = default_authors(&state, faculty_id, &co_author_ids).await?;
    }

    let id = publications::insert(&state.db, faculty_id, &fields, &co_author_ids)
        .await
        .map_err(|e| ApiError::internal("Error adding publication", e))?;

    info!(
        publication_id = id,
        faculty_id,
        co_authors = co_author_ids.len(),
        "Publication added"
    );

    Ok(Json(ApiEnvelope::ok_with_message(
        CreatedId { id },
        "Publication added successfully",
    )))
}

/// PUT /api/faculty/publications
pub async fn update_publication(
    State(state): State<AppState>,
    user: CurrentUser,
    body: Result<Json<PublicationRequest>, JsonRejection>,
) -> ApiResult<Json<ApiEnvelope<CreatedId>>> {
    let faculty_id = user.require_faculty()?;
    let Json(body) = body?;
    let id = body
        .id
        .ok_or_else(|| ApiError::BadRequest(PUBLICATION_ID_REQUIRED.to_string()))?;
    let fields = validate_fields(&body, true)?;

    let updated = publications::update(
        &state.db,
        id,
        faculty_id,
        &fields,
        body.co_authors.as_deref(),
    )
    .await
    .map_err(|e| ApiError::internal("Error updating publication", e))?;

    if !updated {
        return Err(ApiError::NotFound(PUBLICATION_NOT_FOUND.to_string()));
    }

    info!(publication_id = id, faculty_id, "Publication updated");

    Ok(Json(ApiEnvelope::ok_with_message(
        CreatedId { id },
        "Publication updated successfully",
    )))
}

/// DELETE /api/faculty/publications?id=
pub async fn delete_publication(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<DeleteQuery>,
) -> ApiResult<Json<ApiEnvelope<CreatedId>>> {
    let faculty_id = user.require_faculty()?;
    let id = query
        .id
        .as_deref()
        .and_then(|v| v.trim().parse::<i64>().ok())
        .ok_or_else(|| ApiError::BadRequest(PUBLICATION_ID_REQUIRED.to_string()))?;

    let deleted = publications::delete(&state.db, id, faculty_id)
        .await
        .map_err(|e| ApiError::internal("Error deleting publication", e))?;

    if !deleted {
        return Err(ApiError::NotFound(PUBLICATION_NOT_FOUND.to_string()));
    }

    info!(publication_id = id, faculty_id, "Publication deleted");

    Ok(Json(ApiEnvelope::ok_with_message(
        CreatedId { id },
        "Publication deleted successfully",
    )))
}

/// GET /api/faculty/publications/:id/co-authors
pub async fn list_co_authors(
    State(state): State<AppState>,
    user: CurrentUser,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<ApiEnvelope<Vec<FacultyMember>>>> {
    user.require_faculty()?;
    let Path(id) = id?;

    let members = faculty::co_authors(&state.db, id)
        .await
        .map_err(|e| ApiError::internal("Error fetching co-authors", e))?;

    Ok(Json(ApiEnvelope::ok(members)))
}

/// POST /api/faculty/publications/:id/refresh-citations
pub async fn refresh_citations(
    State(state): State<AppState>,
    user: CurrentUser,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<ApiEnvelope<Publication>>> {
    let faculty_id = user.require_faculty()?;
    let Path(id) = id?;

    let publication = publications::get_owned(&state.db, id, faculty_id)
        .await
        .map_err(|e| ApiError::internal("Error fetching publication", e))?
        .ok_or_else(|| ApiError::NotFound(PUBLICATION_NOT_FOUND.to_string()))?;

    let doi = publication
        .doi
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Publication has no DOI".to_string()))?;

    let counts = state.doi.refresh_citations(doi).await.map_err(|e| match e {
        DoiError::Missing | DoiError::InvalidFormat(_) => {
            ApiError::BadRequest("Invalid DOI format".to_string())
        }
        other => ApiError::upstream("Failed to refresh citations", other),
    })?;

    let refreshed_at = Utc::now();
    publications::update_citations(&state.db, id, &counts, refreshed_at)
        .await
        .map_err(|e| ApiError::internal("Error updating citations", e))?
        .ok_or_else(|| ApiError::NotFound(PUBLICATION_NOT_FOUND.to_string()))?;

    let updated = publications::get_owned(&state.db, id, faculty_id)
        .await
        .map_err(|e| ApiError::internal("Error fetching publication", e))?
        .ok_or_else(|| ApiError::NotFound(PUBLICATION_NOT_FOUND.to_string()))?;

    let message = citation_message("Citations refreshed", &counts);
    info!(publication_id = id, summary = %counts.summary(), "Citations refreshed");

    Ok(Json(ApiEnvelope::ok_with_message(updated, message)))
}

/// "Citations refreshed! Citations found: Crossref: 12" or just the prefix when nothing was found
pub fn citation_message(prefix: &str, counts: &CitationCounts) -> String {
    let summary = counts.summary();
    if summary.is_empty() {
        prefix.to_string()
    } else {
        format!("{prefix}! Citations found: {summary}")
    }
}

// ── Validation ─────────────────────────────────────────────────────────────

fn validate_fields(body: &PublicationRequest, require_authors: bool) -> ApiResult<PublicationFields> {
    let title = required(&body.title);
    let date = required(&body.publication_date);
    let kind = required(&body.publication_type);
    let venue = required(&body.publication_venue);
    let authors = required(&body.authors);

    let (Some(title), Some(date), Some(kind), Some(venue)) = (title, date, kind, venue) else {
        return Err(ApiError::BadRequest(REQUIRED_FIELDS_MESSAGE.to_string()));
    };
    if require_authors && authors.is_none() {
        return Err(ApiError::BadRequest(REQUIRED_FIELDS_MESSAGE.to_string()));
    }

    let publication_date = parse_date(date)
        .ok_or_else(|| ApiError::BadRequest("Invalid publication date".to_string()))?;
    let publication_type: PublicationType = kind
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid publication type".to_string()))?;
    let doi = required(&body.doi)
        .map(normalize_doi)
        .transpose()
        .map_err(|_| ApiError::BadRequest("Invalid DOI format".to_string()))?;

    Ok(PublicationFields {
        title: title.to_string(),
        abstract_text: optional(&body.abstract_text),
        authors: authors.unwrap_or_default().to_string(),
        publication_date,
        publication_type,
        publication_venue: venue.to_string(),
        doi,
        url: optional(&body.url),
        citation_count: body.citation_count,
        citations: CitationCounts {
            crossref: body.citations_crossref,
            semantic_scholar: body.citations_semantic_scholar,
            google_scholar: body.citations_google_scholar,
            web_of_science: body.citations_web_of_science,
            scopus: body.citations_scopus,
        },
        citations_last_updated: body.citations_last_updated,
    })
}

/// Owner name followed by co-author names
async fn default_authors(
    state: &AppState,
    faculty_id: i64,
    co_author_ids: &[i64],
) -> ApiResult<String> {
    let owner = faculty::faculty_name(&state.db, faculty_id)
        .await
        .map_err(|e| ApiError::internal("Error adding publication", e))?;
    if owner.is_none() {
        warn!(faculty_id, "Publication owner not found in faculty table");
    }

    let others: Vec<i64> = co_author_ids
        .iter()
        .copied()
        .filter(|id| *id != faculty_id)
        .collect();
    let members = faculty::faculty_members(&state.db, &others)
        .await
        .map_err(|e| ApiError::internal("Error adding publication", e))?;

    Ok(owner
        .into_iter()
        .chain(members.into_iter().map(|m| m.name))
        .collect::<Vec<_>>()
        .join(", "))
}

fn required(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn optional(value: &Option<String>) -> Option<String> {
    required(value).map(str::to_string)
}

/// `YYYY-MM-DD`, also accepting a full ISO timestamp
fn parse_date(value: &str) -> Option<NaiveDate> {
    let day = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn int_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn lenient_int<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(int_from_value)
        .and_then(|n| T::try_from(n).ok()))
}

fn lenient_ids<'de, D>(deserializer: D) -> Result<Option<Vec<i64>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Vec<Value>>::deserialize(deserializer)?;
    Ok(value.map(|items| {
        let mut ids: Vec<i64> = Vec::with_capacity(items.len());
        for id in items.iter().filter_map(int_from_value) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }))
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(|s| {
        DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }))
}
