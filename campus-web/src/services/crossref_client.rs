//! Crossref DOI resolution client
//!
//! API: `GET {base}/works/{doi}` returning `{"status": "ok", "message": {work}}`.
//! Requests carry a mailto in the user agent when one is configured (Crossref
//! etiquette for the polite pool).

use async_trait::async_trait;
use campus_common::config::SourceConfig;
use campus_common::db::{CitationSource, PublicationType};
use chrono::NaiveDate;
use serde_json::Value;
use tracing::{debug, info};

use super::doi::encode_doi;
use super::http::{build_client, count_value, fetch_json, user_agent};
use super::{CitationCountSource, DoiError};

/// Publication metadata extracted from a Crossref work
#[derive(Debug, Clone, PartialEq)]
pub struct CrossrefWork {
    pub doi: String,
    pub title: Option<String>,
    /// "Given Family" names joined with ", "
    pub authors: Option<String>,
    pub publication_date: Option<NaiveDate>,
    pub publication_type: PublicationType,
    pub publication_venue: Option<String>,
    pub url: Option<String>,
    pub abstract_text: Option<String>,
    /// `is-referenced-by-count`
    pub citation_count: Option<i32>,
}

/// Crossref API client
pub struct CrossrefClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl CrossrefClient {
    pub fn new(config: &SourceConfig) -> Result<Self, DoiError> {
        let agent = user_agent(config.crossref_mailto.as_deref());
        Ok(Self {
            http_client: build_client(&agent, config.timeout_secs)?,
            base_url: config.crossref_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Lookup a work by normalized DOI
    pub async fn lookup_work(&self, doi: &str) -> Result<CrossrefWork, DoiError> {
        let url = format!("{}/works/{}", self.base_url, encode_doi(doi));
        debug!(doi = %doi, url = %url, "Querying Crossref");

        let body = fetch_json(self.http_client.get(&url))
            .await?
            .ok_or_else(|| DoiError::NotFound(doi.to_string()))?;

        let work = body
            .get("message")
            .filter(|m| m.is_object())
            .ok_or_else(|| DoiError::ParseError("Crossref response has no message".to_string()))?;

        let work = work_from_json(doi, work);

        info!(
            doi = %doi,
            title = %work.title.as_deref().unwrap_or("Unknown"),
            citations = ?work.citation_count,
            "Retrieved work from Crossref"
        );

        Ok(work)
    }
}

#[async_trait]
impl CitationCountSource for CrossrefClient {
    fn source(&self) -> CitationSource {
        CitationSource::Crossref
    }

    async fn citation_count(&self, doi: &str) -> Result<Option<i32>, DoiError> {
        match self.lookup_work(doi).await {
            Ok(work) => Ok(work.citation_count),
            Err(DoiError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────

fn work_from_json(requested_doi: &str, work: &Value) -> CrossrefWork {
    let doi = work["DOI"]
        .as_str()
        .map(str::to_lowercase)
        .unwrap_or_else(|| requested_doi.to_string());

    let title = first_string(&work["title"]);

    let authors: Vec<String> = work["author"]
        .as_array()
        .map(|list| {
            list.iter()
                .filter_map(|a| {
                    let given = a["given"].as_str().unwrap_or("").trim();
                    let family = a["family"].as_str().unwrap_or("").trim();
                    let name = match (given.is_empty(), family.is_empty()) {
                        (false, false) => format!("{given} {family}"),
                        (true, false) => family.to_string(),
                        (false, true) => given.to_string(),
                        // Organisational authors only carry "name"
                        (true, true) => a["name"].as_str().unwrap_or("").trim().to_string(),
                    };
                    (!name.is_empty()).then_some(name)
                })
                .collect()
        })
        .unwrap_or_default();

    let publication_date = ["published-print", "published-online", "published", "issued"]
        .iter()
        .find_map(|key| date_from_parts(&work[*key]));

    let publication_venue = first_string(&work["container-title"])
        .or_else(|| work["publisher"].as_str().map(str::to_string))
        .filter(|v| !v.trim().is_empty());

    let url = work["URL"]
        .as_str()
        .map(str::to_string)
        .or_else(|| Some(format!("https://doi.org/{}", doi)));

    CrossrefWork {
        title,
        authors: (!authors.is_empty()).then(|| authors.join(", ")),
        publication_date,
        publication_type: PublicationType::from_crossref(work["type"].as_str().unwrap_or("")),
        publication_venue,
        url,
        abstract_text: work["abstract"].as_str().map(strip_markup).filter(|a| !a.is_empty()),
        citation_count: count_value(&work["is-referenced-by-count"]),
        doi,
    }
}

fn first_string(value: &Value) -> Option<String> {
    value
        .as_array()
        .and_then(|items| items.first())
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// `{"date-parts": [[2024, 6, 1]]}`; missing month or day defaults to 1
fn date_from_parts(value: &Value) -> Option<NaiveDate> {
    let parts = value["date-parts"].as_array()?.first()?.as_array()?;
    let year = i32::try_from(parts.first()?.as_i64()?).ok()?;
    let month = parts.get(1).and_then(Value::as_u64).unwrap_or(1) as u32;
    let day = parts.get(2).and_then(Value::as_u64).unwrap_or(1) as u32;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Remove JATS/HTML tags and collapse whitespace
fn strip_markup(raw: &str) -> String {
    let mut text = String::with_capacity(raw.len());
    let mut in_tag = false;

    for c in raw.chars() {
        match c {
            '<' => {
                in_tag = true;
                text.push(' ');
            }
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
