//! Semantic Scholar Graph API client
//!
//! API: `GET {base}/graph/v1/paper/DOI:{doi}?fields=citationCount`.
//! Works without a key at a shared rate limit; `x-api-key` raises it.

use async_trait::async_trait;
use campus_common::config::SourceConfig;
use campus_common::db::CitationSource;
use tracing::debug;

use super::doi::encode_doi;
use super::http::{build_client, count_value, fetch_json, user_agent};
use super::{CitationCountSource, DoiError};

pub struct SemanticScholarClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl SemanticScholarClient {
    pub fn new(config: &SourceConfig) -> Result<Self, DoiError> {
        Ok(Self {
            http_client: build_client(&user_agent(None), config.timeout_secs)?,
            base_url: config.semantic_scholar_base_url.trim_end_matches('/').to_string(),
            api_key: config.semantic_scholar_api_key.clone(),
        })
    }
}

#[async_trait]
impl CitationCountSource for SemanticScholarClient {
    fn source(&self) -> CitationSource {
        CitationSource::SemanticScholar
    }

    async fn citation_count(&self, doi: &str) -> Result<Option<i32>, DoiError> {
        let url = format!("{}/graph/v1/paper/DOI:{}", self.base_url, encode_doi(doi));
        debug!(doi = %doi, url = %url, "Querying Semantic Scholar");

        let mut request = self
            .http_client
            .get(&url)
            .query(&[("fields", "citationCount")]);
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        Ok(fetch_json(request)
            .await?
            .and_then(|body| count_value(&body["citationCount"])))
    }
}
