//! Google Scholar citation counts through SerpApi
//!
//! Google Scholar has no public API. SerpApi's `google_scholar` engine exposes
//! `organic_results[0].inline_links.cited_by.total` for a DOI query.
//! Only registered when a SerpApi key is configured.

use async_trait::async_trait;
use campus_common::config::SourceConfig;
use campus_common::db::CitationSource;
use tracing::debug;

use super::http::{build_client, count_value, fetch_json, user_agent};
use super::{CitationCountSource, DoiError};

pub struct GoogleScholarClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GoogleScholarClient {
    pub fn new(config: &SourceConfig, api_key: String) -> Result<Self, DoiError> {
        Ok(Self {
            http_client: build_client(&user_agent(None), config.timeout_secs)?,
            base_url: config.serpapi_base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl CitationCountSource for GoogleScholarClient {
    fn source(&self) -> CitationSource {
        CitationSource::GoogleScholar
    }

    async fn citation_count(&self, doi: &str) -> Result<Option<i32>, DoiError> {
        let url = format!("{}/search.json", self.base_url);
        debug!(doi = %doi, "Querying Google Scholar via SerpApi");

        let request = self.http_client.get(&url).query(&[
            ("engine", "google_scholar"),
            ("q", doi),
            ("api_key", self.api_key.as_str()),
        ]);

        Ok(fetch_json(request).await?.and_then(|body| {
            let first = body["organic_results"].as_array()?.first()?.clone();
            count_value(&first["inline_links"]["cited_by"]["total"])
        }))
    }
}
