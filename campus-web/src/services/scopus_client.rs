//! Elsevier Scopus Search API client
//!
//! API: `GET {base}/content/search/scopus?query=DOI(<doi>)&field=citedby-count`
//! with the `X-ELS-APIKey` header. Only registered when a key is configured.

use async_trait::async_trait;
use campus_common::config::SourceConfig;
use campus_common::db::CitationSource;
use serde_json::Value;
use tracing::debug;

use super::http::{build_client, count_value, fetch_json, user_agent};
use super::{CitationCountSource, DoiError};

pub struct ScopusClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ScopusClient {
    pub fn new(config: &SourceConfig, api_key: String) -> Result<Self, DoiError> {
        Ok(Self {
            http_client: build_client(&user_agent(None), config.timeout_secs)?,
            base_url: config.scopus_base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl CitationCountSource for ScopusClient {
    fn source(&self) -> CitationSource {
        CitationSource::Scopus
    }

    async fn citation_count(&self, doi: &str) -> Result<Option<i32>, DoiError> {
        let url = format!("{}/content/search/scopus", self.base_url);
        debug!(doi = %doi, "Querying Scopus");

        let request = self
            .http_client
            .get(&url)
            .query(&[
                ("query", format!("DOI({})", doi).as_str()),
                ("field", "citedby-count"),
            ])
            .header("X-ELS-APIKey", &self.api_key)
            .header("Accept", "application/json");

        Ok(fetch_json(request).await?.and_then(|body| {
            // An empty result set comes back as one entry holding only "error"
            body["search-results"]["entry"]
                .as_array()
                .and_then(|entries| entries.first())
                .and_then(|entry: &Value| count_value(&entry["citedby-count"]))
        }))
    }
}
