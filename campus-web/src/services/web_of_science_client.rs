//! Clarivate Web of Science Starter API client
//!
//! API: `GET {base}/apis/wos-starter/v1/documents?q=DO=(<doi>)&db=WOS` with
//! the `X-ApiKey` header. Only registered when a key is configured.

use async_trait::async_trait;
use campus_common::config::SourceConfig;
use campus_common::db::CitationSource;
use serde_json::Value;
use tracing::debug;

use super::http::{build_client, count_value, fetch_json, user_agent};
use super::{CitationCountSource, DoiError};

pub struct WebOfScienceClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl WebOfScienceClient {
    pub fn new(config: &SourceConfig, api_key: String) -> Result<Self, DoiError> {
        Ok(Self {
            http_client: build_client(&user_agent(None), config.timeout_secs)?,
            base_url: config.web_of_science_base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl CitationCountSource for WebOfScienceClient {
    fn source(&self) -> CitationSource {
        CitationSource::WebOfScience
    }

    async fn citation_count(&self, doi: &str) -> Result<Option<i32>, DoiError> {
        let url = format!("{}/apis/wos-starter/v1/documents", self.base_url);
        debug!(doi = %doi, "Querying Web of Science");

        let request = self
            .http_client
            .get(&url)
            .query(&[("q", format!("DO=({})", doi).as_str()), ("db", "WOS")])
            .header("X-ApiKey", &self.api_key);

        Ok(fetch_json(request).await?.and_then(|body| {
            let citations = body["hits"].as_array()?.first()?["citations"].as_array()?.clone();
            // Prefer the core collection count, else whichever database reported
            citations
                .iter()
                .find(|c: &&Value| c["db"].as_str() == Some("WOS"))
                .or_else(|| citations.first())
                .and_then(|c| count_value(&c["count"]))
        }))
    }
}
