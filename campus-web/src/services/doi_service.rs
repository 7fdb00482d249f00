//! DOI metadata lookup and citation aggregation
//!
//! Merge strategy: each source fills its own column; the headline citation
//! count is the highest count any source reported. Sources are queried one
//! after another. A source that fails is logged and contributes nothing; there
//! are no retries.

use campus_common::config::SourceConfig;
use campus_common::db::{CitationCounts, CitationSource};
use tracing::{info, warn};

use super::crossref_client::{CrossrefClient, CrossrefWork};
use super::google_scholar_client::GoogleScholarClient;
use super::scopus_client::ScopusClient;
use super::semantic_scholar_client::SemanticScholarClient;
use super::web_of_science_client::WebOfScienceClient;
use super::{normalize_doi, CitationCountSource, DoiError};

/// Result of a DOI lookup
#[derive(Debug, Clone)]
pub struct DoiLookup {
    pub work: CrossrefWork,
    pub citations: CitationCounts,
    /// Highest count across `citations`
    pub citation_count: Option<i32>,
}

/// Crossref metadata plus the additional citation sources
pub struct DoiService {
    crossref: CrossrefClient,
    sources: Vec<Box<dyn CitationCountSource>>,
}

impl DoiService {
    pub fn new(crossref: CrossrefClient, sources: Vec<Box<dyn CitationCountSource>>) -> Self {
        Self { crossref, sources }
    }

    /// Semantic Scholar is always queried; keyed sources only when their key is set
    pub fn from_config(config: &SourceConfig) -> Result<Self, DoiError> {
        let mut sources: Vec<Box<dyn CitationCountSource>> =
            vec![Box::new(SemanticScholarClient::new(config)?)];

        if let Some(key) = &config.serpapi_api_key {
            sources.push(Box::new(GoogleScholarClient::new(config, key.clone())?));
        }
        if let Some(key) = &config.web_of_science_api_key {
            sources.push(Box::new(WebOfScienceClient::new(config, key.clone())?));
        }
        if let Some(key) = &config.scopus_api_key {
            sources.push(Box::new(ScopusClient::new(config, key.clone())?));
        }

        let labels: Vec<&str> = sources.iter().map(|s| s.source().label()).collect();
        info!(sources = ?labels, "Citation sources configured (plus Crossref)");

        Ok(Self::new(CrossrefClient::new(config)?, sources))
    }

    /// Look up metadata for a raw DOI
    ///
    /// Without `enhanced` only the Crossref count is used.
    pub async fn lookup(&self, raw_doi: &str, enhanced: bool) -> Result<DoiLookup, DoiError> {
        let doi = normalize_doi(raw_doi)?;
        let work = self.crossref.lookup_work(&doi).await?;

        let mut citations = CitationCounts {
            crossref: work.citation_count,
            ..CitationCounts::default()
        };

        if enhanced {
            self.collect_counts(&doi, &mut citations).await;
        }

        Ok(DoiLookup {
            citation_count: citations.best(),
            citations,
            work,
        })
    }

    /// Query every source, Crossref included, for a stored publication's DOI
    pub async fn refresh_citations(&self, raw_doi: &str) -> Result<CitationCounts, DoiError> {
        let doi = normalize_doi(raw_doi)?;

        let mut citations = CitationCounts::default();
        citations.set(
            CitationSource::Crossref,
            query_source(&self.crossref, &doi).await,
        );
        self.collect_counts(&doi, &mut citations).await;

        Ok(citations)
    }

    async fn collect_counts(&self, doi: &str, citations: &mut CitationCounts) {
        for source in &self.sources {
            citations.set(source.source(), query_source(source.as_ref(), doi).await);
        }
    }
}

async fn query_source(source: &dyn CitationCountSource, doi: &str) -> Option<i32> {
    match source.citation_count(doi).await {
        Ok(count) => count,
        Err(e) => {
            warn!(
                source = source.source().label(),
                doi = %doi,
                error = %e,
                "Citation source failed"
            );
            None
        }
    }
}
