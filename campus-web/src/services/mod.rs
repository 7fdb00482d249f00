//! External bibliographic services
//!
//! Crossref provides DOI metadata. Crossref, Semantic Scholar, Google Scholar
//! (through SerpApi), Web of Science and Scopus each report a citation count;
//! `doi_service` queries them one after another and merges the results.

pub mod crossref_client;
pub mod doi;
pub mod doi_service;
pub mod google_scholar_client;
pub mod http;
pub mod scopus_client;
pub mod semantic_scholar_client;
pub mod web_of_science_client;

use async_trait::async_trait;
use campus_common::db::CitationSource;

pub use crossref_client::{CrossrefClient, CrossrefWork};
pub use doi::{normalize_doi, DoiError};
pub use doi_service::{DoiLookup, DoiService};

/// A service that can report how often a DOI has been cited
#[async_trait]
pub trait CitationCountSource: Send + Sync {
    /// Which column this source fills
    fn source(&self) -> CitationSource;

    /// Citation count for a normalized DOI; `Ok(None)` when the source does not know the work
    async fn citation_count(&self, doi: &str) -> Result<Option<i32>, DoiError>;
}
