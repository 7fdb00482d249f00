//! Database models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Department joined with its details row
///
/// JSON keys keep the database column names, which the pages read directly.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Department {
    #[serde(rename = "Department_ID")]
    #[sqlx(rename = "Department_ID")]
    pub department_id: i32,
    #[serde(rename = "Department_Name")]
    #[sqlx(rename = "Department_Name")]
    pub department_name: String,
    #[serde(rename = "Establishment_Year")]
    #[sqlx(rename = "Establishment_Year")]
    pub establishment_year: Option<i32>,
    #[serde(rename = "Department_Code")]
    #[sqlx(rename = "Department_Code")]
    pub department_code: Option<String>,
    #[serde(rename = "Email_ID")]
    #[sqlx(rename = "Email_ID")]
    pub email_id: Option<String>,
    #[serde(rename = "Department_Phone_Number")]
    #[sqlx(rename = "Department_Phone_Number")]
    pub phone_number: Option<String>,
    #[serde(rename = "HOD_ID")]
    #[sqlx(rename = "HOD_ID")]
    pub hod_id: Option<i64>,
    #[serde(rename = "Total_Faculty")]
    #[sqlx(rename = "Total_Faculty")]
    pub total_faculty: Option<i32>,
    #[serde(rename = "Total_Students")]
    #[sqlx(rename = "Total_Students")]
    pub total_students: Option<i32>,
    #[serde(rename = "Vision")]
    #[sqlx(rename = "Vision")]
    pub vision: Option<String>,
    #[serde(rename = "Mission")]
    #[sqlx(rename = "Mission")]
    pub mission: Option<String>,
    #[serde(rename = "Website_URL")]
    #[sqlx(rename = "Website_URL")]
    pub website_url: Option<String>,
    /// Head of department, filled in after the query
    #[serde(rename = "HOD")]
    #[sqlx(skip)]
    pub hod: Option<HodInfo>,
}

/// Head of department summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HodInfo {
    pub id: i64,
    pub name: String,
}

/// Faculty member as listed among co-authors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct FacultyMember {
    pub id: i64,
    pub name: String,
    pub department: Option<String>,
}

/// Publication category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublicationType {
    Journal,
    Conference,
    Book,
    BookChapter,
    Other,
}

impl PublicationType {
    pub const ALL: [PublicationType; 5] = [
        PublicationType::Journal,
        PublicationType::Conference,
        PublicationType::Book,
        PublicationType::BookChapter,
        PublicationType::Other,
    ];

    /// Value stored in the database and sent over the API
    pub fn as_str(&self) -> &'static str {
        match self {
            PublicationType::Journal => "journal",
            PublicationType::Conference => "conference",
            PublicationType::Book => "book",
            PublicationType::BookChapter => "book_chapter",
            PublicationType::Other => "other",
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            PublicationType::Journal => "Journal Article",
            PublicationType::Conference => "Conference Paper",
            PublicationType::Book => "Book",
            PublicationType::BookChapter => "Book Chapter",
            PublicationType::Other => "Other",
        }
    }

    /// Map a Crossref work type onto a publication category
    pub fn from_crossref(work_type: &str) -> Self {
        match work_type {
            "journal-article" | "journal-issue" | "journal" => PublicationType::Journal,
            "proceedings-article" | "proceedings" | "proceedings-series" => {
                PublicationType::Conference
            }
            "book" | "monograph" | "edited-book" | "reference-book" | "book-set" => {
                PublicationType::Book
            }
            "book-chapter" | "book-section" | "book-part" | "reference-entry" => {
                PublicationType::BookChapter
            }
            _ => PublicationType::Other,
        }
    }
}

impl fmt::Display for PublicationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown publication type: {0}")]
pub struct UnknownPublicationType(pub String);

impl FromStr for PublicationType {
    type Err = UnknownPublicationType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PublicationType::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| UnknownPublicationType(s.to_string()))
    }
}

impl TryFrom<String> for PublicationType {
    type Error = UnknownPublicationType;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Bibliographic service that reports citation counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CitationSource {
    Crossref,
    SemanticScholar,
    GoogleScholar,
    WebOfScience,
    Scopus,
}

impl CitationSource {
    pub const ALL: [CitationSource; 5] = [
        CitationSource::Crossref,
        CitationSource::SemanticScholar,
        CitationSource::GoogleScholar,
        CitationSource::WebOfScience,
        CitationSource::Scopus,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CitationSource::Crossref => "Crossref",
            CitationSource::SemanticScholar => "Semantic Scholar",
            CitationSource::GoogleScholar => "Google Scholar",
            CitationSource::WebOfScience => "Web of Science",
            CitationSource::Scopus => "Scopus",
        }
    }
}

/// Per-source citation counts as stored on a publication
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CitationCounts {
    #[serde(rename = "citations_crossref")]
    #[sqlx(rename = "citations_crossref")]
    pub crossref: Option<i32>,
    #[serde(rename = "citations_semantic_scholar")]
    #[sqlx(rename = "citations_semantic_scholar")]
    pub semantic_scholar: Option<i32>,
    #[serde(rename = "citations_google_scholar")]
    #[sqlx(rename = "citations_google_scholar")]
    pub google_scholar: Option<i32>,
    #[serde(rename = "citations_web_of_science")]
    #[sqlx(rename = "citations_web_of_science")]
    pub web_of_science: Option<i32>,
    #[serde(rename = "citations_scopus")]
    #[sqlx(rename = "citations_scopus")]
    pub scopus: Option<i32>,
}

impl CitationCounts {
    pub fn get(&self, source: CitationSource) -> Option<i32> {
        match source {
            CitationSource::Crossref => self.crossref,
            CitationSource::SemanticScholar => self.semantic_scholar,
            CitationSource::GoogleScholar => self.google_scholar,
            CitationSource::WebOfScience => self.web_of_science,
            CitationSource::Scopus => self.scopus,
        }
    }

    pub fn set(&mut self, source: CitationSource, count: Option<i32>) {
        let slot = match source {
            CitationSource::Crossref => &mut self.crossref,
            CitationSource::SemanticScholar => &mut self.semantic_scholar,
            CitationSource::GoogleScholar => &mut self.google_scholar,
            CitationSource::WebOfScience => &mut self.web_of_science,
            CitationSource::Scopus => &mut self.scopus,
        };
        *slot = count;
    }

    /// Overlay the sources that answered in `fresh`; the rest keep their value
    pub fn merge(&mut self, fresh: &CitationCounts) {
        for source in CitationSource::ALL {
            if let Some(count) = fresh.get(source) {
                self.set(source, Some(count));
            }
        }
    }

    /// Sources with a positive count, in fixed source order
    pub fn found(&self) -> Vec<(CitationSource, i32)> {
        CitationSource::ALL
            .into_iter()
            .filter_map(|s| self.get(s).filter(|c| *c > 0).map(|c| (s, c)))
            .collect()
    }

    /// Highest count reported by any source
    pub fn best(&self) -> Option<i32> {
        CitationSource::ALL.into_iter().filter_map(|s| self.get(s)).max()
    }

    /// "Crossref: 12, Semantic Scholar: 15"
    pub fn summary(&self) -> String {
        self.found()
            .iter()
            .map(|(source, count)| format!("{}: {}", source.label(), count))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Faculty publication row
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Publication {
    pub id: i64,
    pub faculty_id: i64,
    pub title: String,
    #[serde(rename = "abstract")]
    #[sqlx(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub authors: String,
    pub publication_date: NaiveDate,
    #[sqlx(try_from = "String")]
    pub publication_type: PublicationType,
    pub publication_venue: String,
    pub doi: Option<String>,
    pub url: Option<String>,
    pub citation_count: Option<i32>,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub citations: CitationCounts,
    pub citations_last_updated: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publication_type_round_trip_through_str() {
        for t in PublicationType::ALL {
            assert_eq!(t.as_str().parse::<PublicationType>().unwrap(), t);
        }
        assert!("thesis".parse::<PublicationType>().is_err());
    }

    #[test]
    fn test_citation_merge_keeps_unanswered_sources() {
        let mut stored = CitationCounts {
            crossref: Some(4),
            scopus: Some(30),
            ..CitationCounts::default()
        };
        let fresh = CitationCounts {
            crossref: Some(9),
            semantic_scholar: Some(11),
            ..CitationCounts::default()
        };

        stored.merge(&fresh);

        assert_eq!(stored.crossref, Some(9));
        assert_eq!(stored.semantic_scholar, Some(11));
        assert_eq!(stored.scopus, Some(30));
        assert_eq!(stored.google_scholar, None);
        assert_eq!(stored.best(), Some(30));
    }

    #[test]
    fn test_publication_type_labels() {
        assert_eq!(PublicationType::Journal.label(), "Journal Article");
        assert_eq!(PublicationType::Conference.label(), "Conference Paper");
        assert_eq!(PublicationType::BookChapter.label(), "Book Chapter");
    }

    #[test]
    fn test_publication_type_from_crossref() {
        assert_eq!(PublicationType::from_crossref("journal-article"), PublicationType::Journal);
        assert_eq!(PublicationType::from_crossref("proceedings-article"), PublicationType::Conference);
        assert_eq!(PublicationType::from_crossref("monograph"), PublicationType::Book);
        assert_eq!(PublicationType::from_crossref("book-chapter"), PublicationType::BookChapter);
        assert_eq!(PublicationType::from_crossref("dataset"), PublicationType::Other);
    }

    #[test]
    fn test_publication_type_serde() {
        let json = serde_json::to_string(&PublicationType::BookChapter).unwrap();
        assert_eq!(json, "\"book_chapter\"");
        let parsed: PublicationType = serde_json::from_str("\"conference\"").unwrap();
        assert_eq!(parsed, PublicationType::Conference);
    }

    #[test]
    fn test_citation_counts_best_and_summary() {
        let counts = CitationCounts {
            crossref: Some(12),
            semantic_scholar: Some(15),
            google_scholar: None,
            web_of_science: Some(0),
            scopus: None,
        };

        assert_eq!(counts.best(), Some(15));
        assert_eq!(counts.summary(), "Crossref: 12, Semantic Scholar: 15");
        assert_eq!(counts.found().len(), 2);
    }

    #[test]
    fn test_citation_counts_empty() {
        let counts = CitationCounts::default();
        assert_eq!(counts.best(), None);
        assert!(counts.summary().is_empty());
    }

    #[test]
    fn test_citation_counts_set_and_get() {
        let mut counts = CitationCounts::default();
        counts.set(CitationSource::Scopus, Some(4));
        assert_eq!(counts.get(CitationSource::Scopus), Some(4));
        assert_eq!(counts.scopus, Some(4));
    }

    #[test]
    fn test_department_serializes_column_names() {
        let dept = Department {
            department_id: 3,
            department_name: "Physics".to_string(),
            establishment_year: Some(1962),
            department_code: Some("PHY".to_string()),
            email_id: None,
            phone_number: None,
            hod_id: Some(11),
            total_faculty: None,
            total_students: None,
            vision: None,
            mission: None,
            website_url: None,
            hod: Some(HodInfo {
                id: 11,
                name: "Dr. Rao".to_string(),
            }),
        };

        let json = serde_json::to_value(&dept).unwrap();
        assert_eq!(json["Department_ID"], 3);
        assert_eq!(json["Department_Name"], "Physics");
        assert_eq!(json["HOD_ID"], 11);
        assert_eq!(json["HOD"]["name"], "Dr. Rao");
        assert!(json["Vision"].is_null());
    }
}
