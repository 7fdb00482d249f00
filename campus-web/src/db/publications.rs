//! Publication queries
//!
//! Writes that touch both the publication row and its co-author links run in
//! one transaction.

use campus_common::db::{CitationCounts, Publication, PublicationType};
use campus_common::Result;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{MySql, MySqlPool, Transaction};

const PUBLICATION_COLUMNS: &str = r#"
    p.id, p.faculty_id, p.title, p.abstract, p.authors, p.publication_date,
    p.publication_type, p.publication_venue, p.doi, p.url, p.citation_count,
    p.citations_crossref, p.citations_semantic_scholar, p.citations_google_scholar,
    p.citations_web_of_science, p.citations_scopus, p.citations_last_updated,
    p.created_at, p.updated_at
"#;

/// Column values for insert and update
#[derive(Debug, Clone, PartialEq)]
pub struct PublicationFields {
    pub title: String,
    pub abstract_text: Option<String>,
    pub authors: String,
    pub publication_date: NaiveDate,
    pub publication_type: PublicationType,
    pub publication_venue: String,
    pub doi: Option<String>,
    pub url: Option<String>,
    pub citation_count: Option<i32>,
    pub citations: CitationCounts,
    pub citations_last_updated: Option<DateTime<Utc>>,
}

/// Publications owned by a faculty member or listing them as co-author, newest first
pub async fn list_for_faculty(pool: &MySqlPool, faculty_id: i64) -> Result<Vec<Publication>> {
    let sql = format!(
        r#"
        SELECT {PUBLICATION_COLUMNS}
        FROM faculty_publications p
        WHERE p.faculty_id = ?
           OR p.id IN (SELECT publication_id FROM publication_co_authors WHERE faculty_id = ?)
        ORDER BY p.publication_date DESC, p.id DESC
        "#
    );

    let publications = sqlx::query_as::<_, Publication>(&sql)
        .bind(faculty_id)
        .bind(faculty_id)
        .fetch_all(pool)
        .await?;

    Ok(publications)
}

/// A publication, only if owned by `faculty_id`
pub async fn get_owned(
    pool: &MySqlPool,
    publication_id: i64,
    faculty_id: i64,
) -> Result<Option<Publication>> {
    let sql = format!(
        "SELECT {PUBLICATION_COLUMNS} FROM faculty_publications p WHERE p.id = ? AND p.faculty_id = ?"
    );

    let publication = sqlx::query_as::<_, Publication>(&sql)
        .bind(publication_id)
        .bind(faculty_id)
        .fetch_optional(pool)
        .await?;

    Ok(publication)
}

/// Insert a publication with its co-author links; returns the new id
pub async fn insert(
    pool: &MySqlPool,
    faculty_id: i64,
    fields: &PublicationFields,
    co_author_ids: &[i64],
) -> Result<i64> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"
        INSERT INTO faculty_publications (
            faculty_id, title, abstract, authors, publication_date, publication_type,
            publication_venue, doi, url, citation_count,
            citations_crossref, citations_semantic_scholar, citations_google_scholar,
            citations_web_of_science, citations_scopus, citations_last_updated
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(faculty_id)
    .bind(&fields.title)
    .bind(&fields.abstract_text)
    .bind(&fields.authors)
    .bind(fields.publication_date)
    .bind(fields.publication_type.as_str())
    .bind(&fields.publication_venue)
    .bind(&fields.doi)
    .bind(&fields.url)
    .bind(fields.citation_count)
    .bind(fields.citations.crossref)
    .bind(fields.citations.semantic_scholar)
    .bind(fields.citations.google_scholar)
    .bind(fields.citations.web_of_science)
    .bind(fields.citations.scopus)
    .bind(fields.citations_last_updated)
    .execute(&mut *tx)
    .await?;

    let publication_id = result.last_insert_id() as i64;
    link_co_authors(&mut tx, publication_id, faculty_id, co_author_ids).await?;

    tx.commit().await?;
    Ok(publication_id)
}

/// Update an owned publication; `co_author_ids` replaces the links when given
///
/// Returns false when the publication does not exist or belongs to someone else.
pub async fn update(
    pool: &MySqlPool,
    publication_id: i64,
    faculty_id: i64,
    fields: &PublicationFields,
    co_author_ids: Option<&[i64]>,
) -> Result<bool> {
    let mut tx = pool.begin().await?;

    if !lock_owned(&mut tx, publication_id, faculty_id).await? {
        return Ok(false);
    }

    sqlx::query(
        r#"
        UPDATE faculty_publications
        SET
            title = ?,
            abstract = ?,
            authors = ?,
            publication_date = ?,
            publication_type = ?,
            publication_venue = ?,
            doi = ?,
            url = ?,
            citation_count = ?,
            citations_crossref = ?,
            citations_semantic_scholar = ?,
            citations_google_scholar = ?,
            citations_web_of_science = ?,
            citations_scopus = ?,
            citations_last_updated = ?
        WHERE id = ?
        "#,
    )
    .bind(&fields.title)
    .bind(&fields.abstract_text)
    .bind(&fields.authors)
    .bind(fields.publication_date)
    .bind(fields.publication_type.as_str())
    .bind(&fields.publication_venue)
    .bind(&fields.doi)
    .bind(&fields.url)
    .bind(fields.citation_count)
    .bind(fields.citations.crossref)
    .bind(fields.citations.semantic_scholar)
    .bind(fields.citations.google_scholar)
    .bind(fields.citations.web_of_science)
    .bind(fields.citations.scopus)
    .bind(fields.citations_last_updated)
    .bind(publication_id)
    .execute(&mut *tx)
    .await?;

    if let Some(ids) = co_author_ids {
        sqlx::query("DELETE FROM publication_co_authors WHERE publication_id = ?")
            .bind(publication_id)
            .execute(&mut *tx)
            .await?;
        link_co_authors(&mut tx, publication_id, faculty_id, ids).await?;
    }

    tx.commit().await?;
    Ok(true)
}

/// Delete an owned publication and its co-author links
pub async fn delete(pool: &MySqlPool, publication_id: i64, faculty_id: i64) -> Result<bool> {
    let mut tx = pool.begin().await?;

    if !lock_owned(&mut tx, publication_id, faculty_id).await? {
        return Ok(false);
    }

    sqlx::query("DELETE FROM publication_co_authors WHERE publication_id = ?")
        .bind(publication_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM faculty_publications WHERE id = ?")
        .bind(publication_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(true)
}

/// Write refreshed citation counts back to a publication
///
/// Sources missing from `fresh` keep their stored count. `citation_count` is
/// recomputed from the merged columns. Returns the merged counts, or `None`
/// when the publication no longer exists.
pub async fn update_citations(
    pool: &MySqlPool,
    publication_id: i64,
    fresh: &CitationCounts,
    refreshed_at: DateTime<Utc>,
) -> Result<Option<CitationCounts>> {
    let mut tx = pool.begin().await?;

    let stored: Option<CitationCounts> = sqlx::query_as(
        r#"
        SELECT citations_crossref, citations_semantic_scholar, citations_google_scholar,
               citations_web_of_science, citations_scopus
        FROM faculty_publications
        WHERE id = ?
        FOR UPDATE
        "#,
    )
    .bind(publication_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(mut merged) = stored else {
        return Ok(None);
    };
    merged.merge(fresh);

    sqlx::query(
        r#"
        UPDATE faculty_publications
        SET
            citations_crossref = ?,
            citations_semantic_scholar = ?,
            citations_google_scholar = ?,
            citations_web_of_science = ?,
            citations_scopus = ?,
            citation_count = COALESCE(?, citation_count),
            citations_last_updated = ?
        WHERE id = ?
        "#,
    )
    .bind(merged.crossref)
    .bind(merged.semantic_scholar)
    .bind(merged.google_scholar)
    .bind(merged.web_of_science)
    .bind(merged.scopus)
    .bind(merged.best())
    .bind(refreshed_at)
    .bind(publication_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(Some(merged))
}

async fn lock_owned(
    tx: &mut Transaction<'_, MySql>,
    publication_id: i64,
    faculty_id: i64,
) -> Result<bool> {
    let found: Option<i64> = sqlx::query_scalar(
        "SELECT id FROM faculty_publications WHERE id = ? AND faculty_id = ? FOR UPDATE",
    )
    .bind(publication_id)
    .bind(faculty_id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(found.is_some())
}

async fn link_co_authors(
    tx: &mut Transaction<'_, MySql>,
    publication_id: i64,
    owner_id: i64,
    co_author_ids: &[i64],
) -> Result<()> {
    for id in co_author_ids.iter().filter(|id| **id != owner_id) {
        sqlx::query(
            "INSERT IGNORE INTO publication_co_authors (publication_id, faculty_id) VALUES (?, ?)",
        )
        .bind(publication_id)
        .bind(*id)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}
