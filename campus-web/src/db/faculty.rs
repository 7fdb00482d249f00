//! Faculty lookups used by the publication routes

use campus_common::db::FacultyMember;
use campus_common::Result;
use sqlx::{MySql, MySqlPool, QueryBuilder};

pub async fn faculty_name(pool: &MySqlPool, faculty_id: i64) -> Result<Option<String>> {
    let name: Option<String> = sqlx::query_scalar("SELECT F_name FROM faculty WHERE F_id = ?")
        .bind(faculty_id)
        .fetch_optional(pool)
        .await?;
    Ok(name)
}

/// Faculty members for the given ids, returned in the order the ids were given
pub async fn faculty_members(pool: &MySqlPool, ids: &[i64]) -> Result<Vec<FacultyMember>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut query: QueryBuilder<MySql> = QueryBuilder::new(
        r#"
        SELECT f.F_id AS id, f.F_name AS name, d.Department_Name AS department
        FROM faculty f
        LEFT JOIN department d ON f.F_dept = d.Department_ID
        WHERE f.F_id IN (
        "#,
    );
    let mut separated = query.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");

    let mut members = query
        .build_query_as::<FacultyMember>()
        .fetch_all(pool)
        .await?;

    members.sort_by_key(|m| ids.iter().position(|id| *id == m.id));
    Ok(members)
}

/// Co-authors linked to a publication, by name
pub async fn co_authors(pool: &MySqlPool, publication_id: i64) -> Result<Vec<FacultyMember>> {
    let members = sqlx::query_as::<_, FacultyMember>(
        r#"
        SELECT f.F_id AS id, f.F_name AS name, d.Department_Name AS department
        FROM publication_co_authors pca
        JOIN faculty f ON pca.faculty_id = f.F_id
        LEFT JOIN department d ON f.F_dept = d.Department_ID
        WHERE pca.publication_id = ?
        ORDER BY f.F_name
        "#,
    )
    .bind(publication_id)
    .fetch_all(pool)
    .await?;

    Ok(members)
}
