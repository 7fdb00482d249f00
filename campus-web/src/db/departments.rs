//! Department queries

use campus_common::db::{Department, HodInfo};
use campus_common::Result;
use sqlx::{MySql, MySqlPool, QueryBuilder};

/// MySQL ER_NO_DEFAULT_FOR_FIELD
pub const ER_NO_DEFAULT_FOR_FIELD: u16 = 1364;

/// Filters for the department listing
#[derive(Debug, Clone, Default)]
pub struct DepartmentFilter<'a> {
    /// Substring match on the department name
    pub search: Option<&'a str>,
    /// Only this department (department-role users)
    pub department_id: Option<i32>,
}

/// Departments joined with their details, ordered by name
pub async fn list_departments(
    pool: &MySqlPool,
    filter: &DepartmentFilter<'_>,
) -> Result<Vec<Department>> {
    let mut query = department_query(filter);
    let departments = query
        .build_query_as::<Department>()
        .fetch_all(pool)
        .await?;
    Ok(departments)
}

fn department_query<'a>(filter: &DepartmentFilter<'a>) -> QueryBuilder<'a, MySql> {
    let mut query = QueryBuilder::new(
        r#"
        SELECT
            d.Department_ID,
            d.Department_Name,
            dd.Establishment_Year,
            dd.Department_Code,
            dd.Email_ID,
            dd.Department_Phone_Number,
            dd.HOD_ID,
            dd.Total_Faculty,
            dd.Total_Students,
            dd.Vision,
            dd.Mission,
            dd.Website_URL
        FROM department d
        LEFT JOIN department_details dd ON d.Department_ID = dd.Department_ID
        "#,
    );

    let mut has_condition = false;
    let mut push_condition = |query: &mut QueryBuilder<'a, MySql>| {
        query.push(if has_condition { " AND " } else { " WHERE " });
        has_condition = true;
    };

    if let Some(search) = filter.search.filter(|s| !s.trim().is_empty()) {
        push_condition(&mut query);
        query
            .push("d.Department_Name LIKE ")
            .push_bind(format!("%{}%", search.trim()));
    }

    if let Some(department_id) = filter.department_id {
        push_condition(&mut query);
        query.push("d.Department_ID = ").push_bind(department_id);
    }

    query.push(" ORDER BY d.Department_Name");
    query
}

/// Head of department name for a faculty id
pub async fn find_hod(pool: &MySqlPool, hod_id: i64) -> Result<Option<HodInfo>> {
    let row: Option<(i64, String)> =
        sqlx::query_as("SELECT F_id, F_name FROM faculty WHERE F_id = ?")
            .bind(hod_id)
            .fetch_optional(pool)
            .await?;

    Ok(row.map(|(id, name)| HodInfo { id, name }))
}

/// Insert a department and return its id
pub async fn insert_department(pool: &MySqlPool, name: &str) -> Result<u64> {
    let result = sqlx::query("INSERT INTO department (Department_Name) VALUES (?)")
        .bind(name)
        .execute(pool)
        .await?;
    Ok(result.last_insert_id())
}

/// Repair tables created without AUTO_INCREMENT on the key
pub async fn enable_department_auto_increment(pool: &MySqlPool) -> Result<()> {
    sqlx::query("ALTER TABLE department MODIFY Department_ID INT NOT NULL AUTO_INCREMENT")
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn count_departments(pool: &MySqlPool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM department")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalized_sql(filter: &DepartmentFilter<'_>) -> String {
        department_query(filter)
            .sql()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_query_without_filters() {
        let sql = normalized_sql(&DepartmentFilter::default());
        assert!(!sql.contains("WHERE"));
        assert!(sql.ends_with("ORDER BY d.Department_Name"));
    }

    #[test]
    fn test_query_with_search_and_department() {
        let sql = normalized_sql(&DepartmentFilter {
            search: Some("phys"),
            department_id: Some(4),
        });
        assert!(sql.contains("WHERE d.Department_Name LIKE ? AND d.Department_ID = ?"));
    }

    #[test]
    fn test_blank_search_is_ignored() {
        let sql = normalized_sql(&DepartmentFilter {
            search: Some("  "),
            department_id: None,
        });
        assert!(!sql.contains("LIKE"));
    }
}
