//! Table Schema Definitions
//!
//! Expected columns for every table. A column listed here but missing from
//! the live database is added on startup.

use crate::db::schema_sync::{ColumnDefinition, SchemaSync, TableSchema};
use crate::Result;
use sqlx::MySqlPool;
use tracing::info;

/// department table schema
pub struct DepartmentTableSchema;

impl TableSchema for DepartmentTableSchema {
    fn table_name() -> &'static str {
        "department"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("Department_ID", "INT").primary_key(),
            ColumnDefinition::new("Department_Name", "VARCHAR(255)").not_null(),
        ]
    }
}

/// department_details table schema
pub struct DepartmentDetailsTableSchema;

impl TableSchema for DepartmentDetailsTableSchema {
    fn table_name() -> &'static str {
        "department_details"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("Department_ID", "INT").primary_key(),
            ColumnDefinition::new("Establishment_Year", "INT"),
            ColumnDefinition::new("Department_Code", "VARCHAR(32)"),
            ColumnDefinition::new("Email_ID", "VARCHAR(255)"),
            ColumnDefinition::new("Department_Phone_Number", "VARCHAR(32)"),
            ColumnDefinition::new("HOD_ID", "BIGINT"),
            ColumnDefinition::new("Total_Faculty", "INT"),
            ColumnDefinition::new("Total_Students", "INT"),
            ColumnDefinition::new("Vision", "TEXT"),
            ColumnDefinition::new("Mission", "TEXT"),
            ColumnDefinition::new("Website_URL", "VARCHAR(512)"),
        ]
    }
}

/// faculty table schema
pub struct FacultyTableSchema;

impl TableSchema for FacultyTableSchema {
    fn table_name() -> &'static str {
        "faculty"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("F_id", "BIGINT").primary_key(),
            ColumnDefinition::new("F_name", "VARCHAR(255)").not_null(),
            ColumnDefinition::new("F_dept", "INT"),
            ColumnDefinition::new("F_email", "VARCHAR(255)"),
        ]
    }
}

/// faculty_publications table schema
///
/// The per-source citation columns are not part of CREATE TABLE; they arrive
/// through this sync on both new and older databases.
pub struct PublicationsTableSchema;

impl TableSchema for PublicationsTableSchema {
    fn table_name() -> &'static str {
        "faculty_publications"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("id", "BIGINT").primary_key(),
            ColumnDefinition::new("faculty_id", "BIGINT").not_null(),
            ColumnDefinition::new("title", "VARCHAR(512)").not_null(),
            ColumnDefinition::new("abstract", "TEXT"),
            ColumnDefinition::new("authors", "TEXT").not_null(),
            ColumnDefinition::new("publication_date", "DATE").not_null(),
            ColumnDefinition::new("publication_type", "VARCHAR(32)")
                .not_null()
                .default("'journal'"),
            ColumnDefinition::new("publication_venue", "VARCHAR(512)").not_null(),
            ColumnDefinition::new("doi", "VARCHAR(255)"),
            ColumnDefinition::new("url", "VARCHAR(1024)"),
            ColumnDefinition::new("citation_count", "INT"),
            ColumnDefinition::new("citations_crossref", "INT"),
            ColumnDefinition::new("citations_semantic_scholar", "INT"),
            ColumnDefinition::new("citations_google_scholar", "INT"),
            ColumnDefinition::new("citations_web_of_science", "INT"),
            ColumnDefinition::new("citations_scopus", "INT"),
            ColumnDefinition::new("citations_last_updated", "TIMESTAMP"),
            ColumnDefinition::new("created_at", "TIMESTAMP")
                .not_null()
                .default("CURRENT_TIMESTAMP"),
            ColumnDefinition::new("updated_at", "TIMESTAMP")
                .not_null()
                .default("CURRENT_TIMESTAMP"),
        ]
    }
}

/// publication_co_authors table schema
pub struct CoAuthorsTableSchema;

impl TableSchema for CoAuthorsTableSchema {
    fn table_name() -> &'static str {
        "publication_co_authors"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("publication_id", "BIGINT").primary_key(),
            ColumnDefinition::new("faculty_id", "BIGINT").primary_key(),
        ]
    }
}

/// Synchronize all table schemas
///
/// Runs after CREATE TABLE IF NOT EXISTS.
pub async fn sync_all_table_schemas(pool: &MySqlPool) -> Result<()> {
    info!("Schema sync: checking all tables");

    SchemaSync::sync_table::<DepartmentTableSchema>(pool).await?;
    SchemaSync::sync_table::<FacultyTableSchema>(pool).await?;
    SchemaSync::sync_table::<DepartmentDetailsTableSchema>(pool).await?;
    SchemaSync::sync_table::<PublicationsTableSchema>(pool).await?;
    SchemaSync::sync_table::<CoAuthorsTableSchema>(pool).await?;

    Ok(())
}
