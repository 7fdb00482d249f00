//! Database connection and schema initialization
//!
//! Startup sequence:
//! 1. Open the connection pool
//! 2. CREATE TABLE IF NOT EXISTS for every table
//! 3. Add columns that older databases are missing (schema_sync)

use crate::config::DatabaseConfig;
use crate::Result;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use std::time::Duration;
use tracing::info;

/// Open a MySQL connection pool
pub async fn connect(config: &DatabaseConfig) -> Result<MySqlPool> {
    let pool = MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect(&config.connection_url())
        .await?;

    info!(
        host = %config.host,
        port = config.port,
        database = %config.database,
        max_connections = config.max_connections,
        "Connected to database"
    );

    Ok(pool)
}

/// Build a pool that connects on first use
///
/// Used by tests that exercise request validation without a live server.
pub fn connect_lazy(config: &DatabaseConfig) -> Result<MySqlPool> {
    let pool = MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(2))
        .connect_lazy(&config.connection_url())?;
    Ok(pool)
}

/// Create all tables if needed, then synchronize columns
pub async fn init_schema(pool: &MySqlPool) -> Result<()> {
    create_department_table(pool).await?;
    create_faculty_table(pool).await?;
    create_department_details_table(pool).await?;
    create_publications_table(pool).await?;
    create_co_authors_table(pool).await?;

    crate::db::table_schemas::sync_all_table_schemas(pool).await?;

    info!("Database schema ready");
    Ok(())
}

/// Check whether a table exists in the current database
pub async fn table_exists(pool: &MySqlPool, table_name: &str) -> Result<bool> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM information_schema.TABLES
        WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ?
        "#,
    )
    .bind(table_name)
    .fetch_one(pool)
    .await?;

    Ok(count > 0)
}

async fn create_department_table(pool: &MySqlPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS department (
            Department_ID INT NOT NULL AUTO_INCREMENT PRIMARY KEY,
            Department_Name VARCHAR(255) NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_faculty_table(pool: &MySqlPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS faculty (
            F_id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
            F_name VARCHAR(255) NOT NULL,
            F_dept INT NULL,
            F_email VARCHAR(255) NULL,
            FOREIGN KEY (F_dept) REFERENCES department(Department_ID) ON DELETE SET NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_department_details_table(pool: &MySqlPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS department_details (
            Department_ID INT NOT NULL PRIMARY KEY,
            Establishment_Year INT NULL,
            Department_Code VARCHAR(32) NULL,
            Email_ID VARCHAR(255) NULL,
            Department_Phone_Number VARCHAR(32) NULL,
            HOD_ID BIGINT NULL,
            Total_Faculty INT NULL,
            Total_Students INT NULL,
            Vision TEXT NULL,
            Mission TEXT NULL,
            Website_URL VARCHAR(512) NULL,
            FOREIGN KEY (Department_ID) REFERENCES department(Department_ID) ON DELETE CASCADE,
            FOREIGN KEY (HOD_ID) REFERENCES faculty(F_id) ON DELETE SET NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_publications_table(pool: &MySqlPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS faculty_publications (
            id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
            faculty_id BIGINT NOT NULL,
            title VARCHAR(512) NOT NULL,
            abstract TEXT NULL,
            authors TEXT NOT NULL,
            publication_date DATE NOT NULL,
            publication_type VARCHAR(32) NOT NULL DEFAULT 'journal',
            publication_venue VARCHAR(512) NOT NULL,
            doi VARCHAR(255) NULL,
            url VARCHAR(1024) NULL,
            citation_count INT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP,
            INDEX idx_publications_faculty (faculty_id),
            FOREIGN KEY (faculty_id) REFERENCES faculty(F_id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_co_authors_table(pool: &MySqlPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS publication_co_authors (
            publication_id BIGINT NOT NULL,
            faculty_id BIGINT NOT NULL,
            PRIMARY KEY (publication_id, faculty_id),
            FOREIGN KEY (publication_id) REFERENCES faculty_publications(id) ON DELETE CASCADE,
            FOREIGN KEY (faculty_id) REFERENCES faculty(F_id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
