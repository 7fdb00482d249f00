//! Automatic Schema Synchronization
//!
//! Schema definitions in code are the single source of truth for columns.
//! On startup every table is compared against `information_schema.COLUMNS`
//! and columns that are missing from the live database are added.
//!
//! # Architecture
//!
//! Two-phase initialization:
//! 1. **CREATE TABLE IF NOT EXISTS** - Create missing tables (init.rs)
//! 2. **Auto-Sync** - Add missing columns via ALTER TABLE (THIS MODULE)
//!
//! Type and constraint differences are reported, never repaired: they need
//! a hand-written migration.
//!
//! # Usage
//!
//! ```rust,ignore
//! pub struct PublicationsTableSchema;
//!
//! impl TableSchema for PublicationsTableSchema {
//!     fn table_name() -> &'static str { "faculty_publications" }
//!
//!     fn expected_columns() -> Vec<ColumnDefinition> {
//!         vec![
//!             ColumnDefinition::new("id", "BIGINT").primary_key(),
//!             ColumnDefinition::new("citations_scopus", "INT"),  // ADD COLUMN HERE
//!         ]
//!     }
//! }
//!
//! SchemaSync::sync_table::<PublicationsTableSchema>(&pool).await?;
//! ```

use crate::Result;
use sqlx::{MySqlPool, Row};
use tracing::{info, warn};

/// Column definition with SQL constraints
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    /// Column name
    pub name: String,
    /// SQL type (e.g., "INT", "VARCHAR(255)", "TEXT", "TIMESTAMP")
    pub sql_type: String,
    /// NOT NULL constraint
    pub not_null: bool,
    /// PRIMARY KEY constraint
    pub primary_key: bool,
    /// DEFAULT value
    pub default_value: Option<String>,
}

impl ColumnDefinition {
    /// Create new column definition
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            not_null: false,
            primary_key: false,
            default_value: None,
        }
    }

    /// Mark column as PRIMARY KEY
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.not_null = true;
        self
    }

    /// Mark column as NOT NULL
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Set DEFAULT value
    pub fn default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }
}

/// Actual column from `information_schema.COLUMNS`
#[derive(Debug, Clone)]
pub struct ActualColumn {
    /// Position in table (1-based)
    pub position: i64,
    /// Column name
    pub name: String,
    /// Base type without length, e.g. `varchar`
    pub data_type: String,
    /// NOT NULL constraint
    pub not_null: bool,
    /// Part of the primary key
    pub pk: bool,
}

/// Schema drift detected between expected and actual schema
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaDrift {
    /// Column missing from database
    MissingColumn {
        table: String,
        column: ColumnDefinition,
    },
    /// Column type mismatch (cannot auto-fix - requires manual migration)
    TypeMismatch {
        table: String,
        column: String,
        expected: String,
        actual: String,
    },
    /// Constraint mismatch (cannot auto-fix - requires manual migration)
    ConstraintMismatch {
        table: String,
        column: String,
        constraint: String,
    },
}

/// Defines expected schema for a database table
pub trait TableSchema {
    /// Table name in database
    fn table_name() -> &'static str;

    /// Expected column definitions
    fn expected_columns() -> Vec<ColumnDefinition>;
}

/// Schema introspection - read actual database schema
pub struct SchemaIntrospector;

impl SchemaIntrospector {
    /// Read actual columns of a table in the current database, ordered by position
    pub async fn introspect_table(pool: &MySqlPool, table_name: &str) -> Result<Vec<ActualColumn>> {
        let rows = sqlx::query(
            r#"
            SELECT
                CAST(ORDINAL_POSITION AS SIGNED) AS position,
                CAST(COLUMN_NAME AS CHAR) AS name,
                CAST(DATA_TYPE AS CHAR) AS data_type,
                CAST(IS_NULLABLE AS CHAR) AS is_nullable,
                CAST(COLUMN_KEY AS CHAR) AS column_key
            FROM information_schema.COLUMNS
            WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ?
            ORDER BY ORDINAL_POSITION
            "#,
        )
        .bind(table_name)
        .fetch_all(pool)
        .await?;

        let mut columns = Vec::with_capacity(rows.len());
        for row in &rows {
            columns.push(ActualColumn {
                position: row.try_get("position")?,
                name: row.try_get("name")?,
                data_type: row.try_get("data_type")?,
                not_null: row.try_get::<String, _>("is_nullable")? == "NO",
                pk: row.try_get::<String, _>("column_key")? == "PRI",
            });
        }

        Ok(columns)
    }
}

/// Schema comparison - detect drift between expected and actual
pub struct SchemaDiff;

impl SchemaDiff {
    /// Compare expected schema to actual database schema
    pub fn compare(
        table_name: &str,
        expected: &[ColumnDefinition],
        actual: &[ActualColumn],
    ) -> Vec<SchemaDrift> {
        let mut drift = Vec::new();

        for expected_col in expected {
            let Some(actual_col) = actual
                .iter()
                .find(|c| c.name.eq_ignore_ascii_case(&expected_col.name))
            else {
                drift.push(SchemaDrift::MissingColumn {
                    table: table_name.to_string(),
                    column: expected_col.clone(),
                });
                continue;
            };

            if !Self::types_compatible(&expected_col.sql_type, &actual_col.data_type) {
                drift.push(SchemaDrift::TypeMismatch {
                    table: table_name.to_string(),
                    column: expected_col.name.clone(),
                    expected: expected_col.sql_type.clone(),
                    actual: actual_col.data_type.clone(),
                });
            }

            if expected_col.not_null && !actual_col.not_null {
                drift.push(SchemaDrift::ConstraintMismatch {
                    table: table_name.to_string(),
                    column: expected_col.name.clone(),
                    constraint: "NOT NULL".to_string(),
                });
            }

            if expected_col.primary_key && !actual_col.pk {
                drift.push(SchemaDrift::ConstraintMismatch {
                    table: table_name.to_string(),
                    column: expected_col.name.clone(),
                    constraint: "PRIMARY KEY".to_string(),
                });
            }
        }

        drift
    }

    /// Check if SQL types belong to the same MySQL type family
    pub fn types_compatible(expected: &str, actual: &str) -> bool {
        let exp = base_type(expected);
        let act = base_type(actual);

        if exp == act {
            return true;
        }

        const INTEGER: &[&str] = &["TINYINT", "SMALLINT", "MEDIUMINT", "INT", "INTEGER", "BIGINT"];
        const TEXT: &[&str] = &["CHAR", "VARCHAR", "TINYTEXT", "TEXT", "MEDIUMTEXT", "LONGTEXT"];
        const TIME: &[&str] = &["DATETIME", "TIMESTAMP"];
        const REAL: &[&str] = &["FLOAT", "DOUBLE", "DECIMAL", "REAL"];

        [INTEGER, TEXT, TIME, REAL]
            .iter()
            .any(|family| family.contains(&exp.as_str()) && family.contains(&act.as_str()))
    }
}

/// `VARCHAR(255)` → `VARCHAR`, `int unsigned` → `INT`
fn base_type(sql_type: &str) -> String {
    sql_type
        .split(|c: char| c == '(' || c.is_whitespace())
        .next()
        .unwrap_or_default()
        .to_uppercase()
}

/// Schema synchronization - apply schema changes to database
pub struct SchemaSync;

impl SchemaSync {
    /// Synchronize table schema: detect drift and add missing columns
    pub async fn sync_table<T: TableSchema>(pool: &MySqlPool) -> Result<()> {
        let table_name = T::table_name();
        let expected = T::expected_columns();

        if !crate::db::init::table_exists(pool, table_name).await? {
            warn!(
                "Table '{}' does not exist - should be created by CREATE TABLE IF NOT EXISTS first",
                table_name
            );
            return Ok(());
        }

        let actual = SchemaIntrospector::introspect_table(pool, table_name).await?;
        let drift = SchemaDiff::compare(table_name, &expected, &actual);

        if drift.is_empty() {
            info!("Schema up to date for '{}'", table_name);
            return Ok(());
        }

        for change in drift {
            match change {
                SchemaDrift::MissingColumn { table, column } => {
                    Self::add_column(pool, &table, &column).await?;
                }
                SchemaDrift::TypeMismatch {
                    table,
                    column,
                    expected,
                    actual,
                } => {
                    warn!(
                        "Type mismatch in {}.{}: expected '{}', found '{}'. Manual migration required.",
                        table, column, expected, actual
                    );
                }
                SchemaDrift::ConstraintMismatch {
                    table,
                    column,
                    constraint,
                } => {
                    warn!(
                        "Constraint mismatch in {}.{}: missing '{}'. Manual migration required.",
                        table, column, constraint
                    );
                }
            }
        }

        Ok(())
    }

    /// Add missing column to table via ALTER TABLE ADD COLUMN
    async fn add_column(pool: &MySqlPool, table: &str, column: &ColumnDefinition) -> Result<()> {
        let sql = add_column_sql(table, column);

        if column.primary_key {
            warn!(
                "Cannot add PRIMARY KEY column {}.{} via ALTER TABLE. \
                 Column will be created without PRIMARY KEY constraint.",
                table, column.name
            );
        }

        info!("Adding column: {}", sql);
        sqlx::query(&sql).execute(pool).await?;

        Ok(())
    }
}

/// ALTER TABLE statement for a missing column
///
/// NOT NULL is only emitted with a DEFAULT, otherwise existing rows would
/// make the statement fail.
pub fn add_column_sql(table: &str, column: &ColumnDefinition) -> String {
    let mut sql = format!(
        "ALTER TABLE `{}` ADD COLUMN `{}` {}",
        table, column.name, column.sql_type
    );

    match (&column.default_value, column.not_null) {
        (Some(default), true) => sql.push_str(&format!(" NOT NULL DEFAULT {}", default)),
        (Some(default), false) => sql.push_str(&format!(" NULL DEFAULT {}", default)),
        (None, _) => sql.push_str(" NULL"),
    }

    sql
}
