//! Database connectivity diagnostics

use axum::{extract::State, Json};
use campus_common::config::RedactedDatabaseConfig;
use campus_common::db::table_exists;
use chrono::Utc;
use serde::Serialize;
use tracing::warn;

use crate::db::departments::count_departments;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseCheck {
    /// "SUCCESS" or "ERROR: <cause>"
    pub connection: String,
    /// "EXISTS", "NOT_FOUND" or "FAILED"
    pub department_table: String,
    pub department_count: i64,
}

#[derive(Debug, Serialize)]
pub struct DatabaseTestResponse {
    pub success: bool,
    pub environment: RedactedDatabaseConfig,
    pub database: DatabaseCheck,
    pub timestamp: String,
}

/// GET /api/debug/database-test
///
/// Always answers 200; failures are reported in the body.
pub async fn database_test(State(state): State<AppState>) -> Json<DatabaseTestResponse> {
    let mut check = DatabaseCheck {
        connection: "SUCCESS".to_string(),
        department_table: "FAILED".to_string(),
        department_count: 0,
    };

    if let Err(e) = sqlx::query("SELECT 1").execute(&state.db).await {
        warn!(error = %e, "Database connection test failed");
        check.connection = format!("ERROR: {e}");
    } else {
        match table_exists(&state.db, "department").await {
            Ok(true) => {
                check.department_table = "EXISTS".to_string();
                match count_departments(&state.db).await {
                    Ok(count) => check.department_count = count,
                    Err(e) => warn!(error = %e, "Department count failed"),
                }
            }
            Ok(false) => check.department_table = "NOT_FOUND".to_string(),
            Err(e) => warn!(error = %e, "Department table check failed"),
        }
    }

    Json(DatabaseTestResponse {
        success: true,
        environment: state.config.database.redacted(),
        database: check,
        timestamp: Utc::now().to_rfc3339(),
    })
}
