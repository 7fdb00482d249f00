//! Department listing and creation

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};
use campus_common::db::{table_exists, Department};
use campus_common::ApiEnvelope;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::auth::CurrentUser;
use crate::db::departments::{self, DepartmentFilter, ER_NO_DEFAULT_FOR_FIELD};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct DepartmentQuery {
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NewDepartment {
    #[serde(rename = "Department_Name", default)]
    pub department_name: Option<String>,
}

/// POST response; the id sits next to `success` rather than under `data`
#[derive(Debug, Serialize)]
pub struct DepartmentCreated {
    pub success: bool,
    #[serde(rename = "Department_ID")]
    pub department_id: u64,
    pub message: String,
}

/// GET /api/departments
pub async fn list_departments(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<DepartmentQuery>,
) -> ApiResult<Json<ApiEnvelope<Vec<Department>>>> {
    let exists = table_exists(&state.db, "department")
        .await
        .map_err(|e| ApiError::internal("Error checking department table", e))?;
    if !exists {
        return Err(ApiError::internal(
            "Department table does not exist",
            "Table 'department' not found",
        ));
    }

    let filter = DepartmentFilter {
        search: query.search.as_deref(),
        department_id: user.department_scope(),
    };

    let mut rows = departments::list_departments(&state.db, &filter)
        .await
        .map_err(|e| ApiError::internal("Error fetching department data", e))?;

    for dept in rows.iter_mut() {
        let Some(hod_id) = dept.hod_id else { continue };
        dept.hod = match departments::find_hod(&state.db, hod_id).await {
            Ok(hod) => hod,
            Err(e) => {
                warn!(
                    department_id = dept.department_id,
                    hod_id,
                    error = %e,
                    "HOD lookup failed"
                );
                None
            }
        };
    }

    Ok(Json(ApiEnvelope::ok(rows)))
}

/// POST /api/departments
pub async fn create_department(
    State(state): State<AppState>,
    body: Result<Json<NewDepartment>, JsonRejection>,
) -> ApiResult<Json<DepartmentCreated>> {
    let Json(body) = body?;
    let name = body
        .department_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Department name is required".to_string()))?;

    let (department_id, message) = match departments::insert_department(&state.db, name).await {
        Ok(id) => (id, "Department added successfully"),
        Err(e) if e.mysql_code() == Some(ER_NO_DEFAULT_FOR_FIELD) => {
            warn!(error = %e, "Department_ID has no default, enabling AUTO_INCREMENT");
            departments::enable_department_auto_increment(&state.db)
                .await
                .map_err(|e| ApiError::internal("Error adding department", e))?;
            let id = departments::insert_department(&state.db, name)
                .await
                .map_err(|e| ApiError::internal("Error adding department", e))?;
            (id, "Department added successfully (with table auto-fix)")
        }
        Err(e) => return Err(ApiError::internal("Error adding department", e)),
    };

    info!(department_id, name = %name, "Department added");

    Ok(Json(DepartmentCreated {
        success: true,
        department_id,
        message: message.to_string(),
    }))
}
