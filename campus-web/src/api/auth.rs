//! Request identity and the optional API shared secret
//!
//! Users sign in at the fronting proxy, which forwards who they are in
//! `X-User-*` headers. The service trusts those headers; when a shared secret
//! is configured the proxy must also send it in `X-Api-Secret`.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use crate::error::ApiError;
use crate::AppState;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";
pub const DEPARTMENT_ID_HEADER: &str = "x-department-id";
pub const FACULTY_ID_HEADER: &str = "x-faculty-id";
pub const API_SECRET_HEADER: &str = "x-api-secret";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Department,
    Faculty,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Department => "department",
            Role::Faculty => "faculty",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "department" => Ok(Role::Department),
            "faculty" => Ok(Role::Faculty),
            _ => Err(()),
        }
    }
}

/// Identity forwarded by the proxy; every field is optional
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurrentUser {
    pub user_id: Option<String>,
    pub role: Option<Role>,
    pub department_id: Option<i32>,
    pub faculty_id: Option<i64>,
}

impl CurrentUser {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            user_id: header_str(headers, USER_ID_HEADER).map(str::to_string),
            role: header_str(headers, USER_ROLE_HEADER).and_then(|r| r.parse().ok()),
            department_id: header_str(headers, DEPARTMENT_ID_HEADER).and_then(|v| v.parse().ok()),
            faculty_id: header_str(headers, FACULTY_ID_HEADER).and_then(|v| v.parse().ok()),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.user_id.is_none() && self.faculty_id.is_none()
    }

    /// Faculty id for publication routes
    pub fn require_faculty(&self) -> Result<i64, ApiError> {
        self.faculty_id.ok_or(ApiError::Unauthorized)
    }

    /// Department that listings are restricted to, if any
    pub fn department_scope(&self) -> Option<i32> {
        match self.role {
            Some(Role::Department) => self.department_id,
            _ => None,
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(CurrentUser::from_headers(&parts.headers))
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Shared secret check for `/api/**`
///
/// No configured secret disables the check.
pub async fn api_secret_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected) = state.config.auth.shared_secret.as_deref() else {
        return Ok(next.run(request).await);
    };

    match header_str(request.headers(), API_SECRET_HEADER) {
        Some(provided) if provided == expected => Ok(next.run(request).await),
        provided => {
            warn!(
                path = %request.uri().path(),
                secret_present = provided.is_some(),
                "Rejected API request with missing or wrong shared secret"
            );
            Err(ApiError::Unauthorized)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_missing_headers_give_anonymous_user() {
        let user = CurrentUser::from_headers(&HeaderMap::new());
        assert!(user.is_anonymous());
        assert!(user.require_faculty().is_err());
        assert_eq!(user.department_scope(), None);
    }

    #[test]
    fn test_headers_parsed() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("u-17"));
        headers.insert(USER_ROLE_HEADER, HeaderValue::from_static("Department"));
        headers.insert(DEPARTMENT_ID_HEADER, HeaderValue::from_static("4"));
        headers.insert(FACULTY_ID_HEADER, HeaderValue::from_static(" 42 "));

        let user = CurrentUser::from_headers(&headers);
        assert_eq!(user.user_id.as_deref(), Some("u-17"));
        assert_eq!(user.role, Some(Role::Department));
        assert_eq!(user.department_scope(), Some(4));
        assert_eq!(user.require_faculty().unwrap(), 42);
    }

    #[test]
    fn test_admin_is_not_scoped() {
        let user = CurrentUser {
            role: Some(Role::Admin),
            department_id: Some(4),
            ..CurrentUser::default()
        };
        assert_eq!(user.department_scope(), None);
    }

    #[test]
    fn test_malformed_ids_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(FACULTY_ID_HEADER, HeaderValue::from_static("abc"));
        headers.insert(USER_ROLE_HEADER, HeaderValue::from_static("dean"));

        let user = CurrentUser::from_headers(&headers);
        assert_eq!(user.faculty_id, None);
        assert_eq!(user.role, None);
    }
}
