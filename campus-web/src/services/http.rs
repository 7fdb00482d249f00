//! Shared HTTP plumbing for the bibliographic clients

use reqwest::{RequestBuilder, StatusCode};
use serde_json::Value;
use std::time::Duration;

use super::DoiError;

/// User agent sent to every source; Crossref routes requests with a mailto to its polite pool
pub fn user_agent(mailto: Option<&str>) -> String {
    match mailto {
        Some(mailto) => format!("campus-web/{} (mailto:{})", env!("CARGO_PKG_VERSION"), mailto),
        None => format!("campus-web/{}", env!("CARGO_PKG_VERSION")),
    }
}

pub fn build_client(user_agent: &str, timeout_secs: u64) -> Result<reqwest::Client, DoiError> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| DoiError::NetworkError(e.to_string()))
}

/// Send a request and parse the JSON body; `Ok(None)` on 404
pub async fn fetch_json(request: RequestBuilder) -> Result<Option<Value>, DoiError> {
    let response = request
        .send()
        .await
        .map_err(|e| DoiError::NetworkError(e.to_string()))?;

    let status = response.status();

    if status == StatusCode::NOT_FOUND {
        return Ok(None);
    }

    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(DoiError::ApiError(status.as_u16(), error_text));
    }

    let body = response
        .json::<Value>()
        .await
        .map_err(|e| DoiError::ParseError(e.to_string()))?;

    Ok(Some(body))
}

/// Read a count that some APIs send as a number and others as a string
pub fn count_value(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
