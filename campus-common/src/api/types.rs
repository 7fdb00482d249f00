//! Response envelope types

use serde::{Deserialize, Serialize};

// ========================================
// Envelope
// ========================================

/// JSON envelope returned by every API route
///
/// # Examples
///
/// ```
/// use campus_common::api::ApiEnvelope;
///
/// let ok = ApiEnvelope::ok(vec![1, 2, 3]);
/// assert!(ok.success);
///
/// let failed = ApiEnvelope::<()>::failure("Department name is required", None);
/// assert!(!failed.success);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    /// Whether the request succeeded
    pub success: bool,

    /// Payload (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Human-readable message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Underlying error detail (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Successful response carrying data
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
        }
    }

    /// Successful response carrying data and a message
    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
            error: None,
        }
    }

    /// Failed response
    pub fn failure(message: impl Into<String>, error: Option<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            error,
        }
    }
}

// ========================================
// Tests
// ========================================
