//! Shared API response types
//!
//! Every JSON API route answers with the same envelope so the browser pages
//! can check `success` before touching `data`.

pub mod types;

pub use types::ApiEnvelope;
