//! # Campus Common Library
//!
//! Shared code for the campus faculty-management service:
//! - Database pool, schema creation and column synchronization
//! - Row models for departments, faculty and publications
//! - API response envelope
//! - Configuration loading

pub mod api;
pub mod config;
pub mod db;
pub mod error;

pub use api::ApiEnvelope;
pub use error::{Error, Result};
