//! Database queries for campus-web
//!
//! Pool setup and schema live in campus-common; this module holds the
//! parameterized queries behind each route.

pub mod departments;
pub mod faculty;
pub mod publications;
