//! Database models and schema management

pub mod init;
pub mod models;
pub mod schema_sync;
pub mod table_schemas;

pub use init::*;
pub use models::*;
pub use schema_sync::*;
pub use table_schemas::*;
