//! Vault storage: repository trait, SQLite schema, full-text search, and
//! hierarchy projection.

mod hierarchy;
mod query;
mod repository;
mod schema;
pub mod sqlite;

pub use hierarchy::{FolderNode, assemble};
pub use repository::{
    DEFAULT_SEARCH_LIMIT, SearchResult, VaultError, VaultRepository, VaultResult,
};
pub use schema::{ensure_schema, rebuild_search_index, schema_version};
pub use sqlite::{SqliteVault, Transaction};
