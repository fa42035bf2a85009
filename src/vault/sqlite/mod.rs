//! SQLite-backed vault implementation.

mod connection;
mod repo_impl;
mod transaction;


use rusqlite::Connection;

// Re-export the Transaction type
pub use transaction::Transaction;

// ===========================================
// SqliteVault Struct
// ===========================================

/// SQLite-backed note vault.
///
/// Owns the database connection; one instance per open store. All operations
/// are synchronous. WAL journaling lets other connections keep reading while
/// this one writes.
pub struct SqliteVault {
    pub(crate) conn: Connection,
}
