//! Connection management for SqliteVault.

use super::SqliteVault;
use super::transaction::Transaction;
use crate::vault::{VaultError, VaultResult, ensure_schema};
use rusqlite::{Connection, ErrorCode};
use std::fs;
use std::path::Path;

impl SqliteVault {
    // ===========================================
    // In-Memory Connection
    // ===========================================

    /// Opens an in-memory vault with the full schema.
    ///
    /// Useful for tests and throwaway stores that don't need persistence.
    pub fn open_in_memory() -> VaultResult<Self> {
        let conn = Connection::open_in_memory()?;
        configure_connection(&conn)?;
        ensure_schema(&conn)?;
        Ok(Self { conn })
    }

    // ===========================================
    // File-Based Connection
    // ===========================================

    /// Opens or creates a vault database at the given path.
    ///
    /// Creates parent directories if they don't exist, applies the
    /// connection pragmas, verifies database integrity, then ensures the
    /// schema is current.
    ///
    /// # Errors
    ///
    /// Returns `Corrupted` when the file fails its integrity check or is not
    /// a SQLite database at all; `Schema` when applying the schema fails;
    /// `Io` when parent directories cannot be created.
    pub fn open(path: &Path) -> VaultResult<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| VaultError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let conn = Connection::open(path)?;
        configure_connection(&conn)?;
        run_integrity_check(&conn)?;
        ensure_schema(&conn)?;

        tracing::debug!("opened vault database at {}", path.display());
        Ok(Self { conn })
    }

    // ===========================================
    // Connection Accessors
    // ===========================================

    /// Returns a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Returns a mutable reference to the underlying SQLite connection.
    pub fn conn_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    // ===========================================
    // Transaction Support
    // ===========================================

    /// Begins a new write transaction.
    ///
    /// Rolls back automatically on drop unless `commit()` is called.
    pub fn transaction(&mut self) -> VaultResult<Transaction<'_>> {
        Transaction::begin(&self.conn)
    }

    // ===========================================
    // Health & Shutdown
    // ===========================================

    /// Runs SQLite's integrity check against the open database.
    ///
    /// # Errors
    ///
    /// Returns `Corrupted` with the first problem SQLite reports.
    pub fn integrity_check(&self) -> VaultResult<()> {
        run_integrity_check(&self.conn)
    }

    /// Closes the vault, flushing pending WAL content back into the
    /// database file.
    ///
    /// Consumes the vault; the type system rules out use after close.
    pub fn close(self) -> VaultResult<()> {
        self.conn.close().map_err(|(_, e)| VaultError::Database(e))
    }
}

/// Applies the per-connection pragmas: referential integrity on, WAL
/// journaling with relaxed syncs, and a larger page cache.
fn configure_connection(conn: &Connection) -> VaultResult<()> {
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;
         PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA cache_size = 10000;",
    )
    .map_err(classify_open_error)
}

fn run_integrity_check(conn: &Connection) -> VaultResult<()> {
    let verdict: String = conn
        .query_row("PRAGMA integrity_check", [], |row| row.get(0))
        .map_err(classify_open_error)?;

    if verdict == "ok" {
        Ok(())
    } else {
        Err(VaultError::corrupted(verdict))
    }
}

/// Maps the SQLite result codes that mean "this file is damaged" onto
/// `Corrupted` so the recovery policy can react uniformly.
fn classify_open_error(e: rusqlite::Error) -> VaultError {
    match &e {
        rusqlite::Error::SqliteFailure(inner, message)
            if matches!(
                inner.code,
                ErrorCode::NotADatabase | ErrorCode::DatabaseCorrupt
            ) =>
        {
            VaultError::corrupted(message.clone().unwrap_or_else(|| inner.to_string()))
        }
        _ => VaultError::Database(e),
    }
}
