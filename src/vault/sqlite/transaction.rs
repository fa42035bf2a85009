//! RAII-based transaction support for SQLite.

use crate::vault::VaultResult;
use rusqlite::{Connection, Params};

/// A database transaction that rolls back automatically on drop.
///
/// Multi-statement vault operations run inside one of these so a mid-way
/// failure leaves no partial state behind. Call `commit()` to keep the
/// changes; dropping without it rolls back.
pub struct Transaction<'a> {
    conn: &'a Connection,
    done: bool,
}

impl<'a> Transaction<'a> {
    /// Opens a transaction with `BEGIN IMMEDIATE`.
    ///
    /// Every transaction in this store writes, so the write lock is claimed
    /// here rather than upgraded mid-transaction. A second writer fails at
    /// begin instead of deep inside an operation.
    pub(crate) fn begin(conn: &'a Connection) -> VaultResult<Self> {
        conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(Self { conn, done: false })
    }

    /// Returns a reference to the underlying connection.
    pub(crate) fn conn(&self) -> &Connection {
        self.conn
    }

    /// Executes a SQL statement within the transaction.
    pub fn execute(&self, sql: &str, params: impl Params) -> VaultResult<usize> {
        Ok(self.conn.execute(sql, params)?)
    }

    /// Commits the transaction, keeping its changes.
    pub fn commit(self) -> VaultResult<()> {
        self.close_with("COMMIT")
    }

    /// Rolls back the transaction explicitly.
    ///
    /// Equivalent to dropping without commit, but makes the intent visible
    /// at the call site.
    pub fn rollback(self) -> VaultResult<()> {
        self.close_with("ROLLBACK")
    }

    // A failed COMMIT leaves `done` false, so drop still attempts the
    // rollback for the case where the transaction stayed open.
    fn close_with(mut self, sql: &str) -> VaultResult<()> {
        self.conn.execute_batch(sql)?;
        self.done = true;
        Ok(())
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.done {
            // Errors are unreportable mid-drop; the connection state stays
            // usable either way.
            let _ = self.conn.execute_batch("ROLLBACK");
        }
    }
}
