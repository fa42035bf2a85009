//! SQLite schema creation and upgrade for the vault.

use crate::vault::{VaultError, VaultResult};
use rusqlite::Connection;

/// Current schema version. Version 1 was the bare tables; version 2 adds the
/// prefix-indexed FTS table and the partial unique indexes for root-level
/// names.
pub(crate) const SCHEMA_VERSION: i64 = 2;

/// Marker substrings that identify the current FTS table definition in
/// `sqlite_master`. A `notes_fts` missing either is stale and gets rebuilt.
const FTS_MARKERS: [&str; 2] = ["content='notes'", "prefix='2 3 4 5'"];

/// Creates or upgrades the database schema.
///
/// Idempotent: a second call against an up-to-date store changes nothing and
/// returns no error. Triggers are dropped and recreated on every call so a
/// definition change heals itself on the next open. If the FTS table is
/// missing or carries a stale definition it is recreated and repopulated
/// from the notes table.
///
/// # Tables Created
/// - `folders` - Hierarchy nodes, self-referencing via `parent_id`
/// - `notes` - Note rows with full markdown content
/// - `notes_fts` - External-content FTS5 index over title and content
/// - `schema_version` - Schema version tracking
///
/// # Errors
///
/// DDL failures surface as `VaultError::Schema`; these are fatal to startup.
pub fn ensure_schema(conn: &Connection) -> VaultResult<()> {
    apply(conn, "PRAGMA foreign_keys = ON;")?;

    // ===========================================
    // Folders Table
    // ===========================================
    apply(
        conn,
        "CREATE TABLE IF NOT EXISTS folders (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL CHECK (name <> ''),
            parent_id INTEGER DEFAULT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (parent_id, name),
            FOREIGN KEY (parent_id) REFERENCES folders(id) ON DELETE CASCADE
        );",
    )?;

    // ===========================================
    // Notes Table
    // ===========================================
    // Deleting a folder detaches its notes instead of removing them.
    apply(
        conn,
        "CREATE TABLE IF NOT EXISTS notes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL CHECK (title <> ''),
            content TEXT NOT NULL,
            folder_id INTEGER DEFAULT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (folder_id, title),
            FOREIGN KEY (folder_id) REFERENCES folders(id) ON DELETE SET NULL
        );",
    )?;

    // ===========================================
    // Indexes
    // ===========================================
    // The UNIQUE pairs above treat NULL parents as distinct, so root-level
    // uniqueness needs its own partial indexes.
    apply(
        conn,
        "CREATE INDEX IF NOT EXISTS idx_folders_parent ON folders(parent_id);
         CREATE INDEX IF NOT EXISTS idx_folders_name ON folders(name);
         CREATE INDEX IF NOT EXISTS idx_notes_folder ON notes(folder_id);
         CREATE INDEX IF NOT EXISTS idx_notes_title ON notes(title);
         CREATE UNIQUE INDEX IF NOT EXISTS idx_folders_root_name
             ON folders(name) WHERE parent_id IS NULL;
         CREATE UNIQUE INDEX IF NOT EXISTS idx_notes_unassigned_title
             ON notes(title) WHERE folder_id IS NULL;",
    )?;

    // ===========================================
    // FTS5 Virtual Table
    // ===========================================
    let needs_rebuild = match fts_definition(conn)? {
        Some(sql) if FTS_MARKERS.iter().all(|m| sql.contains(m)) => false,
        Some(_) => {
            tracing::info!("search index definition is stale; dropping for rebuild");
            apply(conn, "DROP TABLE IF EXISTS notes_fts;")?;
            true
        }
        None => true,
    };

    // Column names must match the notes table for 'rebuild' to work.
    apply(
        conn,
        "CREATE VIRTUAL TABLE IF NOT EXISTS notes_fts USING fts5(
            title,
            content,
            content='notes',
            content_rowid='rowid',
            prefix='2 3 4 5'
        );",
    )?;

    // ===========================================
    // Synchronization Triggers
    // ===========================================
    apply(
        conn,
        "DROP TRIGGER IF EXISTS notes_fts_insert;
        CREATE TRIGGER notes_fts_insert
        AFTER INSERT ON notes BEGIN
            INSERT INTO notes_fts(rowid, title, content)
            VALUES (NEW.rowid, NEW.title, NEW.content);
        END;",
    )?;

    apply(
        conn,
        "DROP TRIGGER IF EXISTS notes_fts_delete;
        CREATE TRIGGER notes_fts_delete
        AFTER DELETE ON notes BEGIN
            INSERT INTO notes_fts(notes_fts, rowid, title, content)
            VALUES ('delete', OLD.rowid, OLD.title, OLD.content);
        END;",
    )?;

    apply(
        conn,
        "DROP TRIGGER IF EXISTS notes_fts_update;
        CREATE TRIGGER notes_fts_update
        AFTER UPDATE ON notes BEGIN
            INSERT INTO notes_fts(notes_fts, rowid, title, content)
            VALUES ('delete', OLD.rowid, OLD.title, OLD.content);
            INSERT INTO notes_fts(rowid, title, content)
            VALUES (NEW.rowid, NEW.title, NEW.content);
        END;",
    )?;

    if needs_rebuild {
        rebuild_search_index(conn)?;
    }

    // ===========================================
    // Schema Version Table
    // ===========================================
    apply(
        conn,
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL
        );",
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (?1, datetime('now'))",
        [SCHEMA_VERSION],
    )?;

    Ok(())
}

/// Returns the current schema version.
pub fn schema_version(conn: &Connection) -> VaultResult<i64> {
    let version = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
        row.get(0)
    })?;
    Ok(version)
}

/// Repopulates the FTS index from the notes table.
///
/// Useful for recovering from index drift after edits that bypass the
/// triggers; also runs automatically when the index definition changes.
pub fn rebuild_search_index(conn: &Connection) -> VaultResult<()> {
    conn.execute("INSERT INTO notes_fts(notes_fts) VALUES('rebuild')", [])?;
    Ok(())
}

/// Returns the stored DDL of `notes_fts`, or `None` if it does not exist.
fn fts_definition(conn: &Connection) -> VaultResult<Option<String>> {
    match conn.query_row(
        "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = 'notes_fts'",
        [],
        |row| row.get::<_, String>(0),
    ) {
        Ok(sql) => Ok(Some(sql)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn apply(conn: &Connection, sql: &str) -> VaultResult<()> {
    conn.execute_batch(sql)
        .map_err(|e| VaultError::Schema(e.to_string()))
}
