//! VaultRepository trait implementation for SqliteVault.

use super::SqliteVault;
use crate::domain::{Folder, FolderId, Note, NoteId};
use crate::vault::query::build_match_expr;
use crate::vault::{FolderNode, SearchResult, VaultError, VaultRepository, VaultResult, assemble};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, ErrorCode, Row};
use std::collections::HashSet;

impl VaultRepository for SqliteVault {
    fn create_folder(&mut self, name: &str, parent: Option<FolderId>) -> VaultResult<FolderId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(VaultError::constraint("folder name cannot be empty"));
        }

        if let Some(parent_id) = parent
            && !folder_exists(&self.conn, parent_id)?
        {
            return Err(VaultError::FolderNotFound { id: parent_id });
        }

        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO folders (name, parent_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![name, parent.map(FolderId::as_i64), now, now],
            )
            .map_err(|e| {
                constraint_or_db(e, format!("a folder named '{name}' already exists here"))
            })?;

        Ok(FolderId::new(self.conn.last_insert_rowid()))
    }

    fn get_folder(&self, id: FolderId) -> VaultResult<Option<Folder>> {
        fetch_folder(&self.conn, id)
    }

    fn list_folders(&self, parent: Option<FolderId>) -> VaultResult<Vec<Folder>> {
        let rows = match parent {
            None => {
                let mut stmt = self.conn.prepare(
                    "SELECT id, name, parent_id, created_at, updated_at
                     FROM folders WHERE parent_id IS NULL ORDER BY name",
                )?;
                let rows: Result<Vec<FolderRow>, _> =
                    stmt.query_map([], read_folder_row)?.collect();
                rows?
            }
            Some(parent_id) => {
                let mut stmt = self.conn.prepare(
                    "SELECT id, name, parent_id, created_at, updated_at
                     FROM folders WHERE parent_id = ? ORDER BY name",
                )?;
                let rows: Result<Vec<FolderRow>, _> =
                    stmt.query_map([parent_id.as_i64()], read_folder_row)?.collect();
                rows?
            }
        };

        rows.into_iter().map(decode_folder).collect()
    }

    fn rename_folder(&mut self, id: FolderId, name: &str) -> VaultResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(VaultError::constraint("folder name cannot be empty"));
        }

        let now = Utc::now().to_rfc3339();
        let changed = self
            .conn
            .execute(
                "UPDATE folders SET name = ?1, updated_at = ?2 WHERE id = ?3",
                rusqlite::params![name, now, id.as_i64()],
            )
            .map_err(|e| {
                constraint_or_db(e, format!("a folder named '{name}' already exists here"))
            })?;

        if changed == 0 {
            return Err(VaultError::FolderNotFound { id });
        }
        Ok(())
    }

    fn move_folder(&mut self, id: FolderId, new_parent: Option<FolderId>) -> VaultResult<()> {
        let tx = self.transaction()?;

        let Some(folder) = fetch_folder(tx.conn(), id)? else {
            return Err(VaultError::FolderNotFound { id });
        };

        if let Some(parent_id) = new_parent {
            if parent_id == id {
                return Err(VaultError::constraint("cannot move a folder into itself"));
            }
            if !folder_exists(tx.conn(), parent_id)? {
                return Err(VaultError::FolderNotFound { id: parent_id });
            }
            // The destination's ancestor chain must not pass through the
            // folder being moved, or the subtree would detach into a cycle.
            if chain_contains(tx.conn(), parent_id, id)? {
                return Err(VaultError::constraint(
                    "cannot move a folder into its own descendant",
                ));
            }
        }

        let now = Utc::now().to_rfc3339();
        tx.conn()
            .execute(
                "UPDATE folders SET parent_id = ?1, updated_at = ?2 WHERE id = ?3",
                rusqlite::params![new_parent.map(FolderId::as_i64), now, id.as_i64()],
            )
            .map_err(|e| {
                constraint_or_db(
                    e,
                    format!(
                        "a folder named '{}' already exists at the destination",
                        folder.name()
                    ),
                )
            })?;

        tx.commit()
    }

    fn delete_folder(&mut self, id: FolderId, recursive: bool) -> VaultResult<()> {
        let tx = self.transaction()?;

        if !folder_exists(tx.conn(), id)? {
            return Err(VaultError::FolderNotFound { id });
        }

        if !recursive {
            let children: i64 = tx.conn().query_row(
                "SELECT COUNT(*) FROM folders WHERE parent_id = ?",
                [id.as_i64()],
                |row| row.get(0),
            )?;
            if children > 0 {
                return Err(VaultError::constraint(
                    "folder has subfolders; delete them first or pass recursive",
                ));
            }
        }

        // The subtree goes with it via ON DELETE CASCADE; contained notes
        // are detached to unassigned via ON DELETE SET NULL.
        tx.execute("DELETE FROM folders WHERE id = ?", [id.as_i64()])?;
        tx.commit()
    }

    fn create_note(
        &mut self,
        title: &str,
        content: &str,
        folder: Option<FolderId>,
    ) -> VaultResult<NoteId> {
        let title = title.trim();
        if title.is_empty() {
            return Err(VaultError::constraint("note title cannot be empty"));
        }

        if let Some(folder_id) = folder
            && !folder_exists(&self.conn, folder_id)?
        {
            return Err(VaultError::FolderNotFound { id: folder_id });
        }

        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO notes (title, content, folder_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![title, content, folder.map(FolderId::as_i64), now, now],
            )
            .map_err(|e| {
                constraint_or_db(e, format!("a note titled '{title}' already exists here"))
            })?;

        Ok(NoteId::new(self.conn.last_insert_rowid()))
    }

    fn get_note(&self, id: NoteId) -> VaultResult<Option<Note>> {
        fetch_note(&self.conn, id)
    }

    fn list_notes(&self, folder: Option<FolderId>) -> VaultResult<Vec<Note>> {
        let rows = match folder {
            None => {
                let mut stmt = self.conn.prepare(
                    "SELECT id, title, content, folder_id, created_at, updated_at
                     FROM notes WHERE folder_id IS NULL ORDER BY title",
                )?;
                let rows: Result<Vec<NoteRow>, _> = stmt.query_map([], read_note_row)?.collect();
                rows?
            }
            Some(folder_id) => {
                let mut stmt = self.conn.prepare(
                    "SELECT id, title, content, folder_id, created_at, updated_at
                     FROM notes WHERE folder_id = ? ORDER BY title",
                )?;
                let rows: Result<Vec<NoteRow>, _> =
                    stmt.query_map([folder_id.as_i64()], read_note_row)?.collect();
                rows?
            }
        };

        rows.into_iter().map(decode_note).collect()
    }

    fn update_note(&mut self, note: &Note) -> VaultResult<()> {
        if let Some(folder_id) = note.folder_id()
            && !folder_exists(&self.conn, folder_id)?
        {
            return Err(VaultError::FolderNotFound { id: folder_id });
        }

        let now = Utc::now().to_rfc3339();
        let changed = self
            .conn
            .execute(
                "UPDATE notes SET title = ?1, content = ?2, folder_id = ?3, updated_at = ?4
                 WHERE id = ?5",
                rusqlite::params![
                    note.title(),
                    note.content(),
                    note.folder_id().map(FolderId::as_i64),
                    now,
                    note.id().as_i64(),
                ],
            )
            .map_err(|e| {
                constraint_or_db(
                    e,
                    format!("a note titled '{}' already exists here", note.title()),
                )
            })?;

        if changed == 0 {
            return Err(VaultError::NoteNotFound { id: note.id() });
        }
        Ok(())
    }

    fn move_note(&mut self, id: NoteId, folder: Option<FolderId>) -> VaultResult<()> {
        if let Some(folder_id) = folder
            && !folder_exists(&self.conn, folder_id)?
        {
            return Err(VaultError::FolderNotFound { id: folder_id });
        }

        let now = Utc::now().to_rfc3339();
        let changed = self
            .conn
            .execute(
                "UPDATE notes SET folder_id = ?1, updated_at = ?2 WHERE id = ?3",
                rusqlite::params![folder.map(FolderId::as_i64), now, id.as_i64()],
            )
            .map_err(|e| {
                constraint_or_db(
                    e,
                    "a note with the same title already exists at the destination",
                )
            })?;

        if changed == 0 {
            return Err(VaultError::NoteNotFound { id });
        }
        Ok(())
    }

    fn delete_note(&mut self, id: NoteId) -> VaultResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM notes WHERE id = ?", [id.as_i64()])?;

        if changed == 0 {
            return Err(VaultError::NoteNotFound { id });
        }
        Ok(())
    }

    fn search(&self, query: &str, limit: usize) -> VaultResult<Vec<SearchResult>> {
        let Some(match_expr) = build_match_expr(query) else {
            return Ok(Vec::new());
        };

        // SQLite reads a negative LIMIT as "no limit", so oversized values
        // clamp instead of wrapping.
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        // Weighted BM25 ranking: title=5, content=1. bm25() scores
        // lower-is-better, so the sign flip makes rank sort descending.
        let mut stmt = self.conn.prepare(
            "SELECT n.id, n.title, n.content, n.folder_id, n.created_at, n.updated_at,
                    -bm25(notes_fts, 5.0, 1.0) as rank,
                    snippet(notes_fts, -1, '<b>', '</b>', '...', 20) as snippet
             FROM notes_fts
             JOIN notes n ON notes_fts.rowid = n.rowid
             WHERE notes_fts MATCH ?1
             ORDER BY rank DESC
             LIMIT ?2",
        )?;

        let rows = stmt.query_map(rusqlite::params![match_expr, limit], |row| {
            Ok((
                read_note_row(row)?,
                row.get::<_, f64>(6)?,
                row.get::<_, String>(7)?,
            ))
        });

        let rows = match rows {
            Ok(rows) => rows,
            Err(e) if is_fts_error(&e) => {
                tracing::warn!("search query '{query}' rejected by fts5: {e}");
                return Ok(Vec::new());
            }
            Err(e) => return Err(VaultError::Database(e)),
        };

        let mut results = Vec::new();
        for row in rows {
            let (note_row, rank, excerpt) = match row {
                Ok(row) => row,
                Err(e) if is_fts_error(&e) => {
                    tracing::warn!("search query '{query}' rejected by fts5: {e}");
                    return Ok(Vec::new());
                }
                Err(e) => return Err(VaultError::Database(e)),
            };

            let note = decode_note(note_row)?;
            let result = if excerpt.is_empty() {
                SearchResult::new(note, rank)
            } else {
                SearchResult::with_snippet(note, rank, excerpt)
            };
            results.push(result);
        }

        Ok(results)
    }

    fn build_hierarchy(&self) -> VaultResult<Vec<FolderNode>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, parent_id, created_at, updated_at FROM folders ORDER BY name",
        )?;
        let folder_rows: Result<Vec<FolderRow>, _> = stmt.query_map([], read_folder_row)?.collect();
        let folders = folder_rows?
            .into_iter()
            .map(decode_folder)
            .collect::<VaultResult<Vec<_>>>()?;

        let mut stmt = self.conn.prepare(
            "SELECT id, title, content, folder_id, created_at, updated_at
             FROM notes WHERE folder_id IS NOT NULL ORDER BY title",
        )?;
        let note_rows: Result<Vec<NoteRow>, _> = stmt.query_map([], read_note_row)?.collect();
        let notes = note_rows?
            .into_iter()
            .map(decode_note)
            .collect::<VaultResult<Vec<_>>>()?;

        Ok(assemble(folders, notes))
    }

    fn parent_chain(&self, id: NoteId) -> VaultResult<Vec<FolderId>> {
        let owner = self.conn.query_row(
            "SELECT folder_id FROM notes WHERE id = ?",
            [id.as_i64()],
            |row| row.get::<_, Option<i64>>(0),
        );

        let owner = match owner {
            Ok(folder_id) => folder_id.map(FolderId::new),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                return Err(VaultError::NoteNotFound { id });
            }
            Err(e) => return Err(VaultError::Database(e)),
        };

        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut cursor = owner;

        while let Some(folder_id) = cursor {
            if !seen.insert(folder_id) {
                return Err(VaultError::corrupted(format!(
                    "parent loop detected at folder {folder_id}"
                )));
            }
            chain.push(folder_id);
            cursor = parent_of(&self.conn, folder_id)?;
        }

        Ok(chain)
    }
}

// ===========================================
// Row Decoding
// ===========================================

type FolderRow = (i64, String, Option<i64>, String, String);
type NoteRow = (i64, String, String, Option<i64>, String, String);

fn read_folder_row(row: &Row<'_>) -> rusqlite::Result<FolderRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
    ))
}

fn read_note_row(row: &Row<'_>) -> rusqlite::Result<NoteRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn decode_folder(row: FolderRow) -> VaultResult<Folder> {
    let (id, name, parent_id, created, modified) = row;
    let created = parse_timestamp("created_at", &created)?;
    let modified = parse_timestamp("updated_at", &modified)?;

    Folder::new(
        FolderId::new(id),
        name,
        parent_id.map(FolderId::new),
        created,
        modified,
    )
    .map_err(|e| VaultError::corrupted(format!("folder {id} is unreadable: {e}")))
}

fn decode_note(row: NoteRow) -> VaultResult<Note> {
    let (id, title, content, folder_id, created, modified) = row;
    let created = parse_timestamp("created_at", &created)?;
    let modified = parse_timestamp("updated_at", &modified)?;

    Note::new(
        NoteId::new(id),
        title,
        content,
        folder_id.map(FolderId::new),
        created,
        modified,
    )
    .map_err(|e| VaultError::corrupted(format!("note {id} is unreadable: {e}")))
}

fn parse_timestamp(column: &str, raw: &str) -> VaultResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|e| VaultError::corrupted(format!("invalid {column} timestamp '{raw}': {e}")))
}

// ===========================================
// Lookup Helpers
// ===========================================

fn fetch_folder(conn: &Connection, id: FolderId) -> VaultResult<Option<Folder>> {
    let row = conn.query_row(
        "SELECT id, name, parent_id, created_at, updated_at FROM folders WHERE id = ?",
        [id.as_i64()],
        read_folder_row,
    );

    match row {
        Ok(row) => Ok(Some(decode_folder(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(VaultError::Database(e)),
    }
}

fn fetch_note(conn: &Connection, id: NoteId) -> VaultResult<Option<Note>> {
    let row = conn.query_row(
        "SELECT id, title, content, folder_id, created_at, updated_at FROM notes WHERE id = ?",
        [id.as_i64()],
        read_note_row,
    );

    match row {
        Ok(row) => Ok(Some(decode_note(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(VaultError::Database(e)),
    }
}

fn folder_exists(conn: &Connection, id: FolderId) -> VaultResult<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM folders WHERE id = ?",
        [id.as_i64()],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn parent_of(conn: &Connection, id: FolderId) -> VaultResult<Option<FolderId>> {
    let row = conn.query_row(
        "SELECT parent_id FROM folders WHERE id = ?",
        [id.as_i64()],
        |row| row.get::<_, Option<i64>>(0),
    );

    match row {
        Ok(parent) => Ok(parent.map(FolderId::new)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(VaultError::Database(e)),
    }
}

/// Walks the ancestor chain upward from `start`, reporting whether `needle`
/// appears anywhere in it (including `start` itself).
fn chain_contains(conn: &Connection, start: FolderId, needle: FolderId) -> VaultResult<bool> {
    let mut seen = HashSet::new();
    let mut cursor = Some(start);

    while let Some(current) = cursor {
        if current == needle {
            return Ok(true);
        }
        if !seen.insert(current) {
            return Err(VaultError::corrupted(format!(
                "parent loop detected at folder {current}"
            )));
        }
        cursor = parent_of(conn, current)?;
    }

    Ok(false)
}

// ===========================================
// Error Mapping
// ===========================================

fn is_constraint(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _) if err.code == ErrorCode::ConstraintViolation
    )
}

fn constraint_or_db(e: rusqlite::Error, message: impl Into<String>) -> VaultError {
    if is_constraint(&e) {
        VaultError::constraint(message)
    } else {
        VaultError::Database(e)
    }
}

fn is_fts_error(e: &rusqlite::Error) -> bool {
    let msg = e.to_string();
    msg.contains("fts5") || msg.contains("syntax")
}
