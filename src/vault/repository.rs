//! VaultRepository trait and result types.

use crate::domain::{Folder, FolderId, Note, NoteId};
use crate::vault::FolderNode;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Default number of search results when the caller has no preference.
pub const DEFAULT_SEARCH_LIMIT: usize = 50;

// ===========================================
// VaultError Type
// ===========================================

/// Errors that can occur during vault operations.
#[derive(Debug, Error)]
pub enum VaultError {
    /// A data rule was violated: duplicate sibling name, blank required
    /// field, a move that would create a cycle, or a delete that would
    /// orphan child folders. Recoverable; surface the message to the user.
    #[error("constraint violation: {message}")]
    ConstraintViolation { message: String },

    /// A mutation was addressed to a folder that does not exist.
    #[error("folder not found: {id}")]
    FolderNotFound { id: FolderId },

    /// A mutation was addressed to a note that does not exist.
    #[error("note not found: {id}")]
    NoteNotFound { id: NoteId },

    /// The database failed its integrity check or a stored row is
    /// undecodable. The only remedy is to discard and recreate the store.
    #[error("store corrupted: {detail}")]
    Corrupted { detail: String },

    /// Applying the schema failed for a structural reason.
    #[error("schema error: {0}")]
    Schema(String),

    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// An I/O error occurred.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl VaultError {
    pub(crate) fn constraint(message: impl Into<String>) -> Self {
        VaultError::ConstraintViolation {
            message: message.into(),
        }
    }

    pub(crate) fn corrupted(detail: impl Into<String>) -> Self {
        VaultError::Corrupted {
            detail: detail.into(),
        }
    }
}

/// Result type for vault operations.
pub type VaultResult<T> = Result<T, VaultError>;

// ===========================================
// SearchResult Type
// ===========================================

/// A search result with relevance ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    note: Note,
    rank: f64,
    snippet: Option<String>,
}

impl SearchResult {
    /// Creates a new SearchResult without a snippet.
    pub fn new(note: Note, rank: f64) -> Self {
        Self {
            note,
            rank,
            snippet: None,
        }
    }

    /// Creates a new SearchResult with a snippet.
    pub fn with_snippet(note: Note, rank: f64, snippet: impl Into<String>) -> Self {
        Self {
            note,
            rank,
            snippet: Some(snippet.into()),
        }
    }

    /// Returns the matched note.
    pub fn note(&self) -> &Note {
        &self.note
    }

    /// Returns the relevance rank (higher is more relevant).
    pub fn rank(&self) -> f64 {
        self.rank
    }

    /// Returns the highlighted match excerpt, if any.
    pub fn snippet(&self) -> Option<&str> {
        self.snippet.as_deref()
    }
}

// ===========================================
// VaultRepository Trait
// ===========================================

/// Repository trait for the note vault.
///
/// Defines the storage interface a presentation layer consumes: folder and
/// note lifecycle, ranked full-text search, and hierarchy projection.
/// Reads addressed to a missing row return `None`; mutations addressed to a
/// missing row fail with `FolderNotFound`/`NoteNotFound`.
pub trait VaultRepository {
    /// Creates a folder under `parent` (a root folder when `None`).
    ///
    /// Fails with `ConstraintViolation` for a blank name or a sibling name
    /// collision.
    fn create_folder(&mut self, name: &str, parent: Option<FolderId>) -> VaultResult<FolderId>;

    /// Retrieves a single folder by id.
    fn get_folder(&self, id: FolderId) -> VaultResult<Option<Folder>>;

    /// Lists the direct child folders of `parent` (roots when `None`),
    /// ordered by name.
    fn list_folders(&self, parent: Option<FolderId>) -> VaultResult<Vec<Folder>>;

    /// Renames a folder, bumping its modified timestamp.
    fn rename_folder(&mut self, id: FolderId, name: &str) -> VaultResult<()>;

    /// Reparents a folder (to the root level when `None`), bumping its
    /// modified timestamp.
    ///
    /// Fails with `ConstraintViolation` if the move would make the folder
    /// its own ancestor.
    fn move_folder(&mut self, id: FolderId, new_parent: Option<FolderId>) -> VaultResult<()>;

    /// Deletes a folder.
    ///
    /// With `recursive`, the whole subtree is removed and every note owned
    /// by a removed folder becomes unassigned. Without it, the delete fails
    /// with `ConstraintViolation` when child folders exist; directly
    /// contained notes are detached either way.
    fn delete_folder(&mut self, id: FolderId, recursive: bool) -> VaultResult<()>;

    /// Creates a note in `folder` (unassigned when `None`).
    ///
    /// Fails with `ConstraintViolation` for a blank title or a title
    /// collision within the folder.
    fn create_note(&mut self, title: &str, content: &str, folder: Option<FolderId>)
    -> VaultResult<NoteId>;

    /// Retrieves a single note by id.
    fn get_note(&self, id: NoteId) -> VaultResult<Option<Note>>;

    /// Lists the notes directly inside `folder` (unassigned notes when
    /// `None`), ordered by title.
    fn list_notes(&self, folder: Option<FolderId>) -> VaultResult<Vec<Note>>;

    /// Replaces a note's title, content, and folder reference; always bumps
    /// the modified timestamp.
    fn update_note(&mut self, note: &Note) -> VaultResult<()>;

    /// Moves a note into `folder` (unassigned when `None`), bumping its
    /// modified timestamp.
    fn move_note(&mut self, id: NoteId, folder: Option<FolderId>) -> VaultResult<()>;

    /// Deletes a note.
    fn delete_note(&mut self, id: NoteId) -> VaultResult<()>;

    /// Full-text search over titles and content.
    ///
    /// Every term matches as a prefix; results come back ranked, most
    /// relevant first, at most `limit` of them. An empty or unusable query
    /// returns an empty result rather than an error.
    fn search(&self, query: &str, limit: usize) -> VaultResult<Vec<SearchResult>>;

    /// Loads the entire folder tree with notes attached.
    fn build_hierarchy(&self) -> VaultResult<Vec<FolderNode>>;

    /// Returns the folder ids above a note, nearest first.
    ///
    /// The note's own folder leads the chain; an unassigned note yields an
    /// empty chain.
    fn parent_chain(&self, id: NoteId) -> VaultResult<Vec<FolderId>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    // ===========================================
    // Test Helpers
    // ===========================================

    fn test_datetime() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-01-15T10:30:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn sample_note() -> Note {
        Note::new(
            NoteId::new(1),
            "Test Note",
            "body",
            None,
            test_datetime(),
            test_datetime(),
        )
        .unwrap()
    }

    // ===========================================
    // VaultError Type
    // ===========================================

    #[test]
    fn error_note_not_found_displays_id() {
        let error = VaultError::NoteNotFound { id: NoteId::new(42) };
        let msg = error.to_string();
        assert!(msg.contains("not found"), "should mention 'not found'");
        assert!(msg.contains("42"), "should include the id");
    }

    #[test]
    fn error_folder_not_found_displays_id() {
        let error = VaultError::FolderNotFound {
            id: FolderId::new(7),
        };
        assert!(error.to_string().contains("folder not found: 7"));
    }

    #[test]
    fn error_constraint_displays_message() {
        let error = VaultError::constraint("folder 'Projects' already exists");
        let msg = error.to_string();
        assert!(msg.contains("constraint violation"));
        assert!(msg.contains("'Projects'"));
    }

    #[test]
    fn error_corrupted_displays_detail() {
        let error = VaultError::corrupted("row 3 missing from index");
        let msg = error.to_string();
        assert!(msg.contains("store corrupted"));
        assert!(msg.contains("row 3"));
    }

    #[test]
    fn error_implements_std_error() {
        fn assert_error<E: std::error::Error>() {}
        assert_error::<VaultError>();
    }

    #[test]
    fn error_wraps_rusqlite() {
        let inner = rusqlite::Error::QueryReturnedNoRows;
        let error: VaultError = inner.into();
        assert!(matches!(error, VaultError::Database(_)));
    }

    // ===========================================
    // SearchResult Type
    // ===========================================

    #[test]
    fn search_result_stores_note_and_rank() {
        let result = SearchResult::new(sample_note(), 0.75);

        assert_eq!(result.note().title(), "Test Note");
        assert!((result.rank() - 0.75).abs() < f64::EPSILON);
        assert_eq!(result.snippet(), None);
    }

    #[test]
    fn search_result_with_snippet() {
        let result =
            SearchResult::with_snippet(sample_note(), 0.9, "...matching <b>text</b> here...");

        assert_eq!(result.snippet(), Some("...matching <b>text</b> here..."));
        assert!((result.rank() - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn search_result_clone() {
        let result = SearchResult::new(sample_note(), 0.5);
        let cloned = result.clone();
        assert!((result.rank() - cloned.rank()).abs() < f64::EPSILON);
        assert_eq!(result.note().title(), cloned.note().title());
    }
}
