//! Note struct representing a markdown note stored in the vault.

use crate::domain::{FolderId, NoteId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of characters shown in a list preview.
const PREVIEW_CHARS: usize = 100;

/// The kind of error that occurred when constructing a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseNoteErrorKind {
    EmptyTitle,
}

/// Error returned when constructing an invalid note.
#[derive(Debug, Clone)]
pub struct ParseNoteError {
    kind: ParseNoteErrorKind,
}

impl fmt::Display for ParseNoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ParseNoteErrorKind::EmptyTitle => write!(f, "invalid note: title cannot be empty"),
        }
    }
}

impl std::error::Error for ParseNoteError {}

/// A markdown note.
///
/// Notes carry their full content and an optional owning folder. A note whose
/// `folder_id` is `None` is unassigned; it stays in the vault when folders
/// around it are deleted.
///
/// # Examples
///
/// ```
/// use nook::domain::{Note, NoteId};
/// use chrono::Utc;
///
/// let now = Utc::now();
/// let note = Note::new(NoteId::new(1), "API Design", "# Notes\n", None, now, now).unwrap();
/// assert_eq!(note.title(), "API Design");
/// assert!(note.is_unassigned());
/// ```
#[derive(Clone, PartialEq, Serialize)]
pub struct Note {
    id: NoteId,
    title: String,
    content: String,
    folder_id: Option<FolderId>,
    created: DateTime<Utc>,
    modified: DateTime<Utc>,
}

impl Note {
    /// Creates a new Note.
    ///
    /// The title is trimmed; content is stored verbatim and may be empty.
    ///
    /// # Errors
    ///
    /// Returns `ParseNoteError` if the title is empty or whitespace-only.
    pub fn new(
        id: NoteId,
        title: impl Into<String>,
        content: impl Into<String>,
        folder_id: Option<FolderId>,
        created: DateTime<Utc>,
        modified: DateTime<Utc>,
    ) -> Result<Self, ParseNoteError> {
        let title = title.into();
        let trimmed = title.trim();

        if trimmed.is_empty() {
            return Err(ParseNoteError {
                kind: ParseNoteErrorKind::EmptyTitle,
            });
        }

        Ok(Self {
            id,
            title: trimmed.to_string(),
            content: content.into(),
            folder_id,
            created,
            modified,
        })
    }

    /// Returns the note's unique identifier.
    pub fn id(&self) -> NoteId {
        self.id
    }

    /// Returns the note's title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the note's full markdown content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the owning folder's identifier, or `None` if unassigned.
    pub fn folder_id(&self) -> Option<FolderId> {
        self.folder_id
    }

    /// Returns when the note was created.
    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    /// Returns when the note was last edited or moved.
    pub fn modified(&self) -> DateTime<Utc> {
        self.modified
    }

    /// Returns true if the note has no owning folder.
    pub fn is_unassigned(&self) -> bool {
        self.folder_id.is_none()
    }

    /// Returns a short content excerpt for list rendering.
    ///
    /// The first 100 characters of content, trailing whitespace stripped,
    /// with an ellipsis only when content was cut off.
    pub fn preview(&self) -> String {
        let mut chars = self.content.chars();
        let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
        let head = head.trim_end();

        if chars.next().is_some() {
            format!("{head}...")
        } else {
            head.to_string()
        }
    }

    /// Returns true if the content contains `[[...]]` wiki-link markers.
    pub fn has_links(&self) -> bool {
        self.content.contains("[[") && self.content.contains("]]")
    }

    /// Replaces the title.
    ///
    /// # Errors
    ///
    /// Returns `ParseNoteError` if the new title is empty or whitespace-only.
    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), ParseNoteError> {
        let title = title.into();
        let trimmed = title.trim();

        if trimmed.is_empty() {
            return Err(ParseNoteError {
                kind: ParseNoteErrorKind::EmptyTitle,
            });
        }

        self.title = trimmed.to_string();
        Ok(())
    }

    /// Replaces the content.
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    /// Replaces the owning folder reference.
    pub fn set_folder(&mut self, folder_id: Option<FolderId>) {
        self.folder_id = folder_id;
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.title, self.id)
    }
}

impl fmt::Debug for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Note")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("content_len", &self.content.len())
            .field("folder_id", &self.folder_id)
            .field("created", &self.created)
            .field("modified", &self.modified)
            .finish()
    }
}

impl<'de> Deserialize<'de> for Note {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct NoteHelper {
            id: NoteId,
            title: String,
            #[serde(default)]
            content: String,
            #[serde(default)]
            folder_id: Option<FolderId>,
            created: DateTime<Utc>,
            modified: DateTime<Utc>,
        }

        let helper = NoteHelper::deserialize(deserializer)?;

        Note::new(
            helper.id,
            helper.title,
            helper.content,
            helper.folder_id,
            helper.created,
            helper.modified,
        )
        .map_err(serde::de::Error::custom)
    }
}
