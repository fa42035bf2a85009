//! Folder struct representing a node in the vault hierarchy.

use crate::domain::FolderId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of error that occurred when constructing a folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseFolderErrorKind {
    EmptyName,
}

/// Error returned when constructing an invalid folder.
#[derive(Debug, Clone)]
pub struct ParseFolderError {
    kind: ParseFolderErrorKind,
}

impl fmt::Display for ParseFolderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ParseFolderErrorKind::EmptyName => {
                write!(f, "invalid folder: name cannot be empty")
            }
        }
    }
}

impl std::error::Error for ParseFolderError {}

/// A folder in the vault hierarchy.
///
/// Folders nest to arbitrary depth through `parent_id`; a folder with no
/// parent is a root. Sibling folders (including roots) have distinct names,
/// enforced by the store.
///
/// # Examples
///
/// ```
/// use nook::domain::{Folder, FolderId};
/// use chrono::Utc;
///
/// let now = Utc::now();
/// let folder = Folder::new(FolderId::new(1), "Projects", None, now, now).unwrap();
/// assert_eq!(folder.name(), "Projects");
/// assert!(folder.is_root());
/// ```
#[derive(Clone, PartialEq, Serialize)]
pub struct Folder {
    id: FolderId,
    name: String,
    parent_id: Option<FolderId>,
    created: DateTime<Utc>,
    modified: DateTime<Utc>,
}

impl Folder {
    /// Creates a new Folder.
    ///
    /// # Errors
    ///
    /// Returns `ParseFolderError` if the name is empty or whitespace-only.
    pub fn new(
        id: FolderId,
        name: impl Into<String>,
        parent_id: Option<FolderId>,
        created: DateTime<Utc>,
        modified: DateTime<Utc>,
    ) -> Result<Self, ParseFolderError> {
        let name = name.into();
        let trimmed = name.trim();

        if trimmed.is_empty() {
            return Err(ParseFolderError {
                kind: ParseFolderErrorKind::EmptyName,
            });
        }

        Ok(Self {
            id,
            name: trimmed.to_string(),
            parent_id,
            created,
            modified,
        })
    }

    /// Returns the folder's unique identifier.
    pub fn id(&self) -> FolderId {
        self.id
    }

    /// Returns the folder's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the parent folder's identifier, or `None` for a root folder.
    pub fn parent_id(&self) -> Option<FolderId> {
        self.parent_id
    }

    /// Returns when the folder was created.
    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    /// Returns when the folder was last renamed or moved.
    pub fn modified(&self) -> DateTime<Utc> {
        self.modified
    }

    /// Returns true if this folder sits at the top level of the hierarchy.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

impl fmt::Display for Folder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.id)
    }
}

impl fmt::Debug for Folder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Folder")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("parent_id", &self.parent_id)
            .field("created", &self.created)
            .field("modified", &self.modified)
            .finish()
    }
}

impl<'de> Deserialize<'de> for Folder {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct FolderHelper {
            id: FolderId,
            name: String,
            #[serde(default)]
            parent_id: Option<FolderId>,
            created: DateTime<Utc>,
            modified: DateTime<Utc>,
        }

        let helper = FolderHelper::deserialize(deserializer)?;

        Folder::new(
            helper.id,
            helper.name,
            helper.parent_id,
            helper.created,
            helper.modified,
        )
        .map_err(serde::de::Error::custom)
    }
}
