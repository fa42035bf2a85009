//! Integer identifiers for folders and notes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A unique identifier for a folder.
///
/// Wraps the integer primary key SQLite assigns on insert. Identifiers are
/// only meaningful within the store that produced them.
///
/// # Examples
///
/// ```
/// use nook::domain::FolderId;
///
/// let id = FolderId::new(42);
/// assert_eq!(id.as_i64(), 42);
/// assert_eq!(id.to_string(), "42");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FolderId(i64);

impl FolderId {
    /// Creates a FolderId from a raw row id.
    pub fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw row id.
    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for FolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when parsing an invalid folder id string.
#[derive(Debug, Clone)]
pub struct ParseFolderIdError {
    value: String,
}

impl fmt::Display for ParseFolderIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid folder id '{}': not an integer", self.value)
    }
}

impl std::error::Error for ParseFolderIdError {}

impl FromStr for FolderId {
    type Err = ParseFolderIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>()
            .map(FolderId)
            .map_err(|_| ParseFolderIdError {
                value: s.to_string(),
            })
    }
}

/// A unique identifier for a note.
///
/// Same shape as [`FolderId`]; the separate type keeps note and folder ids
/// from being interchanged at call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NoteId(i64);

impl NoteId {
    /// Creates a NoteId from a raw row id.
    pub fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw row id.
    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when parsing an invalid note id string.
#[derive(Debug, Clone)]
pub struct ParseNoteIdError {
    value: String,
}

impl fmt::Display for ParseNoteIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid note id '{}': not an integer", self.value)
    }
}

impl std::error::Error for ParseNoteIdError {}

impl FromStr for NoteId {
    type Err = ParseNoteIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>().map(NoteId).map_err(|_| ParseNoteIdError {
            value: s.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    #[test]
    fn folder_id_roundtrips_raw_value() {
        let id = FolderId::new(7);
        assert_eq!(id.as_i64(), 7);
    }

    #[test]
    fn display_shows_plain_integer() {
        assert_eq!(FolderId::new(12).to_string(), "12");
        assert_eq!(NoteId::new(3).to_string(), "3");
    }

    #[test]
    fn parse_valid_id_string() {
        let id: FolderId = "42".parse().expect("should parse integer string");
        assert_eq!(id, FolderId::new(42));

        let id: NoteId = "9".parse().expect("should parse integer string");
        assert_eq!(id, NoteId::new(9));
    }

    #[test]
    fn parse_rejects_non_integer() {
        let result: Result<FolderId, _> = "abc".parse();
        assert!(result.is_err(), "non-integer string should fail to parse");

        let result: Result<NoteId, _> = "1.5".parse();
        assert!(result.is_err(), "float string should fail to parse");
    }

    #[test]
    fn parse_error_display_includes_value() {
        let err = "abc".parse::<FolderId>().unwrap_err();
        assert!(err.to_string().contains("'abc'"));

        let err = "zz".parse::<NoteId>().unwrap_err();
        assert!(err.to_string().contains("'zz'"));
    }

    #[test]
    fn hash_consistent() {
        let mut set = HashSet::new();
        set.insert(FolderId::new(1));
        set.insert(FolderId::new(1));
        set.insert(FolderId::new(2));
        assert_eq!(set.len(), 2, "equal ids should collapse in a HashSet");
    }

    #[test]
    fn ids_order_by_raw_value() {
        let mut ids = vec![NoteId::new(3), NoteId::new(1), NoteId::new(2)];
        ids.sort();
        assert_eq!(ids, vec![NoteId::new(1), NoteId::new(2), NoteId::new(3)]);
    }

    #[test]
    fn serde_roundtrip_as_plain_number() {
        let id = FolderId::new(42);
        let json = serde_json::to_string(&id).expect("should serialize");
        assert_eq!(json, "42", "id should serialize as a bare number");

        let parsed: FolderId = serde_json::from_str(&json).expect("should deserialize");
        assert_eq!(id, parsed);
    }

    #[test]
    fn debug_format() {
        let debug = format!("{:?}", NoteId::new(5));
        assert_eq!(debug, "NoteId(5)");
    }
}
