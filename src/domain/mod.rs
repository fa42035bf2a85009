//! Core types: Folder, Note, and their integer identifiers

mod folder;
mod id;
mod note;

pub use folder::{Folder, ParseFolderError};
pub use id::{FolderId, NoteId, ParseFolderIdError, ParseNoteIdError};
pub use note::{Note, ParseNoteError};
