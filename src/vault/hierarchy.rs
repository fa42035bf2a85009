//! Folder tree assembly from flat folder and note rows.

use crate::domain::{Folder, FolderId, Note};
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::HashMap;

/// A folder with its subtree and directly contained notes.
///
/// The projection a sidebar renders: children and notes keep the order the
/// store returned them in (name and title order respectively).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FolderNode {
    folder: Folder,
    children: Vec<FolderNode>,
    notes: Vec<Note>,
}

impl FolderNode {
    /// Returns the folder at this node.
    pub fn folder(&self) -> &Folder {
        &self.folder
    }

    /// Returns the child folder nodes.
    pub fn children(&self) -> &[FolderNode] {
        &self.children
    }

    /// Returns the notes directly inside this folder.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }
}

/// Builds the folder forest from flat rows.
///
/// Entirely iterative: depths are resolved by walking parent links with a
/// revisit guard, then nodes are attached deepest-first so every child finds
/// its parent still unattached. Sibling order follows input order, which the
/// store supplies name-sorted. A damaged parent loop cannot recurse or hang;
/// its members surface as a chain under the top level. Unassigned notes are
/// not part of the forest.
pub fn assemble(folders: Vec<Folder>, notes: Vec<Note>) -> Vec<FolderNode> {
    let mut notes_by_folder: HashMap<FolderId, Vec<Note>> = HashMap::new();
    for note in notes {
        if let Some(folder_id) = note.folder_id() {
            notes_by_folder.entry(folder_id).or_default().push(note);
        }
    }

    let parent_of: HashMap<FolderId, Option<FolderId>> =
        folders.iter().map(|f| (f.id(), f.parent_id())).collect();

    let mut depth: HashMap<FolderId, usize> = HashMap::new();
    for folder in &folders {
        resolve_depth(folder.id(), &parent_of, &mut depth);
    }

    let position: HashMap<FolderId, usize> = folders
        .iter()
        .enumerate()
        .map(|(i, f)| (f.id(), i))
        .collect();

    let mut nodes: HashMap<FolderId, FolderNode> = folders
        .into_iter()
        .map(|folder| {
            let id = folder.id();
            let notes = notes_by_folder.remove(&id).unwrap_or_default();
            (
                id,
                FolderNode {
                    folder,
                    children: Vec::new(),
                    notes,
                },
            )
        })
        .collect();

    let mut order: Vec<FolderId> = nodes.keys().copied().collect();
    // Siblings share a depth, so the position tie-break keeps them in the
    // store's name order.
    order.sort_by_key(|id| (Reverse(depth[id]), position[id]));

    let mut roots = Vec::new();
    for id in order {
        let Some(node) = nodes.remove(&id) else {
            continue;
        };
        match node.folder.parent_id().and_then(|pid| nodes.get_mut(&pid)) {
            Some(parent) => parent.children.push(node),
            // Top-level folders land here, as do nodes whose parent is
            // missing or already attached (a loop in the stored tree).
            None => roots.push(node),
        }
    }
    roots
}

/// Fills in `depth` for `id` and every unresolved ancestor on its path.
///
/// Walks upward collecting ids until it hits a resolved ancestor, the root,
/// or an id already on the path (a loop), then assigns depths back down the
/// collected path. Loop and dangling-parent anchors count as roots.
fn resolve_depth(
    id: FolderId,
    parent_of: &HashMap<FolderId, Option<FolderId>>,
    depth: &mut HashMap<FolderId, usize>,
) {
    let mut path = Vec::new();
    let mut cursor = Some(id);

    while let Some(folder_id) = cursor {
        if depth.contains_key(&folder_id) || path.contains(&folder_id) {
            break;
        }
        path.push(folder_id);
        cursor = parent_of.get(&folder_id).copied().flatten();
    }

    let mut next_depth = match cursor.and_then(|anchor| depth.get(&anchor)) {
        Some(d) => d + 1,
        None => 0,
    };

    for folder_id in path.into_iter().rev() {
        depth.insert(folder_id, next_depth);
        next_depth += 1;
    }
}
