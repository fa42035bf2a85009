//! Vault startup: opening with corruption recovery and first-run seeding.

use crate::vault::{SqliteVault, VaultError, VaultRepository, VaultResult};
use std::fs;
use std::path::{Path, PathBuf};

const WELCOME_TITLE: &str = "Welcome";
const WELCOME_CONTENT: &str = "Welcome to your vault.\n\n\
Notes live in folders, or stay unassigned like this one. Everything here is\n\
searchable as you type, and note bodies can reference each other with\n\
[[Project Ideas]] style links.\n";

/// The result of opening a vault through the recovery path.
pub struct OpenOutcome {
    pub vault: SqliteVault,
    /// True when a corrupted store was discarded and recreated.
    pub recovered: bool,
}

/// Opens the vault at `path`, creating it if absent.
///
/// Schema setup and the integrity check run inside; a store that fails
/// either propagates its error unchanged.
pub fn open_vault(path: &Path) -> VaultResult<SqliteVault> {
    SqliteVault::open(path)
}

/// Opens the vault at `path`, discarding and recreating it when corrupted.
///
/// Only `Corrupted` triggers the destructive path; the database file and its
/// `-wal`/`-shm` siblings are removed and a fresh store is created in their
/// place. Every other error propagates unchanged.
pub fn open_or_reset(path: &Path) -> VaultResult<OpenOutcome> {
    match SqliteVault::open(path) {
        Ok(vault) => Ok(OpenOutcome {
            vault,
            recovered: false,
        }),
        Err(VaultError::Corrupted { detail }) => {
            tracing::warn!(
                "discarding corrupted vault at {}: {detail}",
                path.display()
            );
            discard_store(path)?;

            let vault = SqliteVault::open(path)?;
            Ok(OpenOutcome {
                vault,
                recovered: true,
            })
        }
        Err(e) => Err(e),
    }
}

/// Seeds starter folders and notes into a completely empty store.
///
/// Returns `true` when content was written, `false` when the store already
/// holds any folder or note.
pub fn seed_starter_content(vault: &mut SqliteVault) -> VaultResult<bool> {
    let folders: i64 = vault
        .conn()
        .query_row("SELECT COUNT(*) FROM folders", [], |row| row.get(0))?;
    let notes: i64 = vault
        .conn()
        .query_row("SELECT COUNT(*) FROM notes", [], |row| row.get(0))?;

    if folders > 0 || notes > 0 {
        return Ok(false);
    }

    let projects = vault.create_folder("Projects", None)?;
    vault.create_folder("Journal", None)?;

    vault.create_note(WELCOME_TITLE, WELCOME_CONTENT, None)?;
    vault.create_note(
        "Project Ideas",
        "Things worth building:\n\n- \n",
        Some(projects),
    )?;

    tracing::info!("seeded starter content into empty vault");
    Ok(true)
}

/// Removes the database file and its WAL siblings, tolerating absence.
fn discard_store(path: &Path) -> VaultResult<()> {
    remove_if_present(path)?;

    for suffix in ["-wal", "-shm"] {
        let mut sidecar = path.as_os_str().to_owned();
        sidecar.push(suffix);
        remove_if_present(Path::new(&sidecar))?;
    }

    Ok(())
}

fn remove_if_present(path: &Path) -> VaultResult<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(VaultError::Io {
            path: PathBuf::from(path),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::DEFAULT_SEARCH_LIMIT;
    use tempfile::tempdir;

    #[test]
    fn open_vault_creates_fresh_store() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("vault.db");

        let vault = open_vault(&db_path).unwrap();
        assert!(db_path.exists());
        assert!(vault.list_folders(None).unwrap().is_empty());
    }

    #[test]
    fn open_or_reset_healthy_store_is_not_recovered() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("vault.db");

        let outcome = open_or_reset(&db_path).unwrap();
        assert!(!outcome.recovered);
    }

    #[test]
    fn open_or_reset_discards_garbage_file() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("vault.db");
        fs::write(&db_path, b"definitely not sqlite").unwrap();
        fs::write(dir.path().join("vault.db-wal"), b"stale wal").unwrap();

        let mut outcome = open_or_reset(&db_path).unwrap();
        assert!(outcome.recovered, "garbage files should trigger recovery");

        // The recreated store must be fully usable.
        let id = outcome
            .vault
            .create_note("After Recovery", "fresh start", None)
            .unwrap();
        assert!(outcome.vault.get_note(id).unwrap().is_some());
    }

    #[test]
    fn open_or_reset_preserves_healthy_data() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("vault.db");

        {
            let mut vault = open_vault(&db_path).unwrap();
            vault.create_note("Keeper", "not corrupt", None).unwrap();
            vault.close().unwrap();
        }

        let outcome = open_or_reset(&db_path).unwrap();
        assert!(!outcome.recovered);
        assert_eq!(outcome.vault.list_notes(None).unwrap().len(), 1);
    }

    #[test]
    fn open_or_reset_propagates_io_errors() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"plain file").unwrap();

        let result = open_or_reset(&blocker.join("nested").join("vault.db"));
        assert!(
            matches!(result, Err(VaultError::Io { .. })),
            "non-corruption errors must not trigger recovery"
        );
    }

    #[test]
    fn seed_populates_empty_store() {
        let mut vault = SqliteVault::open_in_memory().unwrap();

        let seeded = seed_starter_content(&mut vault).unwrap();
        assert!(seeded);

        let roots = vault.list_folders(None).unwrap();
        let names: Vec<&str> = roots.iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["Journal", "Projects"]);

        let welcome = &vault.list_notes(None).unwrap()[0];
        assert_eq!(welcome.title(), "Welcome");
        assert!(
            welcome.has_links(),
            "the welcome note demonstrates link syntax"
        );
    }

    #[test]
    fn seed_is_noop_when_notes_exist() {
        let mut vault = SqliteVault::open_in_memory().unwrap();
        vault.create_note("Existing", "", None).unwrap();

        let seeded = seed_starter_content(&mut vault).unwrap();
        assert!(!seeded);
        assert_eq!(vault.list_notes(None).unwrap().len(), 1);
    }

    #[test]
    fn seed_is_noop_when_folders_exist() {
        let mut vault = SqliteVault::open_in_memory().unwrap();
        vault.create_folder("Existing", None).unwrap();

        let seeded = seed_starter_content(&mut vault).unwrap();
        assert!(!seeded);
        assert!(vault.list_notes(None).unwrap().is_empty());
    }

    #[test]
    fn seeded_content_is_searchable() {
        let mut vault = SqliteVault::open_in_memory().unwrap();
        seed_starter_content(&mut vault).unwrap();

        let hits = vault.search("welcome", DEFAULT_SEARCH_LIMIT).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].note().title(), "Welcome");
    }
}
