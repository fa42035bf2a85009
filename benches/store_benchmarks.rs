//! Benchmarks for vault store operations.
//!
//! Run with: cargo bench --bench store_benchmarks

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use nook::domain::{FolderId, NoteId};
use nook::vault::{DEFAULT_SEARCH_LIMIT, SqliteVault, VaultRepository};

// =============================================================================
// Test Data Generation
// =============================================================================

/// Sample words for generating realistic note content
const WORDS: &[&str] = &[
    "architecture",
    "design",
    "pattern",
    "system",
    "component",
    "interface",
    "module",
    "function",
    "method",
    "struct",
    "implementation",
    "abstraction",
    "dependency",
    "injection",
    "testing",
    "integration",
    "unit",
    "performance",
    "optimization",
    "refactoring",
];

/// Generate a deterministic note body from an index
fn note_body(index: usize) -> String {
    let words: Vec<&str> = (0..50).map(|j| WORDS[(index + j) % WORDS.len()]).collect();
    words.join(" ")
}

fn note_title(index: usize) -> String {
    format!("Note {:04} - {}", index, WORDS[index % WORDS.len()])
}

/// Build an in-memory vault with `folder_count` root folders holding
/// `notes_per_folder` notes each.
fn populate_vault(
    folder_count: usize,
    notes_per_folder: usize,
) -> (SqliteVault, Vec<FolderId>, Vec<NoteId>) {
    let mut vault = SqliteVault::open_in_memory().expect("failed to open vault");
    let mut folders = Vec::with_capacity(folder_count);
    let mut notes = Vec::with_capacity(folder_count * notes_per_folder);

    for f in 0..folder_count {
        let folder = vault
            .create_folder(&format!("Folder {f:03}"), None)
            .expect("failed to create folder");
        folders.push(folder);

        for n in 0..notes_per_folder {
            let index = f * notes_per_folder + n;
            let note = vault
                .create_note(&note_title(index), &note_body(index), Some(folder))
                .expect("failed to create note");
            notes.push(note);
        }
    }

    (vault, folders, notes)
}

/// Build a vault with a single folder chain of `depth` levels and one note
/// at the bottom.
fn deep_chain_vault(depth: usize) -> (SqliteVault, NoteId) {
    let mut vault = SqliteVault::open_in_memory().expect("failed to open vault");
    let mut parent = None;

    for level in 0..depth {
        let id = vault
            .create_folder(&format!("Level {level:03}"), parent)
            .expect("failed to create folder");
        parent = Some(id);
    }

    let note = vault
        .create_note("Deep Note", "at the bottom of the chain", parent)
        .expect("failed to create note");
    (vault, note)
}

// =============================================================================
// Ingest Benchmarks
// =============================================================================

fn bench_ingest_notes(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingest");

    for size in [100, 500, 1000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("notes", size), &size, |b, &size| {
            b.iter(|| {
                let mut vault = SqliteVault::open_in_memory().unwrap();
                for i in 0..size {
                    vault
                        .create_note(&note_title(i), &note_body(i), None)
                        .unwrap();
                }
                vault
            });
        });
    }

    group.finish();
}

// =============================================================================
// Query Benchmarks
// =============================================================================

fn bench_search(c: &mut Criterion) {
    let (vault, _folders, _notes) = populate_vault(20, 50);

    let mut group = c.benchmark_group("search");

    group.bench_function("simple_term", |b| {
        b.iter(|| vault.search("architecture", DEFAULT_SEARCH_LIMIT).unwrap())
    });

    group.bench_function("prefix_term", |b| {
        b.iter(|| vault.search("optim", DEFAULT_SEARCH_LIMIT).unwrap())
    });

    group.bench_function("multi_term", |b| {
        b.iter(|| {
            vault
                .search("architecture testing", DEFAULT_SEARCH_LIMIT)
                .unwrap()
        })
    });

    group.bench_function("small_limit", |b| {
        b.iter(|| vault.search("design", 10).unwrap())
    });

    group.finish();
}

fn bench_get_note(c: &mut Criterion) {
    let (vault, _folders, notes) = populate_vault(20, 50);

    let mut group = c.benchmark_group("get_note");

    group.bench_function("single_lookup", |b| {
        let id = notes[0];
        b.iter(|| vault.get_note(id).unwrap())
    });

    group.bench_function("100_lookups", |b| {
        b.iter(|| {
            for id in notes.iter().take(100) {
                let _ = vault.get_note(*id).unwrap();
            }
        })
    });

    group.finish();
}

fn bench_list_notes(c: &mut Criterion) {
    let (vault, folders, _notes) = populate_vault(20, 50);
    let folder = folders[0];

    c.bench_function("list_notes_in_folder", |b| {
        b.iter(|| vault.list_notes(Some(folder)).unwrap())
    });
}

// =============================================================================
// Hierarchy Benchmarks
// =============================================================================

fn bench_build_hierarchy(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_hierarchy");

    for size in [100, 500, 1000] {
        let (vault, _folders, _notes) = populate_vault(size / 10, 10);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("notes", size), &size, |b, _| {
            b.iter(|| vault.build_hierarchy().unwrap());
        });
    }

    let (deep, _note) = deep_chain_vault(100);
    group.bench_function("deep_chain_100", |b| {
        b.iter(|| deep.build_hierarchy().unwrap())
    });

    group.finish();
}

fn bench_parent_chain(c: &mut Criterion) {
    let (vault, note) = deep_chain_vault(100);

    c.bench_function("parent_chain_depth_100", |b| {
        b.iter(|| vault.parent_chain(note).unwrap())
    });
}

// =============================================================================
// Criterion Groups
// =============================================================================

criterion_group!(ingest_benches, bench_ingest_notes);

criterion_group!(
    query_benches,
    bench_search,
    bench_get_note,
    bench_list_notes,
);

criterion_group!(hierarchy_benches, bench_build_hierarchy, bench_parent_chain);

criterion_main!(ingest_benches, query_benches, hierarchy_benches);
