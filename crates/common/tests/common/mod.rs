//! Shared test utilities for store integration tests
#![allow(dead_code)]

use common::prelude::*;
use tempfile::TempDir;

pub struct TestEnv {
    pub files: FileStore,
    pub notes: NoteStore,
    pub last_change: LastChange,
    pub temp_dir: TempDir,
}

impl TestEnv {
    pub fn root(&self) -> &std::path::Path {
        self.files.root()
    }
}

/// Set up a shared root with the note and timestamp files kept beside it
pub fn setup_test_env() -> TestEnv {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("shared");
    std::fs::create_dir_all(&root).unwrap();
    let root = root.canonicalize().unwrap();

    let note_path = temp_dir.path().join("note.txt");
    let last_change_path = temp_dir.path().join("last_change.txt");

    let last_change = LastChange::new(&last_change_path);
    let hidden = HiddenPatternSet::standard(&note_path, &last_change_path);
    let files = FileStore::new(PathResolver::new(root), hidden, last_change.clone());
    let notes = NoteStore::new(note_path, last_change.clone());

    TestEnv {
        files,
        notes,
        last_change,
        temp_dir,
    }
}

/// Drop a file straight onto disk, bypassing the store
pub fn put(env: &TestEnv, name: &str, contents: &[u8]) {
    std::fs::write(env.root().join(name), contents).unwrap();
}
