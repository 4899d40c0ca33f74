//! Test harness backed by a real database file.

#![allow(dead_code)]

use std::path::PathBuf;

use tempfile::TempDir;

use reportify::Database;

pub struct TestHarness {
    temp_dir: TempDir,
    pub db_path: PathBuf,
    pub db: Database,
}

impl TestHarness {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("data").join("reportify.db");
        let db = Database::open(&db_path).expect("Failed to open test database");
        Self {
            temp_dir,
            db_path,
            db,
        }
    }

    /// Opens a second handle on the same file, as a restarted server would.
    pub fn reopen(&self) -> Database {
        Database::open(&self.db_path).expect("Failed to reopen test database")
    }

    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        std::fs::write(&path, content).expect("Failed to write test file");
        path
    }
}
