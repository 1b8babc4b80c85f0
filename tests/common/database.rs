//! Local database fixtures
//!
//! Provides in-memory databases for isolated tests and file-backed ones
//! for durability tests that reopen the same file.

use geoledger::client::LocalDatabase;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

/// Create a private in-memory local database
pub async fn create_test_db() -> Arc<LocalDatabase> {
    Arc::new(
        LocalDatabase::in_memory()
            .await
            .expect("Failed to create in-memory database"),
    )
}

/// File-backed database fixture
///
/// The directory is removed when the fixture is dropped.
pub struct TestDatabaseFile {
    dir: TempDir,
}

impl TestDatabaseFile {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self) -> PathBuf {
        LocalDatabase::path_in(Some(self.dir.path()))
    }

    /// Open (or reopen) the database file
    pub async fn open(&self) -> Arc<LocalDatabase> {
        Arc::new(
            LocalDatabase::open(self.path())
                .await
                .expect("Failed to open database file"),
        )
    }
}
