//! Test utilities for CSV storage tests.
//!
//! `TestEnvironment` owns a temporary directory that is removed when the
//! environment is dropped, even if the test panics.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::connection::CsvConnection;
use super::member_repository::CsvMemberRepository;

pub struct TestEnvironment {
    /// Kept alive so the directory survives until drop
    _temp_dir: TempDir,
    pub connection: CsvConnection,
    pub base_path: PathBuf,
}

impl TestEnvironment {
    pub async fn new() -> Result<Self> {
        Self::new_with_prefix("gym_admin_test").await
    }

    /// Create an environment whose directory name starts with `prefix`
    pub async fn new_with_prefix(prefix: &str) -> Result<Self> {
        let temp_dir = TempDir::with_prefix(prefix)?;
        let base_path = temp_dir.path().to_path_buf();
        let connection = CsvConnection::new(&base_path, "Members")?;

        Ok(TestEnvironment {
            _temp_dir: temp_dir,
            connection,
            base_path,
        })
    }

    pub fn member_repository(&self) -> CsvMemberRepository {
        CsvMemberRepository::new(self.connection.clone())
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_path
    }
}
