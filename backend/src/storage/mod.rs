//! # Storage Module
//!
//! Persistence for the member table. The domain layer only sees the
//! [`MemberStorage`] trait; which backend sits behind it is decided at
//! startup from configuration.
//!
//! - **csv**: the member sheet as a CSV file with a fixed 15-column header
//! - **memory**: process-local table for tests and demo runs

pub mod csv;
pub mod memory;
pub mod traits;

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::config::{StorageBackend, StorageConfig};

pub use self::csv::{CsvConnection, CsvMemberRepository};
pub use memory::InMemoryMemberRepository;
pub use traits::MemberStorage;

/// Open the configured member store
pub fn open_member_storage(config: &StorageConfig) -> Result<Arc<dyn MemberStorage>> {
    match config.backend {
        StorageBackend::Csv => {
            let connection = CsvConnection::new(&config.data_directory, &config.sheet_name)?;
            connection.ensure_members_file_exists()?;
            info!(
                "Using CSV member sheet '{}' in {}",
                connection.sheet_name(),
                connection.base_directory().display()
            );
            Ok(Arc::new(CsvMemberRepository::new(connection)))
        }
        StorageBackend::Memory => {
            info!("Using in-memory member store; data is lost on shutdown");
            Ok(Arc::new(InMemoryMemberRepository::new()))
        }
    }
}
