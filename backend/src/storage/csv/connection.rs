use anyhow::{Context, Result};
use csv::Writer;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Column headers of the member table, in storage order
pub const MEMBER_COLUMNS: [&str; 15] = [
    "Timestamp",
    "Name",
    "Phone Number",
    "Membership Type",
    "Duration",
    "Start Date",
    "End Date",
    "Status",
    "Membership Fees",
    "Payment Type",
    "Next Payment",
    "Payment Due Date",
    "Last Payment Date",
    "Special Notes",
    "Total Paid",
];

/// CsvConnection manages the location of the member sheet and serializes
/// whole-file rewrites.
#[derive(Clone)]
pub struct CsvConnection {
    base_directory: PathBuf,
    sheet_name: String,
    file_lock: Arc<Mutex<()>>,
}

impl CsvConnection {
    /// Create a new CSV connection, creating the base directory if needed
    pub fn new<P: AsRef<Path>>(base_directory: P, sheet_name: &str) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path).with_context(|| {
                format!("Failed to create data directory {}", base_path.display())
            })?;
        }

        Ok(Self {
            base_directory: base_path,
            sheet_name: sheet_name.to_string(),
            file_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    /// Path of the member sheet: `<base>/<sheet_name>.csv`
    pub fn members_file_path(&self) -> PathBuf {
        self.base_directory.join(format!("{}.csv", self.sheet_name))
    }

    /// Guard held for the duration of a read-modify-write cycle
    pub fn file_lock(&self) -> &Mutex<()> {
        &self.file_lock
    }

    /// Create the sheet with its header row if it does not exist yet
    pub fn ensure_members_file_exists(&self) -> Result<()> {
        let file_path = self.members_file_path();
        if file_path.exists() {
            return Ok(());
        }

        let mut writer = Writer::from_path(&file_path)
            .with_context(|| format!("Failed to create {}", file_path.display()))?;
        writer.write_record(MEMBER_COLUMNS)?;
        writer.flush()?;

        info!("📄 Created member sheet '{}' at {}", self.sheet_name, file_path.display());
        Ok(())
    }
}
