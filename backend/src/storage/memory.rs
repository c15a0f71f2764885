use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::models::{MemberPatch, MemberRecord, PhoneKey};
use crate::storage::traits::MemberStorage;

/// Member table held in process memory. Used for tests and demo runs.
#[derive(Clone, Default)]
pub struct InMemoryMemberRepository {
    rows: Arc<RwLock<Vec<MemberRecord>>>,
}

impl InMemoryMemberRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with existing rows
    pub fn with_records(records: Vec<MemberRecord>) -> Self {
        Self {
            rows: Arc::new(RwLock::new(records)),
        }
    }
}

#[async_trait]
impl MemberStorage for InMemoryMemberRepository {
    async fn find_by_phone(&self, phone: &PhoneKey) -> Result<Option<MemberRecord>> {
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|r| phone.matches(&r.phone)).cloned())
    }

    async fn append(&self, phone: &PhoneKey, record: &MemberRecord) -> Result<bool> {
        let mut rows = self.rows.write().await;
        if rows.iter().any(|r| phone.matches(&r.phone)) {
            return Ok(false);
        }
        rows.push(record.clone());
        debug!("Appended member row {} (now {} rows)", record.phone, rows.len());
        Ok(true)
    }

    async fn update(&self, phone: &PhoneKey, patch: &MemberPatch) -> Result<Option<MemberRecord>> {
        let mut rows = self.rows.write().await;
        Ok(rows
            .iter_mut()
            .find(|r| phone.matches(&r.phone))
            .map(|record| {
                if !patch.is_empty() {
                    patch.apply(record);
                }
                record.clone()
            }))
    }

    async fn scan_all(&self) -> Result<Vec<MemberRecord>> {
        Ok(self.rows.read().await.clone())
    }
}
