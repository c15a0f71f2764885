//! # Storage Traits
//!
//! The record-store contract the membership services are written against.
//! Implementations keep one row per phone number and are free to answer
//! every lookup with a full scan; a single gym has at most a few thousand rows.

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::models::{MemberPatch, MemberRecord, PhoneKey};

/// Flat, phone-keyed table of member records.
///
/// Rows are matched with [`PhoneKey::matches`] against the phone as stored.
/// Records are never deleted.
#[async_trait]
pub trait MemberStorage: Send + Sync {
    /// Find the first record whose phone matches the key
    async fn find_by_phone(&self, phone: &PhoneKey) -> Result<Option<MemberRecord>>;

    /// Append a new row unless a row already matches `phone`.
    /// The check and the write happen under one lock; returns whether the row was added.
    async fn append(&self, phone: &PhoneKey, record: &MemberRecord) -> Result<bool>;

    /// Apply a partial update to the matching row in a single write.
    /// Returns the updated record, or `None` when no row matches.
    async fn update(&self, phone: &PhoneKey, patch: &MemberPatch) -> Result<Option<MemberRecord>>;

    /// Every row in insertion order
    async fn scan_all(&self) -> Result<Vec<MemberRecord>>;
}
