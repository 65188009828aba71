//! Storage Tier (300s)
//!
//! The array query is required: without it there is no disk data worth
//! publishing. Shares are fetched in their own boundary because a defect in
//! a single share record server-side must not take down reporting for every
//! disk in the array; parity history likewise.

use super::{fetch_optional, fetch_required, PollError};
use crate::unraid::types::*;
use crate::unraid::UnraidApi;
use serde::Serialize;

/// One successful storage-tier cycle. Immutable once published.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageSnapshot {
    pub array: ArrayStatus,
    pub shares: Vec<Share>,
    /// Most recent record first, matching the server's ordering.
    pub parity_history: Vec<ParityCheck>,
}

impl StorageSnapshot {
    /// The parity-check record entities project from.
    pub fn latest_parity_check(&self) -> Option<&ParityCheck> {
        self.parity_history.first()
    }

    /// Find any array member (data, parity, or cache) by id.
    pub fn disk_by_id(&self, id: &str) -> Option<&ArrayDisk> {
        self.array
            .disks
            .iter()
            .chain(&self.array.parities)
            .chain(&self.array.caches)
            .find(|d| d.id == id)
    }
}

pub async fn poll<C: UnraidApi>(client: &C) -> Result<StorageSnapshot, PollError> {
    let array = fetch_required("array status", client.array_status()).await?;

    let shares = fetch_optional("shares", client.shares(), Vec::new()).await?;
    let parity_history =
        fetch_optional("parity history", client.parity_history(), Vec::new()).await?;

    Ok(StorageSnapshot {
        array,
        shares,
        parity_history,
    })
}
