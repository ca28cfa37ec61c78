//! The session cache: session ID → long-lived [`SessionRecord`].
//!
//! Lookups for the same ID return the same `Arc`, so accumulated state
//! written through one handle is visible to every other holder. The map is
//! deliberately unbounded — no eviction, no TTL, no size cap; records live
//! until explicitly invalidated or the process exits.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use uuid::Uuid;

use crate::record::SessionRecord;

/// In-memory map of session records, safe for concurrent read/insert.
#[derive(Debug, Default)]
pub struct SessionCache {
    records: RwLock<HashMap<Uuid, Arc<SessionRecord>>>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the record for `session_id`, creating an empty one on first
    /// sight. Idempotent per ID: repeated calls yield the identical `Arc`.
    pub fn get_or_create(&self, session_id: Uuid) -> Arc<SessionRecord> {
        // Fast path: record already exists.
        {
            let records = self.records.read();
            if let Some(record) = records.get(&session_id) {
                return Arc::clone(record);
            }
        }

        // Slow path: materialize a new record. Re-check under the write
        // lock so two racing creators converge on one instance.
        let mut records = self.records.write();
        let record = records
            .entry(session_id)
            .or_insert_with(|| Arc::new(SessionRecord::new(session_id)));
        tracing::debug!(%session_id, "session record materialized");
        Arc::clone(record)
    }

    /// Drop the cached record if present; returns whether removal occurred.
    /// The next `get_or_create` for this ID starts from empty state.
    pub fn invalidate(&self, session_id: Uuid) -> bool {
        self.records.write().remove(&session_id).is_some()
    }

    /// Empty the cache. Used for process-wide reset.
    pub fn clear_all(&self) {
        self.records.write().clear();
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}
