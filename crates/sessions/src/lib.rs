//! In-memory session management for Greenlight.
//!
//! A session is one user-facing conversation. Pipeline runs against the same
//! session accumulate state in a shared [`SessionRecord`], so the cache hands
//! out the *same* record instance for repeated lookups of one session ID.
//! Durability is not this crate's job — the persistence crate snapshots state
//! to the relational store.

pub mod cache;
pub mod record;

pub use cache::SessionCache;
pub use record::{SessionRecord, StateValue};
