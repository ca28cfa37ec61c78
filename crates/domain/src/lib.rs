//! Shared domain types for Greenlight: the error type, the configuration
//! model, agent role descriptors, and pipeline trace types.
//!
//! This crate has no I/O — everything here is plain data consumed by the
//! provider, session, persistence, and gateway crates.

pub mod agent;
pub mod config;
pub mod error;
pub mod trace;

pub use error::{Error, Result};
