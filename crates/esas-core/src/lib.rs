//! esas-core
//!
//! Persisted domain records, the screening ownership state machine, and
//! object key conventions. No storage SDK dependency: this is the shared
//! vocabulary of the screening service.

pub mod error;
pub mod keys;
pub mod models;
