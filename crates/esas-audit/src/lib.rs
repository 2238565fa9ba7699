//! esas-audit
//!
//! Application-level audit events for actions on patient data.

pub mod events;

pub use events::{Actor, AuditAction, AuditEvent};
