//! esas-export
//!
//! Screening reports: the denormalized view shown on screen, its text
//! rendering, and DOCX export for printing.

pub mod docx;
pub mod error;
pub mod render;
pub mod report;
pub mod styles;

pub use report::{ReportField, ReportView, assemble, assemble_unlinked};
