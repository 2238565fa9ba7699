//! esas-education
//!
//! Patient education articles and a small fuzzy search over them. The
//! catalogue is a versioned JSON document read once at startup.

pub mod catalog;
pub mod error;
pub mod search;

pub use catalog::{Article, EducationCatalog};
pub use error::EducationError;
pub use search::SearchHit;
