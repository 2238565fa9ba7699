//! esas-recommendations
//!
//! Care recommendations keyed by (primary symptom, risk level). The table is
//! a versioned JSON document, loaded once and checked for completeness before
//! the service accepts requests.

pub mod error;
pub mod table;

pub use error::RecommendationError;
pub use table::{Recommendation, RecommendationTable};
