//! esas-storage
//!
//! Object storage for screening records. An [`objects::ObjectStore`] seam
//! with an S3 implementation (thin wrapper around the AWS SDK) and an
//! in-memory one for local runs and tests, plus typed record access.

pub mod backend;
pub mod deadline;
pub mod error;
pub mod memory;
pub mod objects;
pub mod records;
pub mod s3;
pub mod state;
