//! esas-linker
//!
//! Moves screenings submitted anonymously under a guest token to the account
//! the guest later registers, creating the account's patient if needed.

pub mod error;
pub mod link;

pub use error::LinkError;
pub use link::{GuestLinkRequest, LinkOutcome, link, patient_for_account};
