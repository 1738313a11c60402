#![forbid(unsafe_code)]
//! Document persistence for the loan platform: serde-serialized records in
//! SQLite, one table per collection, `json_extract` for filtered reads.

mod documents;
mod error;

pub use documents::{Collection, DocumentStore};
pub use error::{StoreError, StoreErrorCode};

pub const CRATE_NAME: &str = "lendhub-store";
