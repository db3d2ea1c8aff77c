//! Core type definitions for oopish.
//!
//! This crate defines the small set of types shared by the validator and
//! inheritance crates:
//! - Type identifiers for model and validator types
//! - The raw attribute map a persisted record is made of
//! - Blankness checks over attribute values
//!
//! Nothing in here knows about validation rules or discrimination; those
//! live in their own crates.

mod blank;
mod name;

pub use blank::{is_blank, is_present};
pub use name::TypeName;

/// A raw record: column name to value.
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid type name: {0:?}")]
    InvalidTypeName(String),
}
