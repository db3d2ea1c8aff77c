//! Rule-based subtype selection for persisted records.
//!
//! A base type owns an ordered list of instantiation rules. When a raw record
//! is loaded, the first rule whose condition matches the record's columns
//! names the type to instantiate; if none matches, the base type is used.
//!
//! ```
//! use oopish_inheritance::{Discriminator, TypeCatalog};
//! use oopish_types::TypeName;
//! use serde_json::json;
//!
//! let book = TypeName::new("Book").unwrap();
//! let novel = TypeName::new("Novel").unwrap();
//!
//! let mut discriminator = Discriminator::new(book.clone());
//! discriminator
//!     .instantiate_as(novel.clone(), [("category", json!("novel"))])
//!     .unwrap();
//!
//! let mut catalog = TypeCatalog::new();
//! catalog.register(book, "book handle");
//! catalog.register(novel, "novel handle");
//!
//! let record = json!({"category": "novel"}).as_object().cloned().unwrap();
//! assert_eq!(*discriminator.discriminate(&record, &catalog).unwrap(), "novel handle");
//! ```

mod catalog;
mod discriminator;
mod rule;

pub use catalog::TypeCatalog;
pub use discriminator::Discriminator;
pub use rule::InstantiationRule;

use oopish_types::TypeName;

/// Result type for inheritance operations.
pub type InheritanceResult<T> = Result<T, InheritanceError>;

/// Errors raised while registering or resolving instantiation rules.
#[derive(Debug, thiserror::Error)]
pub enum InheritanceError {
    /// A rule named a type that the catalog does not know.
    #[error("class not found: {0}")]
    ClassNotFound(TypeName),

    /// A rule repeats the condition of an earlier rule, so it could never match.
    #[error("rule for {target} on {base} repeats the condition of the rule for {existing}")]
    DuplicateCondition {
        base: TypeName,
        target: TypeName,
        existing: TypeName,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
