//! Reusable validators for oopish model types.
//!
//! A validator type declares a bundle of validations once and attaches it to
//! any number of model types:
//!
//! ```
//! use oopish_model::{AttributeRules, Errors, ModelType, Record, Rule, Validatable};
//! use oopish_types::TypeName;
//! use oopish_validator::{Check, Condition, Conditions, Declaration, Validator, ValidatorRegistry};
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct BookValidator;
//!
//! impl Validator for BookValidator {
//!     const NAME: &'static str = "BookValidator";
//! }
//!
//! impl BookValidator {
//!     fn title_must_include_author(&self, book: &dyn Validatable, errors: &mut Errors) {
//!         let title = book.read_attribute("title").and_then(|v| v.as_str()).unwrap_or("");
//!         let author = book.read_attribute("author").and_then(|v| v.as_str()).unwrap_or("");
//!         if !title.contains(author) {
//!             errors.add("author", "cannot write a biography for other people");
//!         }
//!     }
//!
//!     fn biography(&self, book: &dyn Validatable) -> bool {
//!         book.read_attribute("category").and_then(|v| v.as_str()) == Some("biography")
//!     }
//! }
//!
//! let mut registry = ValidatorRegistry::new();
//! registry
//!     .declare(
//!         Declaration::<BookValidator>::new()
//!             .validates(AttributeRules::new(["author"], [Rule::Presence]))
//!             .validate(
//!                 Check::new("title_must_include_author", BookValidator::title_must_include_author),
//!                 Conditions::new().if_(Condition::new("biography", BookValidator::biography)),
//!             ),
//!     )
//!     .unwrap();
//!
//! let mut book = ModelType::new(TypeName::new("Book").unwrap());
//! registry.monitor::<BookValidator>(&mut book).unwrap();
//! let book = Arc::new(book);
//! assert!(registry.is_monitoring::<BookValidator>(&*book));
//!
//! let mut record = Record::new(book);
//! record.set("title", "Qiitan biography");
//! record.set("author", "Yaotti");
//! record.set("category", "biography");
//! assert!(!record.valid());
//! ```

mod declaration;
mod registry;
mod validator;

pub use declaration::Declaration;
pub use registry::{MonitorTarget, ValidatorRegistry};
pub use validator::{injection_name, Check, CheckFn, Condition, ConditionFn, Conditions, Validator};

use oopish_model::ModelError;
use oopish_types::TypeName;

/// Result type for validator registry operations.
pub type ValidatorResult<T> = Result<T, ValidatorError>;

/// Errors raised by [`ValidatorRegistry`].
#[derive(Debug, thiserror::Error)]
pub enum ValidatorError {
    /// The model type is already monitored by this validator.
    #[error("{model} is already monitored by {validator}")]
    AlreadyMonitored { validator: String, model: TypeName },

    /// The validator was attached before anything was declared.
    #[error("{validator} has no declaration")]
    DeclarationNotFound { validator: String },

    /// The validator was declared a second time.
    #[error("{validator} is already declared")]
    AlreadyDeclared { validator: String },

    /// Two validator types map to the same injection name.
    #[error("injection name {name} of {validator} is already used by {existing}")]
    InjectionNameConflict {
        name: String,
        existing: String,
        validator: String,
    },

    /// Replaying the declaration onto the model type failed.
    #[error("failed to apply declaration: {0}")]
    Model(#[from] ModelError),
}
