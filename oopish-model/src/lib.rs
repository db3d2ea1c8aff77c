//! Host validation surface for oopish.
//!
//! Defines the types every validator attaches to:
//! - [`ModelType`]: a named model type owning its ordered validation registrations
//! - [`Validatable`]: what a model instance exposes to validations
//! - [`Record`]: the generic attribute-bearing model instance
//! - [`Rule`] / [`RuleOptions`]: the built-in attribute rules
//! - [`Errors`]: the ordered error collection a validation pass produces
//! - [`RecordValidator`]: trait for whole-record validators (`validates_with`)
//!
//! Validator types in `oopish-validator` never mutate records; they register
//! validations and named proxies on a [`ModelType`] and are invoked from
//! [`ModelType::run_validations`].

mod errors;
mod model_type;
mod record;
mod rule;
mod validatable;

pub use errors::{ErrorEntry, Errors, BASE};
pub use model_type::{
    Accessor, ModelType, Proxy, ProxyContext, RecordValidator, ValidateOptions, WithOptions,
};
pub use record::Record;
pub use rule::{AttributeRules, CompiledRule, Format, Length, Numericality, Rule, RuleOptions};
pub use validatable::{Validatable, ValidatorCache};

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while registering validations on a model type.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// A format rule carried a pattern that does not compile.
    #[error("invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex_lite::Error,
    },

    /// A `validate` registration named a proxy the model type does not define.
    #[error("proxy {proxy} is not defined on {model}")]
    ProxyNotFound { model: String, proxy: String },

    /// A proxy exists under the name but is of the wrong kind.
    #[error("proxy {proxy} on {model} is not a {expected}")]
    ProxyMismatch {
        model: String,
        proxy: String,
        expected: &'static str,
    },
}
