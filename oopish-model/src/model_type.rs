//! Model type descriptors and their validation registrations.
//!
//! A [`ModelType`] is built mutably during startup (registrations, accessor
//! and proxy definitions) and shared immutably afterwards, usually behind an
//! `Arc` held by every [`crate::Record`] of that type.

use crate::rule::{AttributeRules, CompiledRule, RuleOptions};
use crate::{Errors, ModelError, ModelResult, Validatable};
use oopish_types::TypeName;
use serde_json::Value;
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Builds the validator instance behind an accessor.
pub type Accessor = Arc<dyn Fn() -> Arc<dyn Any + Send + Sync> + Send + Sync>;

/// Whole-record validator registered with [`ModelType::validates_with`].
pub trait RecordValidator: Send + Sync {
    /// Adds failures for `record` to `errors`.
    fn validate(&self, record: &dyn Validatable, errors: &mut Errors);
}

impl<F> RecordValidator for F
where
    F: Fn(&dyn Validatable, &mut Errors) + Send + Sync,
{
    fn validate(&self, record: &dyn Validatable, errors: &mut Errors) {
        self(record, errors)
    }
}

/// What a proxy sees when invoked: the model type it is defined on and the
/// instance under validation.
pub struct ProxyContext<'a> {
    model_type: &'a ModelType,
    instance: &'a dyn Validatable,
}

impl<'a> ProxyContext<'a> {
    pub fn model_type(&self) -> &'a ModelType {
        self.model_type
    }

    pub fn instance(&self) -> &'a dyn Validatable {
        self.instance
    }

    /// Invokes the accessor `name`, returning the instance's cached validator.
    /// `None` if the model type defines no such accessor.
    pub fn accessor(&self, name: &str) -> Option<Arc<dyn Any + Send + Sync>> {
        let build = self.model_type.accessors.get(name)?;
        Some(self.instance.validators().fetch(name, || build()))
    }
}

/// A named forwarding function defined on a model type.
#[derive(Clone)]
pub enum Proxy {
    /// Runs a check, adding failures to the error collection.
    Check(Arc<dyn Fn(&ProxyContext<'_>, &mut Errors) + Send + Sync>),
    /// Answers an `if`/`unless` condition.
    Condition(Arc<dyn Fn(&ProxyContext<'_>) -> bool + Send + Sync>),
}

impl Proxy {
    pub fn check(f: impl Fn(&ProxyContext<'_>, &mut Errors) + Send + Sync + 'static) -> Self {
        Proxy::Check(Arc::new(f))
    }

    pub fn condition(f: impl Fn(&ProxyContext<'_>) -> bool + Send + Sync + 'static) -> Self {
        Proxy::Condition(Arc::new(f))
    }

    fn kind(&self) -> &'static str {
        match self {
            Proxy::Check(_) => "check",
            Proxy::Condition(_) => "condition",
        }
    }
}

impl fmt::Debug for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Proxy::{}", self.kind())
    }
}

/// Conditions on a `validate` registration, by proxy name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidateOptions {
    /// Run only when this condition holds.
    pub if_: Option<String>,
    /// Skip when this condition holds.
    pub unless: Option<String>,
}

impl ValidateOptions {
    pub fn if_(mut self, proxy: impl Into<String>) -> Self {
        self.if_ = Some(proxy.into());
        self
    }

    pub fn unless(mut self, proxy: impl Into<String>) -> Self {
        self.unless = Some(proxy.into());
        self
    }
}

enum Registration {
    Attribute {
        field: String,
        rule: CompiledRule,
        options: RuleOptions,
    },
    Record(Arc<dyn RecordValidator>),
    Associated {
        field: String,
        options: RuleOptions,
    },
    Method {
        check: String,
        if_: Option<String>,
        unless: Option<String>,
    },
}

/// A model type: its name plus everything registered to validate its instances.
pub struct ModelType {
    name: TypeName,
    registrations: Vec<Registration>,
    accessors: BTreeMap<String, Accessor>,
    proxies: BTreeMap<String, Proxy>,
}

impl ModelType {
    #[must_use]
    pub fn new(name: TypeName) -> Self {
        Self {
            name,
            registrations: Vec::new(),
            accessors: BTreeMap::new(),
            proxies: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &TypeName {
        &self.name
    }

    /// Registers every rule for every field. Rules are compiled up front, so
    /// an invalid pattern leaves the model type unchanged.
    pub fn validates(&mut self, rules: AttributeRules) -> ModelResult<()> {
        let compiled = rules
            .rules
            .into_iter()
            .map(|rule| rule.compile())
            .collect::<ModelResult<Vec<_>>>()?;

        for rule in compiled {
            for field in &rules.fields {
                self.registrations.push(Registration::Attribute {
                    field: field.clone(),
                    rule: rule.clone(),
                    options: rules.options.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn validates_with(&mut self, validator: impl RecordValidator + 'static) {
        self.validates_with_shared(Arc::new(validator));
    }

    pub fn validates_with_shared(&mut self, validator: Arc<dyn RecordValidator>) {
        self.registrations.push(Registration::Record(validator));
    }

    /// Each named association must itself be valid.
    pub fn validates_associated<F, S>(&mut self, fields: F, options: RuleOptions)
    where
        F: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for field in fields {
            self.registrations.push(Registration::Associated {
                field: field.into(),
                options: options.clone(),
            });
        }
    }

    /// Starts a group whose registrations share `options`.
    pub fn with_options(&mut self, options: RuleOptions) -> WithOptions<'_> {
        WithOptions {
            model_type: self,
            options,
        }
    }

    /// Registers a check proxy, guarded by optional condition proxies. All
    /// named proxies must already be defined with the matching kind.
    pub fn validate(&mut self, check: &str, options: ValidateOptions) -> ModelResult<()> {
        self.expect_proxy(check, "check")?;
        if let Some(name) = &options.if_ {
            self.expect_proxy(name, "condition")?;
        }
        if let Some(name) = &options.unless {
            self.expect_proxy(name, "condition")?;
        }
        self.registrations.push(Registration::Method {
            check: check.to_string(),
            if_: options.if_,
            unless: options.unless,
        });
        Ok(())
    }

    fn expect_proxy(&self, name: &str, expected: &'static str) -> ModelResult<()> {
        match self.proxies.get(name) {
            None => Err(ModelError::ProxyNotFound {
                model: self.name.to_string(),
                proxy: name.to_string(),
            }),
            Some(proxy) if proxy.kind() != expected => Err(ModelError::ProxyMismatch {
                model: self.name.to_string(),
                proxy: name.to_string(),
                expected,
            }),
            Some(_) => Ok(()),
        }
    }

    /// Defines an accessor unless one already exists under `name`.
    /// Returns whether a new accessor was defined.
    pub fn define_accessor(&mut self, name: &str, accessor: Accessor) -> bool {
        if self.accessors.contains_key(name) {
            return false;
        }
        debug!(model = %self.name, accessor = name, "Defined validator accessor");
        self.accessors.insert(name.to_string(), accessor);
        true
    }

    /// Defines a proxy unless one already exists under `name`.
    /// Returns whether a new proxy was defined.
    pub fn define_proxy(&mut self, name: &str, proxy: Proxy) -> bool {
        if self.proxies.contains_key(name) {
            return false;
        }
        debug!(model = %self.name, proxy = name, kind = proxy.kind(), "Defined proxy");
        self.proxies.insert(name.to_string(), proxy);
        true
    }

    pub fn has_accessor(&self, name: &str) -> bool {
        self.accessors.contains_key(name)
    }

    pub fn has_proxy(&self, name: &str) -> bool {
        self.proxies.contains_key(name)
    }

    /// Proxy names in sorted order.
    pub fn proxy_names(&self) -> Vec<&str> {
        self.proxies.keys().map(String::as_str).collect()
    }

    /// Number of registered validations.
    pub fn validation_count(&self) -> usize {
        self.registrations.len()
    }

    /// Runs every registration against `instance`, in registration order.
    pub fn run_validations(&self, instance: &dyn Validatable) -> Errors {
        let ctx = ProxyContext {
            model_type: self,
            instance,
        };
        let mut errors = Errors::new();

        for registration in &self.registrations {
            match registration {
                Registration::Attribute {
                    field,
                    rule,
                    options,
                } => {
                    let value = instance.read_attribute(field).unwrap_or(&Value::Null);
                    if options.skips(value) {
                        continue;
                    }
                    for message in rule.evaluate(value) {
                        errors.add(field.as_str(), options.message.clone().unwrap_or(message));
                    }
                }
                Registration::Record(validator) => validator.validate(instance, &mut errors),
                Registration::Associated { field, options } => {
                    let invalid = instance.associated(field).into_iter().any(|a| !a.valid());
                    if invalid {
                        let message = options.message.as_deref().unwrap_or("is invalid");
                        errors.add(field.as_str(), message);
                    }
                }
                Registration::Method { check, if_, unless } => {
                    if let Some(name) = if_ {
                        if !self.call_condition(&ctx, name) {
                            continue;
                        }
                    }
                    if let Some(name) = unless {
                        if self.call_condition(&ctx, name) {
                            continue;
                        }
                    }
                    if let Some(Proxy::Check(f)) = self.proxies.get(check) {
                        f(&ctx, &mut errors);
                    }
                }
            }
        }
        errors
    }

    fn call_condition(&self, ctx: &ProxyContext<'_>, name: &str) -> bool {
        match self.proxies.get(name) {
            Some(Proxy::Condition(f)) => f(ctx),
            _ => {
                warn!(model = %self.name, proxy = name, "Condition proxy missing, treating as false");
                false
            }
        }
    }
}

impl fmt::Debug for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelType")
            .field("name", &self.name)
            .field("validations", &self.registrations.len())
            .field("accessors", &self.accessors.keys().collect::<Vec<_>>())
            .field("proxies", &self.proxies.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Registrations sharing a set of options; see [`ModelType::with_options`].
pub struct WithOptions<'a> {
    model_type: &'a mut ModelType,
    options: RuleOptions,
}

impl WithOptions<'_> {
    /// Like [`ModelType::validates`], with the group options underneath the
    /// call's own options.
    pub fn validates(&mut self, mut rules: AttributeRules) -> ModelResult<()> {
        rules.options = self.options.merge(&rules.options);
        self.model_type.validates(rules)
    }

    pub fn validates_associated<F, S>(&mut self, fields: F, options: RuleOptions)
    where
        F: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let merged = self.options.merge(&options);
        self.model_type.validates_associated(fields, merged);
    }

    pub fn options(&self) -> &RuleOptions {
        &self.options
    }
}
