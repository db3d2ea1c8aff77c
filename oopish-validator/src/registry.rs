//! Declarations and monitoring state for every validator type.
//!
//! The registry is built during startup: validators are declared, then
//! attached to model types. Once initialization is done it is only read, so
//! it can be shared behind an `Arc` without locking.

use crate::declaration::Declaration;
use crate::validator::Validator;
use crate::{ValidatorError, ValidatorResult};
use oopish_model::{Accessor, ModelType, Record, Validatable};
use oopish_types::TypeName;
use std::any::{Any, TypeId};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Something whose model type can be monitored: a model type, its name, or
/// an instance of it. Instances normalize to their model type.
#[derive(Clone, Copy)]
pub enum MonitorTarget<'a> {
    Type(&'a TypeName),
    Instance(&'a dyn Validatable),
}

impl<'a> MonitorTarget<'a> {
    pub fn type_name(&self) -> &'a TypeName {
        match self {
            MonitorTarget::Type(name) => name,
            MonitorTarget::Instance(instance) => instance.model_type().name(),
        }
    }
}

impl<'a> From<&'a TypeName> for MonitorTarget<'a> {
    fn from(name: &'a TypeName) -> Self {
        MonitorTarget::Type(name)
    }
}

impl<'a> From<&'a ModelType> for MonitorTarget<'a> {
    fn from(model_type: &'a ModelType) -> Self {
        MonitorTarget::Type(model_type.name())
    }
}

impl<'a> From<&'a dyn Validatable> for MonitorTarget<'a> {
    fn from(instance: &'a dyn Validatable) -> Self {
        MonitorTarget::Instance(instance)
    }
}

impl<'a> From<&'a Record> for MonitorTarget<'a> {
    fn from(record: &'a Record) -> Self {
        MonitorTarget::Instance(record)
    }
}

impl fmt::Debug for MonitorTarget<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitorTarget::Type(name) => f.debug_tuple("Type").field(name).finish(),
            MonitorTarget::Instance(instance) => f
                .debug_tuple("Instance")
                .field(instance.model_type().name())
                .finish(),
        }
    }
}

struct ValidatorEntry {
    name: &'static str,
    injection_name: String,
    declaration: Option<Box<dyn Any + Send + Sync>>,
    monitoring: BTreeSet<TypeName>,
}

/// Per-validator-type declarations and monitoring sets.
#[derive(Default)]
pub struct ValidatorRegistry {
    validators: HashMap<TypeId, ValidatorEntry>,
}

impl ValidatorRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entry_mut<V: Validator>(&mut self) -> ValidatorResult<&mut ValidatorEntry> {
        let injection_name = V::injection_name();
        if let Some(other) = self
            .validators
            .iter()
            .find(|(id, e)| **id != TypeId::of::<V>() && e.injection_name == injection_name)
            .map(|(_, e)| e)
        {
            return Err(ValidatorError::InjectionNameConflict {
                name: injection_name,
                existing: other.name.to_string(),
                validator: V::NAME.to_string(),
            });
        }

        Ok(self
            .validators
            .entry(TypeId::of::<V>())
            .or_insert_with(|| ValidatorEntry {
                name: V::NAME,
                injection_name,
                declaration: None,
                monitoring: BTreeSet::new(),
            }))
    }

    fn entry<V: Validator>(&self) -> Option<&ValidatorEntry> {
        self.validators.get(&TypeId::of::<V>())
    }

    /// Stores the declaration for `V`. A validator is declared once.
    ///
    /// Rules are compiled here, so an invalid pattern fails the declaration
    /// instead of every later `attach`.
    pub fn declare<V: Validator>(&mut self, declaration: Declaration<V>) -> ValidatorResult<()> {
        declaration.compile_rules()?;
        let directives = declaration.len();
        let entry = self.entry_mut::<V>()?;
        if entry.declaration.is_some() {
            return Err(ValidatorError::AlreadyDeclared {
                validator: V::NAME.to_string(),
            });
        }
        entry.declaration = Some(Box::new(declaration));
        info!(validator = V::NAME, directives, "Validator declared");
        Ok(())
    }

    /// Attaches `V`'s declaration to `model_type`.
    ///
    /// Fails with `AlreadyMonitored` if `V` already monitors the model type,
    /// and with `DeclarationNotFound` if `V` was never declared. The accessor
    /// is defined before the declaration is looked up; it is harmless on its
    /// own and is reused if attaching is retried.
    pub fn attach<V: Validator>(&mut self, model_type: &mut ModelType) -> ValidatorResult<()> {
        let entry = self.entry_mut::<V>()?;
        if entry.monitoring.contains(model_type.name()) {
            return Err(ValidatorError::AlreadyMonitored {
                validator: V::NAME.to_string(),
                model: model_type.name().clone(),
            });
        }

        let accessor: Accessor = Arc::new(|| Arc::new(V::default()) as Arc<dyn Any + Send + Sync>);
        model_type.define_accessor(&entry.injection_name, accessor);

        let declaration = entry
            .declaration
            .as_ref()
            .and_then(|d| d.downcast_ref::<Declaration<V>>())
            .ok_or_else(|| ValidatorError::DeclarationNotFound {
                validator: V::NAME.to_string(),
            })?;
        declaration.apply(model_type)?;

        entry.monitoring.insert(model_type.name().clone());
        info!(validator = V::NAME, model = %model_type.name(), "Validator attached");
        Ok(())
    }

    /// Alias for [`ValidatorRegistry::attach`].
    pub fn monitor<V: Validator>(&mut self, model_type: &mut ModelType) -> ValidatorResult<()> {
        self.attach::<V>(model_type)
    }

    /// Whether `V` is attached to the target's model type.
    pub fn is_monitoring<'a, V: Validator>(&self, target: impl Into<MonitorTarget<'a>>) -> bool {
        let target = target.into();
        self.entry::<V>()
            .is_some_and(|e| e.monitoring.contains(target.type_name()))
    }

    /// Model types `V` is attached to, sorted by name.
    pub fn monitored<V: Validator>(&self) -> Vec<&TypeName> {
        self.entry::<V>()
            .map(|e| e.monitoring.iter().collect())
            .unwrap_or_default()
    }

    pub fn is_declared<V: Validator>(&self) -> bool {
        self.entry::<V>().is_some_and(|e| e.declaration.is_some())
    }

    pub fn injection_name<V: Validator>(&self) -> String {
        V::injection_name()
    }
}

impl fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.validators.values().map(|e| e.name).collect();
        names.sort_unstable();
        f.debug_struct("ValidatorRegistry")
            .field("validators", &names)
            .finish()
    }
}
