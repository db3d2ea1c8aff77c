use crate::{Errors, ModelType};
use serde_json::Value;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// What a model instance exposes to its model type's validations.
///
/// Implementors hold a [`ValidatorCache`] so that every attached validator
/// type gets exactly one instance per model instance.
pub trait Validatable: Send + Sync {
    /// The model type whose registrations apply to this instance.
    fn model_type(&self) -> &ModelType;

    /// Reads an attribute. `None` is treated as `null` by attribute rules.
    fn read_attribute(&self, field: &str) -> Option<&Value>;

    /// Per-instance cache of attached validator instances.
    fn validators(&self) -> &ValidatorCache;

    /// Associated instances checked by `validates_associated`.
    fn associated(&self, _field: &str) -> Vec<&dyn Validatable> {
        Vec::new()
    }
}

impl dyn Validatable + '_ {
    /// Runs every validation registered on this instance's model type.
    pub fn run_validations(&self) -> Errors {
        self.model_type().run_validations(self)
    }

    pub fn valid(&self) -> bool {
        self.run_validations().is_empty()
    }
}

/// Lazily-populated validator instances, keyed by accessor name.
///
/// A clone starts empty: copied records build their own validators.
#[derive(Default)]
pub struct ValidatorCache {
    slots: Mutex<HashMap<String, Arc<dyn Any + Send + Sync>>>,
}

impl ValidatorCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the instance cached under `name`, building it with `init` on
    /// first use.
    pub fn fetch(
        &self,
        name: &str,
        init: impl FnOnce() -> Arc<dyn Any + Send + Sync>,
    ) -> Arc<dyn Any + Send + Sync> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(name.to_string()).or_insert_with(init))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Clone for ValidatorCache {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl fmt::Debug for ValidatorCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<&str> = slots.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ValidatorCache").field("slots", &names).finish()
    }
}
