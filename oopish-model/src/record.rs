use crate::{Errors, ModelType, Validatable, ValidatorCache};
use oopish_types::Attributes;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A generic model instance: a model type plus an attribute map.
///
/// Associated records are kept by name for `validates_associated`.
#[derive(Debug, Clone)]
pub struct Record {
    model_type: Arc<ModelType>,
    attributes: Attributes,
    associations: BTreeMap<String, Vec<Record>>,
    validators: ValidatorCache,
}

impl Record {
    /// Creates a record with no attributes set.
    pub fn new(model_type: Arc<ModelType>) -> Self {
        Self::with_attributes(model_type, Attributes::new())
    }

    pub fn with_attributes(model_type: Arc<ModelType>, attributes: Attributes) -> Self {
        Self {
            model_type,
            attributes,
            associations: BTreeMap::new(),
            validators: ValidatorCache::new(),
        }
    }

    /// Sets an attribute, returning the previous value.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.attributes.insert(field.into(), value.into())
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.attributes.get(field)
    }

    /// Extract a string attribute.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(|v| v.as_str())
    }

    /// Extract a numeric attribute.
    pub fn get_number(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(|v| v.as_f64())
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Appends `record` to the association `name`.
    pub fn associate(&mut self, name: impl Into<String>, record: Record) {
        self.associations.entry(name.into()).or_default().push(record);
    }

    pub fn shared_model_type(&self) -> &Arc<ModelType> {
        &self.model_type
    }

    /// Runs all validations and returns the failures.
    pub fn errors(&self) -> Errors {
        self.model_type.run_validations(self)
    }

    pub fn valid(&self) -> bool {
        self.errors().is_empty()
    }
}

impl Validatable for Record {
    fn model_type(&self) -> &ModelType {
        &self.model_type
    }

    fn read_attribute(&self, field: &str) -> Option<&Value> {
        self.attributes.get(field)
    }

    fn validators(&self) -> &ValidatorCache {
        &self.validators
    }

    fn associated(&self, field: &str) -> Vec<&dyn Validatable> {
        self.associations
            .get(field)
            .map(|records| records.iter().map(|r| r as &dyn Validatable).collect())
            .unwrap_or_default()
    }
}
