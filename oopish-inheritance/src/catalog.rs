use crate::{InheritanceError, InheritanceResult};
use oopish_types::TypeName;
use std::collections::HashMap;

/// Name-to-type lookup used when a discriminator resolves a record.
///
/// `T` is whatever handle the caller instantiates from: a model type
/// descriptor, a constructor, or a plain tag.
#[derive(Debug, Clone)]
pub struct TypeCatalog<T> {
    types: HashMap<TypeName, T>,
}

impl<T> TypeCatalog<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            types: HashMap::new(),
        }
    }

    /// Registers `handle` under `name`, returning any handle it replaces.
    pub fn register(&mut self, name: TypeName, handle: T) -> Option<T> {
        self.types.insert(name, handle)
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Looks `name` up, failing with `ClassNotFound` if it is not registered.
    pub fn constantize(&self, name: &TypeName) -> InheritanceResult<&T> {
        self.types
            .get(name)
            .ok_or_else(|| InheritanceError::ClassNotFound(name.clone()))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&TypeName> {
        let mut names: Vec<&TypeName> = self.types.keys().collect();
        names.sort();
        names
    }
}

impl<T> Default for TypeCatalog<T> {
    fn default() -> Self {
        Self::new()
    }
}
