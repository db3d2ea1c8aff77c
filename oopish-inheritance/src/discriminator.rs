use crate::{InheritanceError, InheritanceResult, InstantiationRule, TypeCatalog};
use oopish_types::{Attributes, TypeName};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};

/// Ordered instantiation rules owned by a base type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DiscriminatorDef")]
pub struct Discriminator {
    base: TypeName,
    rules: Vec<InstantiationRule>,
}

#[derive(Deserialize)]
struct DiscriminatorDef {
    base: TypeName,
    #[serde(default)]
    rules: Vec<InstantiationRule>,
}

impl TryFrom<DiscriminatorDef> for Discriminator {
    type Error = InheritanceError;

    fn try_from(def: DiscriminatorDef) -> Result<Self, Self::Error> {
        let mut discriminator = Discriminator::new(def.base);
        for rule in def.rules {
            discriminator.push(rule)?;
        }
        Ok(discriminator)
    }
}

impl Discriminator {
    #[must_use]
    pub fn new(base: TypeName) -> Self {
        Self {
            base,
            rules: Vec::new(),
        }
    }

    /// Loads a rule set such as
    /// `{"base": "Book", "rules": [{"target": "Novel", "condition": {"category": "novel"}}]}`.
    pub fn from_json(json: &str) -> InheritanceResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn base(&self) -> &TypeName {
        &self.base
    }

    /// Rules in registration order.
    pub fn rules(&self) -> &[InstantiationRule] {
        &self.rules
    }

    /// Appends a rule. The target is only looked up when a record resolves
    /// to it.
    pub fn instantiate_as<C, K>(
        &mut self,
        target: TypeName,
        condition: C,
    ) -> InheritanceResult<&mut Self>
    where
        C: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        self.push(InstantiationRule::new(target, condition))?;
        Ok(self)
    }

    fn push(&mut self, rule: InstantiationRule) -> InheritanceResult<()> {
        if let Some(existing) = self.rules.iter().find(|r| r.condition == rule.condition) {
            return Err(InheritanceError::DuplicateCondition {
                base: self.base.clone(),
                target: rule.target,
                existing: existing.target.clone(),
            });
        }
        debug!(base = %self.base, target = %rule.target, "Registered instantiation rule");
        self.rules.push(rule);
        Ok(())
    }

    /// The first matching rule, in registration order.
    pub fn matching_rule(&self, record: &Attributes) -> Option<&InstantiationRule> {
        self.rules.iter().find(|rule| rule.matches(record))
    }

    /// The type a record should be instantiated as: the first matching rule's
    /// target, else the base type.
    pub fn resolve(&self, record: &Attributes) -> &TypeName {
        match self.matching_rule(record) {
            Some(rule) => {
                trace!(base = %self.base, target = %rule.target, "Record matched instantiation rule");
                &rule.target
            }
            None => &self.base,
        }
    }

    /// Resolves `record` and looks the resulting type up in `catalog`.
    /// Fails with `ClassNotFound` if the type is not registered.
    pub fn discriminate<'c, T>(
        &self,
        record: &Attributes,
        catalog: &'c TypeCatalog<T>,
    ) -> InheritanceResult<&'c T> {
        catalog.constantize(self.resolve(record))
    }
}
