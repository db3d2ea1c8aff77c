use oopish_types::{Attributes, TypeName};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Instantiate `target` for records whose columns equal every value in
/// `condition`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstantiationRule {
    pub target: TypeName,
    #[serde(default)]
    pub condition: Attributes,
}

impl InstantiationRule {
    pub fn new<C, K>(target: TypeName, condition: C) -> Self
    where
        C: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self {
            target,
            condition: condition.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Exact equality on every condition column, no coercion. A column the
    /// record lacks reads as `null`.
    pub fn matches(&self, record: &Attributes) -> bool {
        self.condition
            .iter()
            .all(|(column, expected)| record.get(column).unwrap_or(&Value::Null) == expected)
    }
}
