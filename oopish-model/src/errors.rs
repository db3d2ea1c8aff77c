use serde::{Deserialize, Serialize};

/// Attribute name for errors that belong to the record as a whole.
pub const BASE: &str = "base";

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    pub attribute: String,
    pub message: String,
}

impl ErrorEntry {
    /// The message prefixed with the humanized attribute name.
    /// Errors on [`BASE`] are returned bare.
    pub fn full_message(&self) -> String {
        if self.attribute == BASE {
            return self.message.clone();
        }
        format!("{} {}", humanize(&self.attribute), self.message)
    }
}

/// Ordered collection of validation failures, in the order they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Errors {
    entries: Vec<ErrorEntry>,
}

impl Errors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failure on `attribute`.
    pub fn add(&mut self, attribute: impl Into<String>, message: impl Into<String>) {
        self.entries.push(ErrorEntry {
            attribute: attribute.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &ErrorEntry> {
        self.entries.iter()
    }

    /// True if at least one failure was recorded on `attribute`.
    pub fn has(&self, attribute: &str) -> bool {
        self.entries.iter().any(|e| e.attribute == attribute)
    }

    /// Raw messages recorded on `attribute`.
    pub fn messages_for(&self, attribute: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.attribute == attribute)
            .map(|e| e.message.as_str())
            .collect()
    }

    /// Distinct attributes with failures, in first-seen order.
    pub fn attributes(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !seen.contains(&entry.attribute.as_str()) {
                seen.push(&entry.attribute);
            }
        }
        seen
    }

    pub fn full_messages(&self) -> Vec<String> {
        self.entries.iter().map(ErrorEntry::full_message).collect()
    }

    pub fn full_messages_for(&self, attribute: &str) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.attribute == attribute)
            .map(ErrorEntry::full_message)
            .collect()
    }

    /// Appends every entry of `other`.
    pub fn merge(&mut self, other: Errors) {
        self.entries.extend(other.entries);
    }
}

impl<'a> IntoIterator for &'a Errors {
    type Item = &'a ErrorEntry;
    type IntoIter = std::slice::Iter<'a, ErrorEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// `first_name` -> `First name`, `author_id` -> `Author`.
fn humanize(attribute: &str) -> String {
    let trimmed = attribute.strip_suffix("_id").unwrap_or(attribute);
    let spaced = trimmed.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
