//! Built-in attribute rules.
//!
//! Rules are plain serde data so rule sets can be kept in JSON:
//! `{"kind": "length", "minimum": 1, "maximum": 10}`. A rule is compiled once
//! when registered on a model type; format patterns are checked at that point.

use crate::{ModelError, ModelResult};
use oopish_types::is_blank;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single attribute rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rule {
    /// Value must not be blank.
    Presence,
    /// Value must be blank.
    Absence,
    Length(Length),
    Numericality(Numericality),
    /// Value must equal one of the listed values.
    Inclusion {
        #[serde(rename = "in")]
        within: Vec<Value>,
    },
    /// Value must equal none of the listed values.
    Exclusion {
        #[serde(rename = "in")]
        within: Vec<Value>,
    },
    Format(Format),
}

impl Rule {
    /// Shorthand for an inclusion rule.
    pub fn inclusion<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::Inclusion {
            within: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Shorthand for an exclusion rule.
    pub fn exclusion<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::Exclusion {
            within: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Compiles the rule, checking any format patterns.
    pub fn compile(self) -> ModelResult<CompiledRule> {
        let (with, without) = match &self {
            Rule::Format(format) => (
                compile_pattern(format.with.as_deref())?,
                compile_pattern(format.without.as_deref())?,
            ),
            _ => (None, None),
        };
        Ok(CompiledRule {
            rule: self,
            with,
            without,
        })
    }

    /// Compiles and evaluates in one step. Prefer [`CompiledRule`] when the
    /// rule is evaluated repeatedly.
    pub fn evaluate(&self, value: &Value) -> ModelResult<Vec<String>> {
        Ok(self.clone().compile()?.evaluate(value))
    }
}

impl From<Length> for Rule {
    fn from(length: Length) -> Self {
        Rule::Length(length)
    }
}

impl From<Numericality> for Rule {
    fn from(numericality: Numericality) -> Self {
        Rule::Numericality(numericality)
    }
}

impl From<Format> for Rule {
    fn from(format: Format) -> Self {
        Rule::Format(format)
    }
}

/// Length bounds. Strings count characters, arrays count elements and a
/// missing value counts as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Length {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is: Option<usize>,
}

impl Length {
    pub fn minimum(mut self, n: usize) -> Self {
        self.minimum = Some(n);
        self
    }

    pub fn maximum(mut self, n: usize) -> Self {
        self.maximum = Some(n);
        self
    }

    pub fn is(mut self, n: usize) -> Self {
        self.is = Some(n);
        self
    }

    fn evaluate(&self, value: &Value) -> Vec<String> {
        let len = match value {
            Value::Null => 0,
            Value::String(s) => s.chars().count(),
            Value::Array(items) => items.len(),
            Value::Object(map) => map.len(),
            other => other.to_string().chars().count(),
        };

        let mut messages = Vec::new();
        if let Some(is) = self.is {
            if len != is {
                messages.push(format!(
                    "is the wrong length (should be {})",
                    characters(is)
                ));
            }
        }
        if let Some(min) = self.minimum {
            if len < min {
                messages.push(format!("is too short (minimum is {})", characters(min)));
            }
        }
        if let Some(max) = self.maximum {
            if len > max {
                messages.push(format!("is too long (maximum is {})", characters(max)));
            }
        }
        messages
    }
}

fn characters(n: usize) -> String {
    if n == 1 {
        "1 character".to_string()
    } else {
        format!("{n} characters")
    }
}

/// Numeric constraints. Numeric strings are accepted; booleans and `null`
/// are not numbers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Numericality {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub only_integer: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub greater_than: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub greater_than_or_equal_to: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equal_to: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub less_than: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub less_than_or_equal_to: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_than: Option<f64>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub odd: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub even: bool,
}

impl Numericality {
    pub fn only_integer(mut self) -> Self {
        self.only_integer = true;
        self
    }

    pub fn greater_than(mut self, n: f64) -> Self {
        self.greater_than = Some(n);
        self
    }

    pub fn greater_than_or_equal_to(mut self, n: f64) -> Self {
        self.greater_than_or_equal_to = Some(n);
        self
    }

    pub fn equal_to(mut self, n: f64) -> Self {
        self.equal_to = Some(n);
        self
    }

    pub fn less_than(mut self, n: f64) -> Self {
        self.less_than = Some(n);
        self
    }

    pub fn less_than_or_equal_to(mut self, n: f64) -> Self {
        self.less_than_or_equal_to = Some(n);
        self
    }

    pub fn other_than(mut self, n: f64) -> Self {
        self.other_than = Some(n);
        self
    }

    pub fn odd(mut self) -> Self {
        self.odd = true;
        self
    }

    pub fn even(mut self) -> Self {
        self.even = true;
        self
    }

    fn evaluate(&self, value: &Value) -> Vec<String> {
        let Some((n, integer)) = parse_number(value) else {
            return vec!["is not a number".to_string()];
        };
        if self.only_integer && !integer {
            return vec!["must be an integer".to_string()];
        }

        let checks: [(Option<f64>, fn(f64, f64) -> bool, &str); 6] = [
            (self.greater_than, |v, c| v > c, "greater than"),
            (
                self.greater_than_or_equal_to,
                |v, c| v >= c,
                "greater than or equal to",
            ),
            (self.equal_to, |v, c| v == c, "equal to"),
            (self.less_than, |v, c| v < c, "less than"),
            (
                self.less_than_or_equal_to,
                |v, c| v <= c,
                "less than or equal to",
            ),
            (self.other_than, |v, c| v != c, "other than"),
        ];

        let mut messages = Vec::new();
        for (bound, holds, label) in checks {
            if let Some(bound) = bound {
                if !holds(n, bound) {
                    messages.push(format!("must be {label} {}", display_number(bound)));
                }
            }
        }
        // Parity looks at the integer part only.
        let whole = n.trunc() as i64;
        if self.odd && whole % 2 == 0 {
            messages.push("must be odd".to_string());
        }
        if self.even && whole % 2 != 0 {
            messages.push("must be even".to_string());
        }
        messages
    }
}

/// Returns the numeric value and whether it is an integer.
fn parse_number(value: &Value) -> Option<(f64, bool)> {
    match value {
        Value::Number(n) => {
            let integer = n.is_i64() || n.is_u64();
            n.as_f64().map(|f| (f, integer))
        }
        Value::String(s) => {
            let s = s.trim();
            if is_integer_literal(s) {
                s.parse::<f64>().ok().map(|f| (f, true))
            } else if is_decimal_literal(s) {
                s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| (f, false))
            } else {
                None
            }
        }
        _ => None,
    }
}

fn strip_sign(s: &str) -> &str {
    s.strip_prefix(&['+', '-'][..]).unwrap_or(s)
}

fn is_integer_literal(s: &str) -> bool {
    let digits = strip_sign(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn is_decimal_literal(s: &str) -> bool {
    let body = strip_sign(s);
    let (mantissa, exponent) = match body.find(&['e', 'E'][..]) {
        Some(idx) => (&body[..idx], Some(&body[idx + 1..])),
        None => (body, None),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let digits_ok = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if int_part.is_empty() && frac_part.is_empty() {
        return false;
    }
    if !digits_ok(int_part) || !digits_ok(frac_part) {
        return false;
    }
    match exponent {
        Some(exp) => is_integer_literal(exp),
        None => true,
    }
}

fn display_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// Pattern constraints on the value's text form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Format {
    /// Text must match this pattern.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub with: Option<String>,
    /// Text must not match this pattern.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub without: Option<String>,
}

impl Format {
    pub fn with(pattern: impl Into<String>) -> Self {
        Self {
            with: Some(pattern.into()),
            without: None,
        }
    }

    pub fn without(pattern: impl Into<String>) -> Self {
        Self {
            with: None,
            without: Some(pattern.into()),
        }
    }
}

fn compile_pattern(pattern: Option<&str>) -> ModelResult<Option<Regex>> {
    pattern
        .map(|p| {
            Regex::new(p).map_err(|source| ModelError::InvalidPattern {
                pattern: p.to_string(),
                source,
            })
        })
        .transpose()
}

fn text_of(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A rule ready for evaluation.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    rule: Rule,
    with: Option<Regex>,
    without: Option<Regex>,
}

impl CompiledRule {
    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    /// Returns the default failure messages for `value`; empty when it passes.
    pub fn evaluate(&self, value: &Value) -> Vec<String> {
        match &self.rule {
            Rule::Presence => {
                if is_blank(value) {
                    vec!["can't be blank".to_string()]
                } else {
                    Vec::new()
                }
            }
            Rule::Absence => {
                if is_blank(value) {
                    Vec::new()
                } else {
                    vec!["must be blank".to_string()]
                }
            }
            Rule::Length(length) => length.evaluate(value),
            Rule::Numericality(numericality) => numericality.evaluate(value),
            Rule::Inclusion { within } => {
                if within.contains(value) {
                    Vec::new()
                } else {
                    vec!["is not included in the list".to_string()]
                }
            }
            Rule::Exclusion { within } => {
                if within.contains(value) {
                    vec!["is reserved".to_string()]
                } else {
                    Vec::new()
                }
            }
            Rule::Format(_) => {
                let text = text_of(value);
                let rejected = self.with.as_ref().is_some_and(|re| !re.is_match(&text))
                    || self.without.as_ref().is_some_and(|re| re.is_match(&text));
                if rejected {
                    vec!["is invalid".to_string()]
                } else {
                    Vec::new()
                }
            }
        }
    }
}

/// Options shared by every rule in one `validates` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleOptions {
    /// Skip the rules when the value is `null` or missing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_nil: Option<bool>,
    /// Skip the rules when the value is blank.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_blank: Option<bool>,
    /// Replaces the default message of every failing rule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RuleOptions {
    pub fn allowing_nil(mut self) -> Self {
        self.allow_nil = Some(true);
        self
    }

    pub fn allowing_blank(mut self) -> Self {
        self.allow_blank = Some(true);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Layers `overrides` on top of `self`; set fields in `overrides` win.
    #[must_use]
    pub fn merge(&self, overrides: &RuleOptions) -> RuleOptions {
        RuleOptions {
            allow_nil: overrides.allow_nil.or(self.allow_nil),
            allow_blank: overrides.allow_blank.or(self.allow_blank),
            message: overrides.message.clone().or_else(|| self.message.clone()),
        }
    }

    /// Whether the rules should not run for `value`.
    pub fn skips(&self, value: &Value) -> bool {
        (self.allow_nil == Some(true) && value.is_null())
            || (self.allow_blank == Some(true) && is_blank(value))
    }
}

/// One `validates` call as data: every rule applies to every field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeRules {
    pub fields: Vec<String>,
    pub rules: Vec<Rule>,
    #[serde(default)]
    pub options: RuleOptions,
}

impl AttributeRules {
    pub fn new<F, S, R>(fields: F, rules: R) -> Self
    where
        F: IntoIterator<Item = S>,
        S: Into<String>,
        R: IntoIterator<Item = Rule>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            rules: rules.into_iter().collect(),
            options: RuleOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RuleOptions) -> Self {
        self.options = options;
        self
    }
}
