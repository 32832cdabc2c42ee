//! Validator registry: which fields have a rule, and what the rule says.
//!
//! Rules are evaluated independently of each other, always against the whole
//! current form. A field without a rule is always valid.

use crate::types::{FieldValidation, FormValues};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Message recorded for a failing rule that was given no message of its own.
pub const DEFAULT_MESSAGE: &str = "This field is required.";

type Predicate = Arc<dyn Fn(&str, &FormValues) -> bool + Send + Sync>;

/// A predicate over one field's value plus the message shown when it fails.
///
/// Predicates must be total and side-effect free. A panicking predicate
/// propagates out of the dispatch that ran it.
#[derive(Clone)]
pub struct ValidationRule {
    predicate: Predicate,
    message: String,
}

impl ValidationRule {
    /// Rule over the field's own value
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self::cross_field(move |value, _| predicate(value))
    }

    /// Rule that may also read other fields (e.g. password confirmation)
    pub fn cross_field<F>(predicate: F) -> Self
    where
        F: Fn(&str, &FormValues) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
            message: DEFAULT_MESSAGE.to_string(),
        }
    }

    /// Set the message recorded when the rule fails
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Non-blank after trimming
    #[must_use]
    pub fn required() -> Self {
        Self::new(|value| !value.trim().is_empty())
    }

    /// At least `min` characters
    #[must_use]
    pub fn min_length(min: usize) -> Self {
        Self::new(move |value| value.chars().count() >= min)
    }

    /// Equal to the current value of `other`
    #[must_use]
    pub fn matches_field(other: impl Into<String>) -> Self {
        let other = other.into();
        Self::cross_field(move |value, form| {
            form.get(&other).map_or("", String::as_str) == value
        })
    }

    /// The failure message
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Run the predicate against `value` in the context of `form`
    #[must_use]
    pub fn check(&self, value: &str, form: &FormValues) -> bool {
        (self.predicate)(value, form)
    }
}

impl fmt::Debug for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationRule")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// Field name → rule.
///
/// An empty registry is a form without validation.
#[derive(Clone, Debug, Default)]
pub struct ValidatorRegistry {
    rules: BTreeMap<String, ValidationRule>,
}

impl ValidatorRegistry {
    /// Registry with no rules
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert)
    #[must_use]
    pub fn with_rule(mut self, field: impl Into<String>, rule: ValidationRule) -> Self {
        self.insert(field, rule);
        self
    }

    /// Register `rule` for `field`, replacing any previous rule
    pub fn insert(&mut self, field: impl Into<String>, rule: ValidationRule) -> Option<ValidationRule> {
        self.rules.insert(field.into(), rule)
    }

    /// Rule for `field`, if any
    #[must_use]
    pub fn rule(&self, field: &str) -> Option<&ValidationRule> {
        self.rules.get(field)
    }

    /// Names of all fields with a rule
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    /// Number of registered rules
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True when no field has a rule
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Evaluate every rule against `values`
    ///
    /// The result has exactly one entry per registered field: `None` when
    /// the rule passes, the rule's message when it fails. A registered field
    /// missing from `values` is checked as the empty string.
    #[must_use]
    pub fn validate(&self, values: &FormValues) -> FieldValidation {
        self.rules
            .iter()
            .map(|(field, rule)| {
                let value = values.get(field).map_or("", String::as_str);
                let outcome = (!rule.check(value, values)).then(|| rule.message().to_string());
                (field.clone(), outcome)
            })
            .collect()
    }
}

impl<K: Into<String>> FromIterator<(K, ValidationRule)> for ValidatorRegistry {
    fn from_iter<T: IntoIterator<Item = (K, ValidationRule)>>(iter: T) -> Self {
        Self {
            rules: iter.into_iter().map(|(k, rule)| (k.into(), rule)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fields;

    #[test]
    fn lookup_returns_registered_rule() {
        let registry = ValidatorRegistry::new().with_rule("email", ValidationRule::required());

        assert!(registry.rule("email").is_some());
        assert!(registry.rule("name").is_none());
        assert_eq!(registry.field_names().collect::<Vec<_>>(), ["email"]);
    }

    #[test]
    fn unconfigured_message_falls_back_to_default() {
        let rule = ValidationRule::new(|v| v.len() > 3);
        assert_eq!(rule.message(), DEFAULT_MESSAGE);
        assert_eq!(rule.with_message("Too short").message(), "Too short");
    }

    #[test]
    fn validate_covers_every_registered_field_only() {
        let registry = ValidatorRegistry::new()
            .with_rule("email", ValidationRule::required().with_message("Required"))
            .with_rule("name", ValidationRule::min_length(2));
        let values = fields([("email", ""), ("name", "Al"), ("notes", "")]);

        let outcome = registry.validate(&values);

        assert_eq!(outcome.len(), 2);
        assert_eq!(outcome["email"].as_deref(), Some("Required"));
        assert_eq!(outcome["name"], None);
        assert!(!outcome.contains_key("notes"));
    }

    #[test]
    fn missing_field_is_checked_as_empty() {
        let registry = ValidatorRegistry::new().with_rule("email", ValidationRule::required());

        let outcome = registry.validate(&FormValues::new());
        assert_eq!(outcome["email"].as_deref(), Some(DEFAULT_MESSAGE));
    }

    #[test]
    fn cross_field_rule_reads_other_fields() {
        let registry: ValidatorRegistry = [(
            "confirm",
            ValidationRule::matches_field("password").with_message("Passwords differ"),
        )]
        .into_iter()
        .collect();

        let mismatch = registry.validate(&fields([("password", "hunter2"), ("confirm", "hunter")]));
        assert_eq!(mismatch["confirm"].as_deref(), Some("Passwords differ"));

        let matching = registry.validate(&fields([("password", "hunter2"), ("confirm", "hunter2")]));
        assert_eq!(matching["confirm"], None);
    }

    #[test]
    fn min_length_counts_characters() {
        let rule = ValidationRule::min_length(3);
        assert!(rule.check("héé", &FormValues::new()));
        assert!(!rule.check("hé", &FormValues::new()));
    }
}
