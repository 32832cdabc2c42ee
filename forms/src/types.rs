//! Form state and actions.

use crate::validation::ValidatorRegistry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field name → current string value
pub type FormValues = BTreeMap<String, String>;

/// Field name → error message, `None` meaning the field is valid
///
/// Holds one entry per field that has a rule.
pub type FieldValidation = BTreeMap<String, Option<String>>;

/// Build [`FormValues`] from `(name, value)` pairs
///
/// ```
/// use statekit_forms::fields;
///
/// let values = fields([("email", ""), ("password", "")]);
/// assert_eq!(values.len(), 2);
/// ```
pub fn fields<I, K, V>(pairs: I) -> FormValues
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(name, value)| (name.into(), value.into()))
        .collect()
}

/// State of one form
///
/// `validation` and `is_valid` are derived from `values` and are recomputed
/// by the reducer on every action; they are never edited directly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormState {
    /// Current field values
    pub values: FormValues,
    /// Snapshot taken at initialization, restored by reset
    pub initial: FormValues,
    /// Per-field outcome of the last validation
    pub validation: FieldValidation,
    /// True iff every entry in `validation` is `None`
    pub is_valid: bool,
}

impl FormState {
    /// State for `initial`, validated against `validators`
    #[must_use]
    pub fn new(initial: FormValues, validators: &ValidatorRegistry) -> Self {
        let mut state = Self {
            values: initial.clone(),
            initial,
            validation: FieldValidation::new(),
            is_valid: true,
        };
        state.revalidate(validators);
        state
    }

    /// Recompute `validation` and `is_valid` from the current values
    pub fn revalidate(&mut self, validators: &ValidatorRegistry) {
        self.validation = validators.validate(&self.values);
        self.is_valid = self.validation.values().all(Option::is_none);
    }

    /// Current value of `name`
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Error message for `name`, `None` when valid or unvalidated
    #[must_use]
    pub fn field_error(&self, name: &str) -> Option<&str> {
        self.validation.get(name).and_then(Option::as_deref)
    }

    /// Names of fields currently failing validation
    pub fn invalid_fields(&self) -> impl Iterator<Item = &str> {
        self.validation
            .iter()
            .filter(|(_, error)| error.is_some())
            .map(|(name, _)| name.as_str())
    }
}

impl Default for FormState {
    fn default() -> Self {
        Self::new(FormValues::new(), &ValidatorRegistry::new())
    }
}

/// Actions accepted by the form reducer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormAction {
    /// Replace all values and the reset snapshot
    Initialize {
        /// New values
        values: FormValues,
    },

    /// Set one field, leaving the others untouched
    FieldChanged {
        /// Field name
        name: String,
        /// New value
        value: String,
    },

    /// Restore the values captured at initialization
    Reset,
}
