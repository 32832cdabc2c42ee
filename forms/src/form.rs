//! `Form`: the handle a presentation layer holds for one form.

use crate::reducer::{FormEnvironment, FormReducer};
use crate::types::{FieldValidation, FormAction, FormState, FormValues};
use crate::validation::ValidatorRegistry;
use statekit_runtime::{Store, StoreConfig, StoreError};
use tokio::sync::broadcast;

/// A form with optional per-field validation.
///
/// Cloning yields another handle to the same form.
///
/// # Example
///
/// ```
/// use statekit_forms::{fields, Form, ValidationRule, ValidatorRegistry};
///
/// # async fn example() -> Result<(), statekit_runtime::StoreError> {
/// let rules = ValidatorRegistry::new()
///     .with_rule("email", ValidationRule::new(|v| !v.is_empty()).with_message("Required"));
/// let form = Form::with_validators(fields([("email", "")]), rules);
///
/// assert!(!form.is_valid().await);
/// form.on_field_change("email", "a@b.com").await?;
/// assert!(form.is_valid().await);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Form {
    store: Store<FormState, FormAction, FormEnvironment, FormReducer>,
}

impl Form {
    /// Form without validation: always valid
    #[must_use]
    pub fn new(initial: FormValues) -> Self {
        Self::with_validators(initial, ValidatorRegistry::new())
    }

    /// Form validated by `validators`
    #[must_use]
    pub fn with_validators(initial: FormValues, validators: ValidatorRegistry) -> Self {
        Self::with_config(initial, validators, StoreConfig::default())
    }

    /// Form with a custom store configuration
    #[must_use]
    pub fn with_config(initial: FormValues, validators: ValidatorRegistry, config: StoreConfig) -> Self {
        let env = FormEnvironment::new(validators);
        let state = FormState::new(initial, &env.validators);
        Self {
            store: Store::with_config(state, FormReducer::new(), env, config),
        }
    }

    /// Replace all values and the reset snapshot
    ///
    /// # Errors
    ///
    /// Propagates [`StoreError`] from dispatch.
    pub async fn initialize(&self, values: FormValues) -> Result<(), StoreError> {
        self.store.send(FormAction::Initialize { values }).await
    }

    /// Set one field and revalidate the form
    ///
    /// # Errors
    ///
    /// Propagates [`StoreError`] from dispatch.
    pub async fn on_field_change(
        &self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), StoreError> {
        self.store
            .send(FormAction::FieldChanged {
                name: name.into(),
                value: value.into(),
            })
            .await
    }

    /// Restore the values captured at initialization
    ///
    /// # Errors
    ///
    /// Propagates [`StoreError`] from dispatch.
    pub async fn reset(&self) -> Result<(), StoreError> {
        self.store.send(FormAction::Reset).await
    }

    /// True iff every rule passes for the current values
    pub async fn is_valid(&self) -> bool {
        self.store.state(|s| s.is_valid).await
    }

    /// Current values
    pub async fn values(&self) -> FormValues {
        self.store.state(|s| s.values.clone()).await
    }

    /// Current value of `name`
    pub async fn value(&self, name: &str) -> Option<String> {
        self.store.state(|s| s.value(name).map(str::to_string)).await
    }

    /// Error message for `name`, `None` when valid
    pub async fn field_error(&self, name: &str) -> Option<String> {
        self.store.state(|s| s.field_error(name).map(str::to_string)).await
    }

    /// Per-field validation outcome
    pub async fn validation(&self) -> FieldValidation {
        self.store.state(|s| s.validation.clone()).await
    }

    /// Snapshot of the whole state
    pub async fn state(&self) -> FormState {
        self.store.state(Clone::clone).await
    }

    /// Receive every action applied to this form
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<FormAction> {
        self.store.subscribe()
    }
}

impl std::fmt::Debug for Form {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Form").finish_non_exhaustive()
    }
}
