//! Reducer for the form state machine.
//!
//! Every action ends with a full revalidation, so `FormState::is_valid`
//! always reflects the latest values.

use crate::types::{FormAction, FormState};
use crate::validation::ValidatorRegistry;
use statekit_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
use std::sync::Arc;

/// Environment dependencies for the form reducer
#[derive(Clone, Debug, Default)]
pub struct FormEnvironment {
    /// Rules applied after every change
    pub validators: Arc<ValidatorRegistry>,
}

impl FormEnvironment {
    /// Creates a new `FormEnvironment`
    #[must_use]
    pub fn new(validators: ValidatorRegistry) -> Self {
        Self {
            validators: Arc::new(validators),
        }
    }
}

/// Reducer for forms
#[derive(Clone, Copy, Debug, Default)]
pub struct FormReducer;

impl FormReducer {
    /// Creates a new `FormReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for FormReducer {
    type State = FormState;
    type Action = FormAction;
    type Environment = FormEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            FormAction::Initialize { values } => {
                state.initial = values.clone();
                state.values = values;
            },
            FormAction::FieldChanged { name, value } => {
                tracing::trace!(field = %name, "Field changed");
                state.values.insert(name, value);
            },
            FormAction::Reset => {
                state.values = state.initial.clone();
            },
        }

        // Cross-field rules need the whole form rechecked
        state.revalidate(&env.validators);
        tracing::debug!(
            valid = state.is_valid,
            invalid = state.invalid_fields().count(),
            "Form revalidated"
        );

        smallvec![Effect::None]
    }
}
