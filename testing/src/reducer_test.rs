//! Scenario runner for reducers.
//!
//! A scenario starts from a state, feeds one or more actions through a
//! reducer synchronously and then checks the final state and every effect
//! the reducer described. Effects are collected, never executed.

#![allow(clippy::module_name_repetitions)] // ReducerTest is the natural name

use statekit_core::{effect::Effect, reducer::Reducer};

type StateCheck<S> = Box<dyn FnOnce(&S)>;
type EffectCheck<A> = Box<dyn FnOnce(&[Effect<A>])>;

/// One reducer scenario: `given_state`, then `when_action`s, then checks.
///
/// Checks are recorded by the `then_*` methods and only evaluated by
/// [`run`](Self::run).
///
/// # Example
///
/// ```ignore
/// use statekit_testing::{assertions, ReducerTest};
///
/// ReducerTest::new(FormReducer::new())
///     .with_env(FormEnvironment::new(registry))
///     .given_state(FormState::default())
///     .when_action(FormAction::FieldChanged { name: "email".into(), value: "a@b.com".into() })
///     .then_state(|state| assert!(state.is_valid))
///     .then_effects(assertions::assert_no_effects)
///     .run();
/// ```
pub struct ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    reducer: R,
    env: Option<E>,
    start: Option<S>,
    actions: Vec<A>,
    state_checks: Vec<StateCheck<S>>,
    effect_checks: Vec<EffectCheck<A>>,
}

impl<R, S, A, E> ReducerTest<R, S, A, E>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    /// Scenario for `reducer` with nothing configured yet
    #[must_use]
    pub const fn new(reducer: R) -> Self {
        Self {
            reducer,
            env: None,
            start: None,
            actions: Vec::new(),
            state_checks: Vec::new(),
            effect_checks: Vec::new(),
        }
    }

    /// Environment handed to every `reduce` call
    #[must_use]
    pub fn with_env(mut self, env: E) -> Self {
        self.env = Some(env);
        self
    }

    /// State before the first action
    #[must_use]
    pub fn given_state(mut self, state: S) -> Self {
        self.start = Some(state);
        self
    }

    /// Queue `action`; repeated calls queue in order
    #[must_use]
    pub fn when_action(mut self, action: A) -> Self {
        self.actions.push(action);
        self
    }

    /// Queue every action from `actions`
    #[must_use]
    pub fn when_actions(mut self, actions: impl IntoIterator<Item = A>) -> Self {
        self.actions.extend(actions);
        self
    }

    /// Check the state left after the last action
    #[must_use]
    pub fn then_state<F>(mut self, check: F) -> Self
    where
        F: FnOnce(&S) + 'static,
    {
        self.state_checks.push(Box::new(check));
        self
    }

    /// Check the effects of all queued actions, concatenated in order
    #[must_use]
    pub fn then_effects<F>(mut self, check: F) -> Self
    where
        F: FnOnce(&[Effect<A>]) + 'static,
    {
        self.effect_checks.push(Box::new(check));
        self
    }

    /// Reduce the queued actions, then evaluate the recorded checks
    ///
    /// # Panics
    ///
    /// Panics when the start state or environment is missing, when no
    /// action was queued, or when a check fails.
    #[allow(clippy::panic)] // Test code can panic
    #[allow(clippy::expect_used)] // Test code can use expect
    pub fn run(self) {
        let Self {
            reducer,
            env,
            start,
            actions,
            state_checks,
            effect_checks,
        } = self;

        let env = env.expect("with_env() was not called");
        let mut state = start.expect("given_state() was not called");
        assert!(!actions.is_empty(), "no action queued; call when_action()");

        let effects: Vec<_> = actions
            .into_iter()
            .flat_map(|action| reducer.reduce(&mut state, action, &env))
            .collect();

        state_checks.into_iter().for_each(|check| check(&state));
        effect_checks.into_iter().for_each(|check| check(&effects));
    }
}

/// Ready-made effect checks for [`ReducerTest::then_effects`]
pub mod assertions {
    use statekit_core::effect::Effect;

    /// Every effect is `Effect::None` (an empty slice passes)
    ///
    /// # Panics
    ///
    /// Panics on the first effect that does work.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_no_effects<A: std::fmt::Debug>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().all(Effect::is_none),
            "reducer described work: {effects:?}"
        );
    }

    /// Exactly `expected` effects, `Effect::None` included
    ///
    /// # Panics
    ///
    /// Panics when the count differs.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_effects_count<A>(effects: &[Effect<A>], expected: usize) {
        assert_eq!(effects.len(), expected, "wrong number of effects");
    }

    /// At least one effect is an `Effect::Future`
    ///
    /// # Panics
    ///
    /// Panics when none is.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_has_future_effect<A>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().any(|effect| matches!(effect, Effect::Future(_))),
            "no async effect among {} effects",
            effects.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statekit_core::{smallvec, SmallVec};

    #[derive(Clone, Debug)]
    struct Counter {
        count: i32,
    }

    #[derive(Clone, Debug)]
    enum Step {
        Up,
        Down,
        Ping,
    }

    struct CounterReducer;

    impl Reducer for CounterReducer {
        type State = Counter;
        type Action = Step;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                Step::Up => state.count += 1,
                Step::Down => state.count -= 1,
                Step::Ping => return smallvec![Effect::future(async { None })],
            }
            smallvec![Effect::None]
        }
    }

    #[test]
    fn single_action_updates_state() {
        ReducerTest::new(CounterReducer)
            .with_env(())
            .given_state(Counter { count: 0 })
            .when_action(Step::Up)
            .then_state(|state| assert_eq!(state.count, 1))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn queued_actions_run_in_order_and_concatenate_effects() {
        ReducerTest::new(CounterReducer)
            .with_env(())
            .given_state(Counter { count: 5 })
            .when_actions([Step::Down, Step::Down])
            .when_action(Step::Up)
            .then_state(|state| assert_eq!(state.count, 4))
            .then_effects(|effects| assertions::assert_effects_count(effects, 3))
            .run();
    }

    #[test]
    fn future_effects_are_collected_not_run() {
        ReducerTest::new(CounterReducer)
            .with_env(())
            .given_state(Counter { count: 0 })
            .when_action(Step::Ping)
            .then_state(|state| assert_eq!(state.count, 0))
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn no_effects_accepts_none_and_empty() {
        assertions::assert_no_effects::<Step>(&[Effect::None]);
        assertions::assert_no_effects::<Step>(&[]);
    }

    #[test]
    #[should_panic(expected = "given_state")]
    fn missing_start_state_panics() {
        ReducerTest::new(CounterReducer)
            .with_env(())
            .when_action(Step::Up)
            .run();
    }
}
