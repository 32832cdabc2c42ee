//! # Statekit Core
//!
//! Core traits and types for small, reducer-driven UI state containers.
//!
//! A presentation layer owns a handful of state holders (a form, a todo list)
//! and drives them with typed actions. This crate defines the pieces every
//! holder shares:
//!
//! - **State**: plain owned data, `Clone` and `Debug`
//! - **Action**: every input a reducer accepts
//! - **Reducer**: deterministic `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: a description of I/O for the runtime to perform
//! - **Environment**: injected dependencies (clock, id source, blob store)
//!
//! ## Example
//!
//! ```
//! use statekit_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
//!
//! #[derive(Clone, Debug, Default)]
//! struct Toggle {
//!     on: bool,
//! }
//!
//! enum ToggleAction {
//!     Flip,
//! }
//!
//! struct ToggleReducer;
//!
//! impl Reducer for ToggleReducer {
//!     type State = Toggle;
//!     type Action = ToggleAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut Toggle,
//!         action: ToggleAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<ToggleAction>; 4]> {
//!         match action {
//!             ToggleAction::Flip => state.on = !state.on,
//!         }
//!         smallvec![Effect::None]
//!     }
//! }
//!
//! let mut state = Toggle::default();
//! ToggleReducer.reduce(&mut state, ToggleAction::Flip, &());
//! assert!(state.on);
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{smallvec, SmallVec};

/// Key-value blob persistence
pub mod storage;

/// Reducer module - The core trait for state transitions
///
/// Reducers are deterministic functions: `(State, Action, Environment) → (State, Effects)`.
/// All state logic lives here and is testable without a runtime.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for state transitions
    ///
    /// # Type Parameters
    ///
    /// - `State`: The state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// Updates `state` in place and returns effect descriptions for the
        /// runtime to execute. Must not perform I/O itself.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects are values returned by reducers and executed by the runtime.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what should happen,
    /// returned from reducers and executed by the Store runtime.
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects concurrently
        Parallel(Vec<Effect<Action>>),

        /// Run effects one after another
        Sequential(Vec<Effect<Action>>),

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Combine effects to run in parallel
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Parallel(effects)
        }

        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }

        /// Wrap an async computation
        pub fn future<F>(fut: F) -> Effect<Action>
        where
            F: Future<Output = Option<Action>> + Send + 'static,
        {
            Effect::Future(Box::pin(fut))
        }

        /// True for `Effect::None`
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Effect::None)
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected
/// via the Environment parameter.
pub mod environment {
    use chrono::{DateTime, Utc};
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Clock trait - abstracts time operations for testability
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall-clock time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    /// Source of fresh, unique numeric identifiers
    pub trait IdGenerator: Send + Sync {
        /// Returns an id never returned before by this generator
        fn next_id(&self) -> u64;

        /// Ensures later ids are greater than `id`
        ///
        /// Called with the largest id already in use, e.g. after loading
        /// persisted data. The default does nothing.
        fn advance_past(&self, id: u64) {
            let _ = id;
        }
    }

    /// Millisecond-timestamp ids
    ///
    /// Ids follow the clock, but two calls inside the same millisecond (or a
    /// clock that goes backwards) still yield strictly increasing values.
    #[derive(Debug)]
    pub struct TimestampIdGenerator<C: Clock> {
        clock: C,
        last: AtomicU64,
    }

    impl<C: Clock> TimestampIdGenerator<C> {
        /// Creates a generator driven by `clock`
        #[must_use]
        pub const fn new(clock: C) -> Self {
            Self {
                clock,
                last: AtomicU64::new(0),
            }
        }
    }

    impl<C: Clock> IdGenerator for TimestampIdGenerator<C> {
        fn next_id(&self) -> u64 {
            let millis = u64::try_from(self.clock.now().timestamp_millis()).unwrap_or(0);
            let mut previous = self.last.load(Ordering::Relaxed);
            loop {
                let candidate = millis.max(previous.saturating_add(1));
                match self.last.compare_exchange_weak(
                    previous,
                    candidate,
                    Ordering::AcqRel,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => return candidate,
                    Err(actual) => previous = actual,
                }
            }
        }

        fn advance_past(&self, id: u64) {
            self.last.fetch_max(id, Ordering::AcqRel);
        }
    }
}
