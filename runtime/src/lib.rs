//! # Statekit Runtime
//!
//! Runtime implementation for statekit state holders.
//!
//! ## Core Components
//!
//! - **Store**: owns state, serializes dispatch, runs the reducer
//! - **Effect execution**: runs effect descriptions and feeds produced actions back
//! - **Change feed**: broadcasts every applied action to subscribers
//! - **`FileBlobStore`**: durable [`BlobStore`](statekit_core::storage::BlobStore) on the local filesystem
//!
//! ## Example
//!
//! ```ignore
//! use statekit_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//!
//! // Send an action; effects have finished when this returns
//! store.send(Action::DoSomething).await?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field).await;
//! ```

use statekit_core::{effect::Effect, reducer::Reducer};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Filesystem-backed blob storage
pub mod storage;

pub use storage::FileBlobStore;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// Effects kept producing actions past the configured depth
        ///
        /// Actions already reduced stay applied; the remaining feedback
        /// actions are dropped.
        #[error("Effect feedback exceeded {0} levels")]
        FeedbackLimitExceeded(usize),
    }
}

pub use error::StoreError;

/// Configuration for Store behavior
///
/// # Example
///
/// ```
/// use statekit_runtime::StoreConfig;
///
/// let config = StoreConfig::default()
///     .with_broadcast_capacity(64)
///     .with_max_feedback_depth(8);
///
/// assert_eq!(config.broadcast_capacity, 64);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Buffered actions per subscriber before it starts lagging
    pub broadcast_capacity: usize,
    /// How many rounds of effect-produced actions one `send` may process
    pub max_feedback_depth: usize,
}

impl StoreConfig {
    /// Create a new configuration with custom values
    #[must_use]
    pub const fn new(broadcast_capacity: usize, max_feedback_depth: usize) -> Self {
        Self {
            broadcast_capacity,
            max_feedback_depth,
        }
    }

    /// Set the subscriber buffer size
    #[must_use]
    pub const fn with_broadcast_capacity(mut self, capacity: usize) -> Self {
        self.broadcast_capacity = capacity;
        self
    }

    /// Set the feedback depth limit
    #[must_use]
    pub const fn with_max_feedback_depth(mut self, depth: usize) -> Self {
        self.max_feedback_depth = depth;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            broadcast_capacity: 16,
            max_feedback_depth: 32,
        }
    }
}

/// Store runtime for coordinating reducer execution and effect handling.
pub mod store {
    use super::{Arc, Effect, Mutex, Reducer, RwLock, StoreConfig, StoreError};
    use futures::future::{BoxFuture, FutureExt};
    use std::collections::VecDeque;
    use tokio::sync::broadcast;

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock` for concurrent readers)
    /// 2. Reducer (state transitions)
    /// 3. Environment (injected dependencies)
    /// 4. Effect execution (with feedback loop)
    ///
    /// Dispatch is serialized: one `send` at a time runs its reducer and its
    /// effects, so effects observe state changes in dispatch order.
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `E`: Environment type
    /// - `R`: Reducer implementation
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        dispatch: Arc<Mutex<()>>,
        reducer: R,
        environment: E,
        config: StoreConfig,
        action_broadcast: broadcast::Sender<A>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        A: Send + Clone + 'static,
        S: Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_config(initial_state, reducer, environment, StoreConfig::default())
        }

        /// Create a new Store with custom configuration
        #[must_use]
        pub fn with_config(initial_state: S, reducer: R, environment: E, config: StoreConfig) -> Self {
            let (action_broadcast, _) = broadcast::channel(config.broadcast_capacity.max(1));

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                dispatch: Arc::new(Mutex::new(())),
                reducer,
                environment,
                config,
                action_broadcast,
            }
        }

        /// Send an action to the store
        ///
        /// Runs the reducer under the state write lock, publishes the action to
        /// subscribers, then executes the returned effects to completion.
        /// Actions produced by effects are reduced in the same call, breadth first.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::FeedbackLimitExceeded`] when effects keep
        /// producing actions beyond `max_feedback_depth` rounds.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<(), StoreError> {
            let _serialized = self.dispatch.lock().await;
            metrics::counter!("store.actions.total").increment(1);

            let mut pending = VecDeque::from([(action, 0_usize)]);

            while let Some((action, depth)) = pending.pop_front() {
                if depth > self.config.max_feedback_depth {
                    tracing::warn!(
                        limit = self.config.max_feedback_depth,
                        dropped = pending.len() + 1,
                        "Effect feedback limit exceeded"
                    );
                    return Err(StoreError::FeedbackLimitExceeded(self.config.max_feedback_depth));
                }

                tracing::debug!(depth, "Processing action");

                let effects = {
                    let mut state = self.state.write().await;
                    tracing::trace!("Acquired write lock on state");

                    let start = std::time::Instant::now();
                    let effects = self.reducer.reduce(&mut *state, action.clone(), &self.environment);
                    metrics::histogram!("store.reducer.duration_seconds")
                        .record(start.elapsed().as_secs_f64());

                    tracing::trace!("Reducer completed, returned {} effects", effects.len());
                    effects
                };

                // No subscribers is fine
                let _ = self.action_broadcast.send(action);

                for effect in effects {
                    for produced in execute_effect(effect).await {
                        tracing::trace!("Effect produced an action, queueing");
                        pending.push_back((produced, depth + 1));
                    }
                }
            }

            tracing::debug!("Action processing completed");
            Ok(())
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let total = store.state(|s| s.todos.len()).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }

        /// Subscribe to every action the store applies
        ///
        /// This is the change notification for presentation layers: each
        /// received action has already been reduced into state, and its
        /// effects run after it is published.
        #[must_use]
        pub fn subscribe(&self) -> broadcast::Receiver<A> {
            self.action_broadcast.subscribe()
        }

        /// The configuration this store was built with
        #[must_use]
        pub const fn config(&self) -> &StoreConfig {
            &self.config
        }
    }

    /// Run one effect to completion, returning the actions it produced.
    fn execute_effect<A>(effect: Effect<A>) -> BoxFuture<'static, Vec<A>>
    where
        A: Send + 'static,
    {
        async move {
            match effect {
                Effect::None => {
                    tracing::trace!("Executing Effect::None (no-op)");
                    metrics::counter!("store.effects.executed", "type" => "none").increment(1);
                    Vec::new()
                },
                Effect::Future(fut) => {
                    tracing::trace!("Executing Effect::Future");
                    metrics::counter!("store.effects.executed", "type" => "future").increment(1);
                    fut.await.into_iter().collect()
                },
                Effect::Parallel(effects) => {
                    tracing::trace!("Executing Effect::Parallel with {} effects", effects.len());
                    metrics::counter!("store.effects.executed", "type" => "parallel").increment(1);
                    futures::future::join_all(effects.into_iter().map(execute_effect))
                        .await
                        .into_iter()
                        .flatten()
                        .collect()
                },
                Effect::Sequential(effects) => {
                    tracing::trace!("Executing Effect::Sequential with {} effects", effects.len());
                    metrics::counter!("store.effects.executed", "type" => "sequential").increment(1);
                    let mut produced = Vec::new();
                    for effect in effects {
                        produced.extend(execute_effect(effect).await);
                    }
                    produced
                },
            }
        }
        .boxed()
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone,
        E: Clone,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                dispatch: Arc::clone(&self.dispatch),
                reducer: self.reducer.clone(),
                environment: self.environment.clone(),
                config: self.config,
                action_broadcast: self.action_broadcast.clone(),
            }
        }
    }
}

// Re-export for convenience
pub use store::Store;

#[cfg(test)]
mod tests {
    use super::*;
    use statekit_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
    use std::sync::Mutex as StdMutex;

    #[derive(Debug, Clone)]
    struct TestState {
        value: i32,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum TestAction {
        Increment,
        Decrement,
        NoOp,
        ProduceEffect,
        ProduceParallelEffects,
        ProduceSequentialEffects,
        Record,
        Forever,
    }

    #[derive(Debug, Clone, Default)]
    struct TestEnv {
        log: Arc<StdMutex<Vec<i32>>>,
    }

    #[derive(Debug, Clone)]
    struct TestReducer;

    impl Reducer for TestReducer {
        type State = TestState;
        type Action = TestAction;
        type Environment = TestEnv;

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                TestAction::Increment => {
                    state.value += 1;
                    smallvec![Effect::None]
                },
                TestAction::Decrement => {
                    state.value -= 1;
                    smallvec![Effect::None]
                },
                TestAction::NoOp => smallvec![Effect::None],
                TestAction::ProduceEffect => {
                    smallvec![Effect::future(async { Some(TestAction::Increment) })]
                },
                TestAction::ProduceParallelEffects => smallvec![Effect::merge(vec![
                    Effect::future(async { Some(TestAction::Increment) }),
                    Effect::future(async { Some(TestAction::Increment) }),
                    Effect::future(async { Some(TestAction::Increment) }),
                ])],
                TestAction::ProduceSequentialEffects => smallvec![Effect::chain(vec![
                    Effect::future(async { Some(TestAction::Increment) }),
                    Effect::future(async { Some(TestAction::Increment) }),
                    Effect::future(async { Some(TestAction::Decrement) }),
                ])],
                TestAction::Record => {
                    let log = Arc::clone(&env.log);
                    let value = state.value;
                    smallvec![Effect::future(async move {
                        log.lock().unwrap().push(value);
                        None
                    })]
                },
                TestAction::Forever => {
                    smallvec![Effect::future(async { Some(TestAction::Forever) })]
                },
            }
        }
    }

    fn store() -> Store<TestState, TestAction, TestEnv, TestReducer> {
        Store::new(TestState { value: 0 }, TestReducer, TestEnv::default())
    }

    #[tokio::test]
    async fn test_store_creation() {
        let store = store();

        let value = store.state(|s| s.value).await;
        assert_eq!(value, 0);
    }

    #[tokio::test]
    async fn test_multiple_actions() {
        let store = store();

        store.send(TestAction::Increment).await.unwrap();
        store.send(TestAction::Increment).await.unwrap();
        store.send(TestAction::Decrement).await.unwrap();

        assert_eq!(store.state(|s| s.value).await, 1);
    }

    #[tokio::test]
    async fn test_effect_none() {
        let store = store();

        store.send(TestAction::NoOp).await.unwrap();
        assert_eq!(store.state(|s| s.value).await, 0);
    }

    #[tokio::test]
    async fn test_effect_future_completes_before_send_returns() {
        let store = store();

        store.send(TestAction::ProduceEffect).await.unwrap();

        // No sleep: feedback actions are reduced inside send
        assert_eq!(store.state(|s| s.value).await, 1);
    }

    #[tokio::test]
    async fn test_effect_parallel() {
        let store = store();

        store.send(TestAction::ProduceParallelEffects).await.unwrap();
        assert_eq!(store.state(|s| s.value).await, 3);
    }

    #[tokio::test]
    async fn test_effect_sequential() {
        let store = store();

        store.send(TestAction::ProduceSequentialEffects).await.unwrap();
        assert_eq!(store.state(|s| s.value).await, 1);
    }

    #[tokio::test]
    async fn test_effects_see_state_in_dispatch_order() {
        let env = TestEnv::default();
        let store = Store::new(TestState { value: 0 }, TestReducer, env.clone());

        for _ in 0..3 {
            store.send(TestAction::Increment).await.unwrap();
            store.send(TestAction::Record).await.unwrap();
        }

        assert_eq!(*env.log.lock().unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_feedback_limit() {
        let config = StoreConfig::default().with_max_feedback_depth(4);
        let store = Store::with_config(TestState { value: 0 }, TestReducer, TestEnv::default(), config);

        let result = store.send(TestAction::Forever).await;
        assert_eq!(result, Err(StoreError::FeedbackLimitExceeded(4)));
    }

    #[tokio::test]
    async fn test_subscribers_see_applied_actions() {
        let store = store();
        let mut changes = store.subscribe();

        store.send(TestAction::ProduceEffect).await.unwrap();

        assert_eq!(changes.recv().await.unwrap(), TestAction::ProduceEffect);
        assert_eq!(changes.recv().await.unwrap(), TestAction::Increment);
    }

    #[tokio::test]
    async fn test_concurrent_sends_are_serialized() {
        let store = store();

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.send(TestAction::Increment).await })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.state(|s| s.value).await, 10);
    }

    #[test]
    fn test_config_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.broadcast_capacity, 16);
        assert_eq!(config.max_feedback_depth, 32);
        assert_eq!(StoreConfig::new(16, 32), config);
    }
}
