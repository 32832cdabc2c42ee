//! # Statekit Testing
//!
//! Testing utilities and helpers for statekit.
//!
//! This crate provides:
//! - Mock implementations of Environment traits
//! - A Given-When-Then harness for reducers ([`ReducerTest`])
//! - Assertion helpers for effects
//! - Tracing setup for test output
//!
//! ## Example
//!
//! ```ignore
//! use statekit_testing::{InMemoryBlobStore, SequentialIdGenerator};
//!
//! #[tokio::test]
//! async fn adds_a_todo() {
//!     let storage = InMemoryBlobStore::new();
//!     let todos = TodoStore::initialize(storage.clone(), SequentialIdGenerator::new()).await;
//!
//!     todos.add_todo("buy milk").await?;
//!     assert_eq!(storage.writes(), 1);
//! }
//! ```

use chrono::{DateTime, Utc};
use statekit_core::environment::{Clock, IdGenerator};

/// Given-When-Then harness for reducers
pub mod reducer_test;

pub use reducer_test::{assertions, ReducerTest};

/// Mock implementations of Environment traits
pub mod mocks {
    #![allow(clippy::unwrap_used)] // Poisoned test mutexes should fail loudly

    use super::{Clock, DateTime, IdGenerator, Utc};
    use statekit_core::storage::{BlobStore, Result, StorageError};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
    use std::sync::{Arc, RwLock};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use statekit_testing::mocks::FixedClock;
    /// use statekit_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// Predictable ids: 1, 2, 3, ...
    ///
    /// Clones share the counter.
    #[derive(Debug, Clone, Default)]
    pub struct SequentialIdGenerator {
        last: Arc<AtomicU64>,
    }

    impl SequentialIdGenerator {
        /// Starts at 1
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Next id will be `first`
        #[must_use]
        pub fn starting_at(first: u64) -> Self {
            Self {
                last: Arc::new(AtomicU64::new(first.saturating_sub(1))),
            }
        }
    }

    impl IdGenerator for SequentialIdGenerator {
        fn next_id(&self) -> u64 {
            self.last.fetch_add(1, Ordering::SeqCst) + 1
        }

        fn advance_past(&self, id: u64) {
            self.last.fetch_max(id, Ordering::SeqCst);
        }
    }

    /// In-memory blob store for fast, deterministic testing.
    ///
    /// Clones share the same data, so a test can keep one handle for
    /// inspection while the code under test owns another. Counts every
    /// successful `save`.
    ///
    /// # Example
    ///
    /// ```
    /// use statekit_testing::InMemoryBlobStore;
    /// use statekit_core::storage::BlobStore;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let store = InMemoryBlobStore::new();
    /// store.save("todos", "[]").await?;
    ///
    /// assert_eq!(store.get("todos").await?.as_deref(), Some("[]"));
    /// assert_eq!(store.writes(), 1);
    /// # Ok(())
    /// # }
    /// ```
    #[derive(Clone, Debug, Default)]
    pub struct InMemoryBlobStore {
        data: Arc<RwLock<HashMap<String, String>>>,
        writes: Arc<AtomicUsize>,
        fail_writes: Arc<AtomicBool>,
    }

    impl InMemoryBlobStore {
        /// Create a new empty in-memory blob store
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Create a store already holding `data` under `key`
        #[must_use]
        pub fn with_blob(key: &str, data: &str) -> Self {
            let store = Self::new();
            store.insert(key, data);
            store
        }

        /// Put a blob directly, bypassing the write counter
        pub fn insert(&self, key: &str, data: &str) {
            self.data
                .write()
                .unwrap()
                .insert(key.to_string(), data.to_string());
        }

        /// Current blob under `key`
        #[must_use]
        pub fn blob(&self, key: &str) -> Option<String> {
            self.data.read().unwrap().get(key).cloned()
        }

        /// Number of successful `save` calls
        #[must_use]
        pub fn writes(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }

        /// Make every subsequent `save` fail with [`StorageError::Backend`]
        pub fn fail_writes(&self, fail: bool) {
            self.fail_writes.store(fail, Ordering::SeqCst);
        }
    }

    impl BlobStore for InMemoryBlobStore {
        async fn get(&self, key: &str) -> Result<Option<String>> {
            Ok(self.blob(key))
        }

        async fn save(&self, key: &str, data: &str) -> Result<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StorageError::Backend("writes disabled".to_string()));
            }
            self.insert(key, data);
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }
}

/// Install a `tracing` subscriber that writes to the test harness output.
///
/// Honors `RUST_LOG`; defaults to `debug` for statekit crates. Safe to call
/// from every test.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("statekit=debug,warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use mocks::{test_clock, FixedClock, InMemoryBlobStore, SequentialIdGenerator};
