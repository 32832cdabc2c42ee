//! # Statekit Todos
//!
//! A todo list state holder persisted to a key-value blob store.
//!
//! - [`apply`] is the pure `(list, action) → list` transition
//! - [`TodoReducer`] runs it inside the store runtime and persists the result
//! - [`TodoStore`] is the async handle: add, delete, toggle, counts
//!
//! The list is written through on every action under the fixed key
//! [`STORAGE_KEY`] as a JSON array, and reloaded by [`TodoStore::initialize`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use statekit_core::environment::{SystemClock, TimestampIdGenerator};
//! use statekit_runtime::FileBlobStore;
//! use statekit_todos::TodoStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let todos = TodoStore::initialize(
//!     FileBlobStore::new("./state"),
//!     TimestampIdGenerator::new(SystemClock),
//! )
//! .await;
//!
//! let id = todos.add_todo("Buy milk").await?;
//! todos.toggle_todo(id).await?;
//!
//! let counts = todos.counts().await;
//! println!("{} todos, {} pending", counts.total, counts.pending);
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod reducer;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use codec::{CodecError, STORAGE_KEY};
pub use reducer::{apply, TodoEnvironment, TodoReducer};
pub use store::TodoStore;
pub use types::{TodoAction, TodoCounts, TodoId, TodoItem, TodoState};
