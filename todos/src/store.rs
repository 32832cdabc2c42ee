//! `TodoStore`: the handle a presentation layer holds for the todo list.

use crate::codec::{self, STORAGE_KEY};
use crate::reducer::{TodoEnvironment, TodoReducer};
use crate::types::{TodoAction, TodoCounts, TodoId, TodoItem, TodoState};
use statekit_core::environment::IdGenerator;
use statekit_core::storage::BlobStore;
use statekit_runtime::{Store, StoreConfig, StoreError};
use std::sync::Arc;
use tokio::sync::broadcast;

/// A todo list persisted write-through to a [`BlobStore`].
///
/// Every mutating call dispatches one action and, before returning, writes
/// the whole list under [`STORAGE_KEY`]. Cloning yields another handle to
/// the same list.
///
/// # Example
///
/// ```
/// use statekit_core::environment::{SystemClock, TimestampIdGenerator};
/// use statekit_testing::InMemoryBlobStore;
/// use statekit_todos::TodoStore;
///
/// # async fn example() -> Result<(), statekit_runtime::StoreError> {
/// let todos = TodoStore::initialize(
///     InMemoryBlobStore::new(),
///     TimestampIdGenerator::new(SystemClock),
/// )
/// .await;
///
/// let id = todos.add_todo("buy milk").await?;
/// todos.toggle_todo(id).await?;
/// assert_eq!(todos.counts().await.pending, 0);
/// # Ok(())
/// # }
/// ```
pub struct TodoStore<B, I>
where
    B: BlobStore + 'static,
{
    store: Store<TodoState, TodoAction, TodoEnvironment<B>, TodoReducer<B>>,
    ids: Arc<I>,
}

impl<B, I> TodoStore<B, I>
where
    B: BlobStore + 'static,
    I: IdGenerator,
{
    /// Load the persisted list from `storage` and start from it
    ///
    /// A missing, unreadable or malformed blob starts an empty list.
    pub async fn initialize(storage: B, ids: I) -> Self {
        Self::with_config(storage, ids, StoreConfig::default()).await
    }

    /// [`initialize`](Self::initialize) with a custom store configuration
    pub async fn with_config(storage: B, ids: I, config: StoreConfig) -> Self {
        let state = TodoState::new(load(&storage).await);
        tracing::debug!(count = state.todos.len(), "Todo list loaded");

        if let Some(max) = state.max_int_id() {
            ids.advance_past(max);
        }

        Self {
            store: Store::with_config(
                state,
                TodoReducer::new(),
                TodoEnvironment::new(storage),
                config,
            ),
            ids: Arc::new(ids),
        }
    }

    /// Append a pending todo with a fresh id, returning the id
    ///
    /// The id never matches an item already in the list.
    ///
    /// # Errors
    ///
    /// Propagates [`StoreError`] from dispatch.
    pub async fn add_todo(&self, text: impl Into<String>) -> Result<TodoId, StoreError> {
        let id = self.fresh_id().await;
        self.store
            .send(TodoAction::AddTodo(TodoItem::new(id.clone(), text)))
            .await?;
        Ok(id)
    }

    /// Remove the todo with `id`; unknown ids are ignored
    ///
    /// # Errors
    ///
    /// Propagates [`StoreError`] from dispatch.
    pub async fn delete_todo(&self, id: TodoId) -> Result<(), StoreError> {
        self.store.send(TodoAction::RemoveTodo(id)).await
    }

    /// Flip `done` on the todo with `id`; unknown ids are ignored
    ///
    /// # Errors
    ///
    /// Propagates [`StoreError`] from dispatch.
    pub async fn toggle_todo(&self, id: TodoId) -> Result<(), StoreError> {
        self.store.send(TodoAction::ToggleTodo(id)).await
    }

    /// Total and pending counts
    pub async fn counts(&self) -> TodoCounts {
        self.store.state(TodoState::counts).await
    }

    /// Current list in insertion order
    pub async fn todos(&self) -> Vec<TodoItem> {
        self.store.state(|s| s.todos.clone()).await
    }

    /// The todo with `id`, if present
    pub async fn get(&self, id: &TodoId) -> Option<TodoItem> {
        self.store.state(|s| s.get(id).cloned()).await
    }

    /// Receive every action applied to this list
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TodoAction> {
        self.store.subscribe()
    }

    /// Draw ids until one is not in the list
    async fn fresh_id(&self) -> TodoId {
        loop {
            let id = TodoId::new(self.ids.next_id());
            if !self.store.state(|s| s.exists(&id)).await {
                return id;
            }
            tracing::debug!(%id, "Generated id already in use; drawing another");
        }
    }
}

impl<B, I> Clone for TodoStore<B, I>
where
    B: BlobStore + 'static,
{
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            ids: Arc::clone(&self.ids),
        }
    }
}

impl<B, I> std::fmt::Debug for TodoStore<B, I>
where
    B: BlobStore + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoStore").finish_non_exhaustive()
    }
}

/// Read and decode the stored list, treating any failure as "no data".
async fn load<B: BlobStore>(storage: &B) -> Vec<TodoItem> {
    let text = match storage.get(STORAGE_KEY).await {
        Ok(Some(text)) => text,
        Ok(None) => return Vec::new(),
        Err(error) => {
            tracing::warn!(%error, key = STORAGE_KEY, "Could not read stored todo list; starting empty");
            return Vec::new();
        },
    };

    codec::decode(&text).unwrap_or_else(|error| {
        tracing::warn!(%error, key = STORAGE_KEY, "Discarding malformed todo list; starting empty");
        Vec::new()
    })
}
