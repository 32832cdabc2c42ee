//! Reducer logic for the todo list.
//!
//! [`apply`] is the pure list transition. [`TodoReducer`] wraps it for the
//! store runtime and describes the write-through persistence effect.

use crate::codec::{self, STORAGE_KEY};
use crate::types::{TodoAction, TodoItem, TodoState};
use statekit_core::{effect::Effect, reducer::Reducer, smallvec, storage::BlobStore, SmallVec};
use std::marker::PhantomData;
use std::sync::Arc;

/// Apply `action` to `todos`, returning the new list.
///
/// Deterministic: equal inputs give equal outputs. Removing or toggling an
/// id that is not in the list returns the list unchanged. Survivors keep
/// their relative order.
#[must_use]
pub fn apply(todos: &[TodoItem], action: &TodoAction) -> Vec<TodoItem> {
    match action {
        TodoAction::AddTodo(item) => {
            let mut next = todos.to_vec();
            next.push(item.clone());
            next
        },
        TodoAction::RemoveTodo(id) => todos.iter().filter(|todo| todo.id != *id).cloned().collect(),
        TodoAction::ToggleTodo(id) => todos
            .iter()
            .map(|todo| {
                let mut todo = todo.clone();
                if todo.id == *id {
                    todo.done = !todo.done;
                }
                todo
            })
            .collect(),
    }
}

/// Environment dependencies for the todo reducer
pub struct TodoEnvironment<B> {
    /// Where the list is persisted
    pub storage: Arc<B>,
}

impl<B> TodoEnvironment<B> {
    /// Creates a new `TodoEnvironment`
    #[must_use]
    pub fn new(storage: B) -> Self {
        Self {
            storage: Arc::new(storage),
        }
    }
}

impl<B> Clone for TodoEnvironment<B> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
        }
    }
}

/// Reducer for the todo list
///
/// Generic over the blob store so any backend can be injected.
#[derive(Debug)]
pub struct TodoReducer<B> {
    _phantom: PhantomData<fn() -> B>,
}

impl<B> TodoReducer<B> {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<B> Default for TodoReducer<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B> Clone for TodoReducer<B> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<B: BlobStore + 'static> Reducer for TodoReducer<B> {
    type State = TodoState;
    type Action = TodoAction;
    type Environment = TodoEnvironment<B>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        state.todos = apply(&state.todos, &action);
        tracing::debug!(total = state.todos.len(), "Todo list updated");

        // Write-through: every action persists the full list once
        smallvec![persist(&env.storage, &state.todos)]
    }
}

/// Effect that overwrites the stored list with `todos`.
fn persist<B: BlobStore + 'static>(storage: &Arc<B>, todos: &[TodoItem]) -> Effect<TodoAction> {
    let payload = match codec::encode(todos) {
        Ok(payload) => payload,
        Err(error) => {
            tracing::error!(%error, "Could not encode todo list; skipping write");
            return Effect::None;
        },
    };
    let storage = Arc::clone(storage);

    Effect::future(async move {
        match storage.save(STORAGE_KEY, &payload).await {
            Ok(()) => tracing::trace!(key = STORAGE_KEY, bytes = payload.len(), "Todo list persisted"),
            Err(error) => tracing::error!(%error, key = STORAGE_KEY, "Failed to persist todo list"),
        }
        None
    })
}
