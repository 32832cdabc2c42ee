//! Domain types for the todo list.

use serde::{Deserialize, Serialize};

/// Unique identifier for a todo item
///
/// Stored lists may carry numeric or string ids; both are kept verbatim.
/// Ids minted by [`TodoStore`](crate::TodoStore) are always numeric.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TodoId {
    /// Numeric id, serialized as a bare number
    Int(u64),
    /// String id, serialized as a JSON string
    Text(String),
}

impl TodoId {
    /// Creates a numeric `TodoId`
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self::Int(id)
    }

    /// Creates a string `TodoId`
    #[must_use]
    pub fn text(id: impl Into<String>) -> Self {
        Self::Text(id.into())
    }

    /// Numeric value, if this is a numeric id
    #[must_use]
    pub const fn as_int(&self) -> Option<u64> {
        match self {
            Self::Int(id) => Some(*id),
            Self::Text(_) => None,
        }
    }
}

impl From<u64> for TodoId {
    fn from(id: u64) -> Self {
        Self::Int(id)
    }
}

impl From<&str> for TodoId {
    fn from(id: &str) -> Self {
        Self::text(id)
    }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

/// A single todo item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    /// Unique identifier
    pub id: TodoId,
    /// What needs doing
    #[serde(alias = "description")]
    pub text: String,
    /// Whether the todo is done
    pub done: bool,
}

impl TodoItem {
    /// Creates a pending todo item
    #[must_use]
    pub fn new(id: TodoId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            done: false,
        }
    }
}

/// Summary counts over a todo list
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoCounts {
    /// Number of items
    pub total: usize,
    /// Items not yet done
    pub pending: usize,
}

/// State of the todo list
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoState {
    /// Items in insertion order
    pub todos: Vec<TodoItem>,
}

impl TodoState {
    /// State holding `todos`
    #[must_use]
    pub const fn new(todos: Vec<TodoItem>) -> Self {
        Self { todos }
    }

    /// Total and pending counts
    #[must_use]
    pub fn counts(&self) -> TodoCounts {
        TodoCounts {
            total: self.todos.len(),
            pending: self.todos.iter().filter(|todo| !todo.done).count(),
        }
    }

    /// Returns a todo by ID
    #[must_use]
    pub fn get(&self, id: &TodoId) -> Option<&TodoItem> {
        self.todos.iter().find(|todo| todo.id == *id)
    }

    /// Checks if a todo exists
    #[must_use]
    pub fn exists(&self, id: &TodoId) -> bool {
        self.get(id).is_some()
    }

    /// Largest numeric id in the list
    #[must_use]
    pub fn max_int_id(&self) -> Option<u64> {
        self.todos.iter().filter_map(|todo| todo.id.as_int()).max()
    }
}

/// Actions accepted by the todo reducer
///
/// The serialized form is `{"type": "[TODO] ...", "payload": ...}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum TodoAction {
    /// Append a fully constructed item
    #[serde(rename = "[TODO] Add Todo")]
    AddTodo(TodoItem),

    /// Remove the item with this id, if present
    #[serde(rename = "[TODO] Remove Todo")]
    RemoveTodo(TodoId),

    /// Flip `done` on the item with this id, if present
    #[serde(rename = "[TODO] Toggle Todo")]
    ToggleTodo(TodoId),
}
