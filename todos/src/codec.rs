//! Text encoding of the persisted todo list.
//!
//! The blob under [`STORAGE_KEY`] is a JSON array of
//! `{"id": <number or string>, "text": <string>, "done": <bool>}` objects.
//! Key order and extra whitespace do not matter on decode.
//!
//! Older blobs that name the text field `description` still decode, but
//! [`encode`] always writes `text`. Migration is one-way: the first write
//! after loading a legacy blob replaces it with the current layout.

use crate::types::TodoItem;

/// Fixed key the todo list is persisted under
pub const STORAGE_KEY: &str = "todos";

/// Error type for todo list encoding
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The text is not a todo list
    #[error("Malformed todo list: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Encode a todo list as stored text.
///
/// # Errors
///
/// Returns [`CodecError`] if serialization fails.
pub fn encode(todos: &[TodoItem]) -> Result<String, CodecError> {
    Ok(serde_json::to_string(todos)?)
}

/// Decode stored text into a todo list. A stored `null` is an empty list.
///
/// Accepts the legacy `description` field in place of `text`.
///
/// # Errors
///
/// Returns [`CodecError::Malformed`] when the text is not a todo list.
pub fn decode(text: &str) -> Result<Vec<TodoItem>, CodecError> {
    let todos: Option<Vec<TodoItem>> = serde_json::from_str(text)?;
    Ok(todos.unwrap_or_default())
}
