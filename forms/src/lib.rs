//! # Statekit Forms
//!
//! A form state holder: field values, per-field error messages and overall
//! validity, kept consistent on every change.
//!
//! - [`ValidatorRegistry`] maps field names to a [`ValidationRule`]
//! - [`FormReducer`] applies [`FormAction`]s and revalidates the whole form
//! - [`Form`] is the async handle a presentation layer drives
//!
//! A form built with an empty registry is a plain value holder that is
//! always valid.

pub mod form;
pub mod reducer;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use form::Form;
pub use reducer::{FormEnvironment, FormReducer};
pub use types::{fields, FieldValidation, FormAction, FormState, FormValues};
pub use validation::{ValidationRule, ValidatorRegistry, DEFAULT_MESSAGE};
