/// Domain module containing core business logic and data types
///
/// This module defines the core entities (User, JournalEntry) and the streak
/// calculator that derives writing streaks from a user's entry dates. These
/// types carry the validation rules of the journaling system.

pub mod user;
pub mod entry;
pub mod streak;
pub mod types;

// Re-export public types for easy access
pub use user::*;
pub use entry::*;
pub use streak::*;
pub use types::*;

use thiserror::Error;

/// Errors that can occur during domain operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid content: {0}")]
    InvalidContent(String),
}
