/// MCP tools for journaling
///
/// This module contains the tools that external MCP clients can call: user
/// registration, the entry mutation workflow (create, update, delete) and the
/// read paths (single entry, heatmap, streak status, profile). Every mutation
/// recomputes the writer's streak summary before returning.

pub mod create;
pub mod update;
pub mod list;
pub mod status;
pub mod user;

// Re-export tool functions for easy access
pub use create::*;
pub use update::*;
pub use list::*;
pub use status::*;
pub use user::*;

use serde::Serialize;
use thiserror::Error;

use crate::domain::{DomainError, JournalEntry, UserSummary};
use crate::mcp::protocol::error_codes;
use crate::storage::StorageError;

/// Errors returned by journal tools
#[derive(Error, Debug)]
pub enum JournalError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Journal entry for {date} is private")]
    PrivateEntry { date: String },
}

impl JournalError {
    /// JSON-RPC application error code for this failure
    pub fn error_code(&self) -> i32 {
        match self {
            JournalError::Storage(e) => match e {
                StorageError::UserNotFound { .. } => error_codes::USER_NOT_FOUND,
                StorageError::EntryNotFound { .. } => error_codes::ENTRY_NOT_FOUND,
                StorageError::DuplicateUser { .. } | StorageError::DuplicateEntry { .. } => {
                    error_codes::DUPLICATE
                }
                StorageError::Connection(_)
                | StorageError::Query(_)
                | StorageError::Migration(_)
                | StorageError::InvalidData(_) => error_codes::STORAGE_ERROR,
            },
            JournalError::Domain(_) => error_codes::VALIDATION_ERROR,
            JournalError::PrivateEntry { .. } => error_codes::PRIVATE_ENTRY,
        }
    }
}

/// Response from any entry mutation
#[derive(Debug, Serialize)]
pub struct EntryWriteResponse {
    pub success: bool,
    pub message: String,
    /// The stored entry, or `None` if the write removed it
    pub entry: Option<JournalEntry>,
    /// The writer's summary after recomputation
    pub summary: UserSummary,
}

fn plural(n: impl Into<u64>) -> &'static str {
    if n.into() == 1 { "" } else { "s" }
}
