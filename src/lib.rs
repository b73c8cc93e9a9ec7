/// Public library interface for the Journal Streaks MCP server
///
/// This module exports the main server implementation and public types
/// that can be used by other applications or tests.

use std::path::PathBuf;
use thiserror::Error;

// Internal modules
mod domain;
mod storage;

pub mod engine;
pub mod mcp;
pub mod tools;

// Re-export public modules and types
pub use domain::*;
pub use engine::StreakEngine;
pub use storage::{JournalStorage, QualifyingEntry, SqliteStorage, StorageError};
pub use tools::JournalError;

/// Errors that can occur during server operation
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Database error: {0}")]
    Database(#[from] storage::StorageError),

    #[error("Journal error: {0}")]
    Journal(#[from] tools::JournalError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Main journal server that implements the MCP protocol
///
/// This server keeps users and their daily entries in a SQLite database and
/// keeps every writer's streaks and totals in step with their entries.
pub struct JournalServer {
    storage: SqliteStorage,
    engine: StreakEngine,
}

impl JournalServer {
    /// Create a new journal server with the specified database path
    ///
    /// This will initialize the SQLite database with the required schema
    /// if it doesn't already exist.
    pub async fn new(db_path: PathBuf, policy: StreakPolicy) -> Result<Self, ServerError> {
        tracing::info!("Initializing journal server with database: {:?}", db_path);

        let storage = SqliteStorage::new(db_path)?;
        Ok(Self::with_engine(storage, StreakEngine::new(policy)))
    }

    /// In-memory server, mostly for tests and dry runs
    pub fn in_memory(policy: StreakPolicy, clock: Clock) -> Result<Self, ServerError> {
        let storage = SqliteStorage::open_in_memory()?;
        Ok(Self::with_engine(storage, StreakEngine::with_clock(policy, clock)))
    }

    pub fn with_engine(storage: SqliteStorage, engine: StreakEngine) -> Self {
        Self { storage, engine }
    }

    /// Run the MCP server, handling JSON-RPC requests over stdin/stdout
    ///
    /// This method will block until stdin is closed or an error occurs.
    pub async fn run(self) -> Result<(), ServerError> {
        let policy = self.engine.policy();
        tracing::info!(
            highest_scope = ?policy.highest_scope,
            refresh = ?policy.refresh,
            "Server started, today is {}",
            self.engine.today()
        );

        let mut mcp_server = mcp::McpServer::new(self);
        mcp_server.run().await?;

        Ok(())
    }

    /// Get a reference to the storage layer (useful for testing)
    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    /// Get a reference to the streak engine
    pub fn engine(&self) -> &StreakEngine {
        &self.engine
    }
}
