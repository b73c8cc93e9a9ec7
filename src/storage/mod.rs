/// Storage layer for persisting journal data
///
/// This module handles all database operations using SQLite. It provides
/// a clean interface for storing users, their journal entries and the
/// per-user streak summary.

pub mod sqlite;
pub mod migrations;

// Re-export the main storage types
pub use sqlite::*;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::domain::{JournalEntry, User, UserId, UserSummary};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("User not found: {user}")]
    UserNotFound { user: String },

    #[error("Journal entry not found: {user} has no entry for {date}")]
    EntryNotFound { user: String, date: String },

    #[error("Username already taken: {username}")]
    DuplicateUser { username: String },

    #[error("Duplicate entry: {user} already has an entry for {date}")]
    DuplicateEntry { user: String, date: String },

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Invalid stored data: {0}")]
    InvalidData(String),
}

/// The slice of an entry the aggregate updater needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualifyingEntry {
    pub date: NaiveDate,
    pub word_count: u32,
}

/// Trait defining the storage interface for journals
///
/// This trait allows us to swap out SQLite for other databases (or test
/// doubles) while keeping the same interface.
pub trait JournalStorage {
    /// Create a new user
    fn create_user(&self, user: &User) -> Result<(), StorageError>;

    /// Get a user by ID
    fn get_user(&self, user_id: &UserId) -> Result<User, StorageError>;

    /// Get a user by username
    fn get_user_by_username(&self, username: &str) -> Result<User, StorageError>;

    /// Create a new journal entry; fails if the user already has one that day
    fn create_entry(&self, entry: &JournalEntry) -> Result<(), StorageError>;

    /// Find the user's entry for a day, if any
    fn find_entry(
        &self,
        user_id: &UserId,
        date: NaiveDate,
    ) -> Result<Option<JournalEntry>, StorageError>;

    /// Update content, word count and privacy of an existing entry
    fn update_entry(&self, entry: &JournalEntry) -> Result<(), StorageError>;

    /// Delete the user's entry for a day
    fn delete_entry(&self, user_id: &UserId, date: NaiveDate) -> Result<(), StorageError>;

    /// List entries in ascending date order, optionally bounded (inclusive)
    fn list_entries(
        &self,
        user_id: &UserId,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<JournalEntry>, StorageError>;

    /// Every entry with non-blank content, ascending by date
    fn qualifying_entries(&self, user_id: &UserId) -> Result<Vec<QualifyingEntry>, StorageError>;

    /// Get the stored summary for a user
    fn get_summary(&self, user_id: &UserId) -> Result<UserSummary, StorageError>;

    /// Overwrite the stored summary for a user
    fn write_summary(&self, user_id: &UserId, summary: &UserSummary) -> Result<(), StorageError>;

    /// Run `f` atomically: every write it performs commits together or not at all
    fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Self) -> Result<T, E>,
        E: From<StorageError>,
        Self: Sized;
}
