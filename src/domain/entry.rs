/// JournalEntry entity for a single day of writing
///
/// This module defines the JournalEntry struct that represents what a user wrote
/// on one calendar day, together with its word count and privacy flag.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use crate::domain::{EntryId, UserId, DomainError};

/// Longest body accepted for a single day's entry
pub const MAX_CONTENT_CHARS: usize = 100_000;

/// A user's journal entry for one calendar day
///
/// There is at most one entry per (user, date). Blank entries are never kept:
/// an update that empties the content deletes the row instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Unique identifier for this entry
    pub id: EntryId,
    /// Who wrote this entry
    pub user_id: UserId,
    /// Which calendar day this entry is for
    pub date: NaiveDate,
    /// The text body
    pub content: String,
    /// Whitespace-delimited token count of `content`
    pub word_count: u32,
    /// Whether only the owner may read this entry
    pub is_private: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JournalEntry {
    /// Create a new entry with validation
    ///
    /// `today` is the server-local calendar day; entries for later days are
    /// rejected so that they can never anchor a streak.
    pub fn new(
        user_id: UserId,
        date: NaiveDate,
        content: String,
        is_private: bool,
        today: NaiveDate,
    ) -> Result<Self, DomainError> {
        validate_date(date, today)?;
        validate_content(&content)?;
        if is_blank(&content) {
            return Err(DomainError::InvalidContent(
                "Cannot create an empty journal entry".to_string()
            ));
        }

        let now = Utc::now();
        Ok(Self {
            id: EntryId::new(),
            user_id,
            date,
            word_count: count_words(&content),
            content,
            is_private,
            created_at: now,
            updated_at: now,
        })
    }

    /// Create an entry from existing data (used when loading from database)
    #[allow(clippy::too_many_arguments)]
    pub fn from_existing(
        id: EntryId,
        user_id: UserId,
        date: NaiveDate,
        content: String,
        word_count: u32,
        is_private: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            date,
            content,
            word_count,
            is_private,
            created_at,
            updated_at,
        }
    }

    /// Replace the body and privacy flag, recounting words
    ///
    /// Blank content is accepted here; the caller decides to delete the entry.
    pub fn revise(&mut self, content: String, is_private: bool) -> Result<(), DomainError> {
        validate_content(&content)?;
        self.word_count = count_words(&content);
        self.content = content;
        self.is_private = is_private;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Whether this entry counts toward streaks
    pub fn is_qualifying(&self) -> bool {
        !is_blank(&self.content)
    }
}

/// Count whitespace-delimited tokens
pub fn count_words(content: &str) -> u32 {
    content.split_whitespace().count() as u32
}

/// Empty or whitespace-only content is treated as "no entry"
pub fn is_blank(content: &str) -> bool {
    content.trim().is_empty()
}

/// Reject days after `today`
pub fn validate_date(date: NaiveDate, today: NaiveDate) -> Result<(), DomainError> {
    if date > today {
        return Err(DomainError::InvalidDate(format!(
            "Cannot write journal entries for future dates ({} is after {})",
            date, today
        )));
    }
    Ok(())
}

fn validate_content(content: &str) -> Result<(), DomainError> {
    if content.chars().count() > MAX_CONTENT_CHARS {
        return Err(DomainError::InvalidContent(format!(
            "Content cannot be longer than {} characters",
            MAX_CONTENT_CHARS
        )));
    }
    Ok(())
}
