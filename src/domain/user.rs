/// User aggregate and its streak summary
///
/// The summary fields mirror state derived from the user's journal entries.
/// Only the aggregate updater writes them.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use crate::domain::{UserId, DomainError};

/// Derived per-user statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserSummary {
    pub current_streak: u32,
    pub highest_streak: u32,
    /// Calendar year the stored highest streak belongs to, if any was recorded
    pub highest_streak_year: Option<i32>,
    pub total_words: u64,
    pub total_entries: u32,
}

/// A registered journal writer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub summary: UserSummary,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with an empty summary
    pub fn new(username: String) -> Result<Self, DomainError> {
        let username = username.trim().to_string();
        Self::validate_username(&username)?;

        let now = Utc::now();
        Ok(Self {
            id: UserId::new(),
            username,
            summary: UserSummary::default(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Create a user from existing data (used when loading from database)
    pub fn from_existing(
        id: UserId,
        username: String,
        summary: UserSummary,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            username,
            summary,
            created_at,
            updated_at,
        }
    }

    /// 3 to 30 characters of ASCII letters, digits, `_` or `-`
    pub fn validate_username(username: &str) -> Result<(), DomainError> {
        let len = username.chars().count();
        if !(3..=30).contains(&len) {
            return Err(DomainError::InvalidUsername(
                "Username must be between 3 and 30 characters".to_string()
            ));
        }

        if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(DomainError::InvalidUsername(format!(
                "Username '{}' may only contain letters, digits, '_' and '-'",
                username
            )));
        }

        Ok(())
    }
}
