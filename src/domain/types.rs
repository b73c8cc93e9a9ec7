/// Core identifier and configuration types used throughout the domain layer
///
/// This module defines the ID wrappers for users and journal entries, plus the
/// policy enums that decide how streaks are scoped and when they are refreshed.

use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a user
///
/// This is a wrapper around UUID to provide type safety - you can't accidentally
/// pass a user ID where an entry ID is expected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a user ID from a string (useful for database loading)
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique identifier for a journal entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(pub Uuid);

impl EntryId {
    /// Generate a new random entry ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an entry ID from a string
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Which part of the entry history the highest streak is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HighestStreakScope {
    /// Longest run anywhere in the user's history
    #[default]
    AllTime,
    /// Longest run ending within today's calendar year; resets every January 1st
    CalendarYear,
}

impl FromStr for HighestStreakScope {
    type Err = crate::domain::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all-time" | "all_time" | "alltime" => Ok(Self::AllTime),
            "calendar-year" | "calendar_year" | "year" => Ok(Self::CalendarYear),
            other => Err(crate::domain::DomainError::Validation {
                message: format!(
                    "Invalid highest streak scope '{}'. Valid options: all-time, calendar-year",
                    other
                ),
            }),
        }
    }
}

/// When stored streak values are recomputed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RefreshPolicy {
    /// Recompute on every entry mutation and again whenever a profile is read,
    /// so a streak broken overnight shows as 0 without waiting for a new write
    #[default]
    OnRead,
    /// Recompute only when entries change; profile reads return stored values
    OnMutation,
}

impl FromStr for RefreshPolicy {
    type Err = crate::domain::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "on-read" | "on_read" | "read" => Ok(Self::OnRead),
            "on-mutation" | "on_mutation" | "mutation" => Ok(Self::OnMutation),
            other => Err(crate::domain::DomainError::Validation {
                message: format!(
                    "Invalid refresh policy '{}'. Valid options: on-read, on-mutation",
                    other
                ),
            }),
        }
    }
}

/// Combined streak configuration handed to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreakPolicy {
    pub highest_scope: HighestStreakScope,
    pub refresh: RefreshPolicy,
}

/// Source of "today" for streak calculations
///
/// Streaks are evaluated against the server-local calendar day. Tests pin the
/// day with `Clock::Fixed` so date arithmetic is deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Clock {
    #[default]
    System,
    Fixed(NaiveDate),
}

impl Clock {
    /// The current calendar day in server-local time
    pub fn today(&self) -> NaiveDate {
        match self {
            Clock::System => Local::now().date_naive(),
            Clock::Fixed(date) => *date,
        }
    }
}
