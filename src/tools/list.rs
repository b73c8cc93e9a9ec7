/// Tools for reading journal entries
///
/// This module implements the journal_get and journal_heatmap MCP tools.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, JournalEntry};
use crate::storage::{JournalStorage, StorageError};
use crate::tools::JournalError;

/// Parameters for reading a single entry
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetEntryParams {
    /// Owner of the entry
    pub username: String,
    /// Day of the entry (YYYY-MM-DD)
    pub date: NaiveDate,
    /// Who is asking; private entries are only returned to their owner
    #[serde(default)]
    pub viewer: Option<String>,
}

/// Parameters for the writing heatmap
#[derive(Debug, Deserialize, JsonSchema)]
pub struct HeatmapParams {
    pub username: String,
    /// Restrict to one calendar year; all history when omitted
    #[serde(default)]
    pub year: Option<i32>,
}

/// One cell of the heatmap
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapDay {
    pub date: NaiveDate,
    pub word_count: u32,
}

/// Response from the heatmap tool
#[derive(Debug, Serialize)]
pub struct HeatmapResponse {
    pub username: String,
    pub year: Option<i32>,
    pub days: Vec<HeatmapDay>,
    pub message: String,
}

/// Read one day's entry, honouring its privacy flag
pub fn get_entry<S: JournalStorage>(
    storage: &S,
    params: GetEntryParams,
) -> Result<JournalEntry, JournalError> {
    let user = storage.get_user_by_username(&params.username)?;
    let entry = storage
        .find_entry(&user.id, params.date)?
        .ok_or_else(|| StorageError::EntryNotFound {
            user: user.username.clone(),
            date: params.date.to_string(),
        })?;

    if entry.is_private && params.viewer.as_deref() != Some(user.username.as_str()) {
        return Err(JournalError::PrivateEntry {
            date: params.date.to_string(),
        });
    }

    Ok(entry)
}

/// Daily word counts, ascending by date
pub fn get_heatmap<S: JournalStorage>(
    storage: &S,
    params: HeatmapParams,
) -> Result<HeatmapResponse, JournalError> {
    let user = storage.get_user_by_username(&params.username)?;

    let (start, end) = match params.year {
        Some(year) => {
            let bounds = NaiveDate::from_ymd_opt(year, 1, 1).zip(NaiveDate::from_ymd_opt(year, 12, 31));
            let (start, end) = bounds.ok_or_else(|| DomainError::Validation {
                message: format!("Year {} is out of range", year),
            })?;
            (Some(start), Some(end))
        }
        None => (None, None),
    };

    let days: Vec<HeatmapDay> = storage
        .list_entries(&user.id, start, end)?
        .into_iter()
        .map(|entry| HeatmapDay {
            date: entry.date,
            word_count: entry.word_count,
        })
        .collect();

    let total_words: u64 = days.iter().map(|d| u64::from(d.word_count)).sum();
    let message = match params.year {
        Some(year) => format!("📅 {} wrote on {} day(s) in {}, {} words in total", user.username, days.len(), year, total_words),
        None => format!("📅 {} wrote on {} day(s), {} words in total", user.username, days.len(), total_words),
    };

    Ok(HeatmapResponse {
        username: user.username,
        year: params.year,
        days,
        message,
    })
}
