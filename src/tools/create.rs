/// Tool for writing a new journal entry
///
/// This module implements the journal_create MCP tool.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::Deserialize;

use crate::domain::JournalEntry;
use crate::engine::StreakEngine;
use crate::storage::{JournalStorage, StorageError};
use crate::tools::{plural, EntryWriteResponse, JournalError};

/// Parameters for creating a journal entry
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateEntryParams {
    pub username: String,
    /// Day the entry is for (YYYY-MM-DD); defaults to today
    #[serde(default)]
    pub date: Option<NaiveDate>,
    pub content: String,
    #[serde(default)]
    pub is_private: bool,
}

/// Create the first entry for a day and recompute the writer's streaks
///
/// Blank content, future dates and a second entry for the same day are
/// rejected. The entry and the refreshed summary commit together.
pub fn create_entry<S: JournalStorage>(
    storage: &S,
    engine: &StreakEngine,
    params: CreateEntryParams,
) -> Result<EntryWriteResponse, JournalError> {
    let today = engine.today();
    let date = params.date.unwrap_or(today);
    let user = storage.get_user_by_username(&params.username)?;

    let outcome = storage.transaction(|s| -> Result<_, JournalError> {
        if s.find_entry(&user.id, date)?.is_some() {
            return Err(StorageError::DuplicateEntry {
                user: user.username.clone(),
                date: date.to_string(),
            }
            .into());
        }

        let entry = JournalEntry::new(user.id.clone(), date, params.content, params.is_private, today)?;
        s.create_entry(&entry)?;
        let summary = engine.recompute(s, &user.id)?;
        Ok((entry, summary))
    });
    let (entry, summary) = outcome?;

    tracing::info!("{} wrote {} words for {}", user.username, entry.word_count, date);

    Ok(EntryWriteResponse {
        success: true,
        message: format!(
            "📝 Saved entry for {} ({} word{}). Current streak: {} day{}",
            date,
            entry.word_count,
            plural(entry.word_count),
            summary.current_streak,
            plural(summary.current_streak)
        ),
        entry: Some(entry),
        summary,
    })
}
