/// Tools for editing and removing journal entries
///
/// This module implements the journal_update and journal_delete MCP tools.
/// Saving blank content over an entry deletes it, so the stored entries are
/// always exactly the days that count toward streaks.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::Deserialize;

use crate::engine::StreakEngine;
use crate::storage::{JournalStorage, StorageError};
use crate::tools::{plural, EntryWriteResponse, JournalError};

/// Parameters for updating an existing journal entry
#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateEntryParams {
    pub username: String,
    /// Day of the entry to edit (YYYY-MM-DD)
    pub date: NaiveDate,
    /// New body; blank or whitespace-only content deletes the entry
    pub content: String,
    /// New privacy flag; keeps the current one when omitted
    #[serde(default)]
    pub is_private: Option<bool>,
}

/// Parameters for deleting a journal entry
#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteEntryParams {
    pub username: String,
    /// Day of the entry to delete (YYYY-MM-DD)
    pub date: NaiveDate,
}

/// Replace an entry's content and recompute the writer's streaks
pub fn update_entry<S: JournalStorage>(
    storage: &S,
    engine: &StreakEngine,
    params: UpdateEntryParams,
) -> Result<EntryWriteResponse, JournalError> {
    let user = storage.get_user_by_username(&params.username)?;
    let date = params.date;

    let outcome = storage.transaction(|s| -> Result<_, JournalError> {
        let mut entry = s.find_entry(&user.id, date)?.ok_or_else(|| StorageError::EntryNotFound {
            user: user.username.clone(),
            date: date.to_string(),
        })?;

        let is_private = params.is_private.unwrap_or(entry.is_private);
        entry.revise(params.content, is_private)?;

        if !entry.is_qualifying() {
            s.delete_entry(&user.id, date)?;
            let summary = engine.recompute(s, &user.id)?;
            return Ok((None, summary));
        }

        s.update_entry(&entry)?;
        let summary = engine.recompute(s, &user.id)?;
        Ok((Some(entry), summary))
    });
    let (entry, summary) = outcome?;

    let message = match &entry {
        Some(entry) => {
            tracing::info!("{} revised entry for {} ({} words)", user.username, date, entry.word_count);
            format!(
                "✏️ Updated entry for {} ({} word{}). Current streak: {} day{}",
                date,
                entry.word_count,
                plural(entry.word_count),
                summary.current_streak,
                plural(summary.current_streak)
            )
        }
        None => {
            tracing::info!("{} cleared entry for {}", user.username, date);
            format!(
                "🗑️ Entry for {} deleted due to empty content. Current streak: {} day{}",
                date,
                summary.current_streak,
                plural(summary.current_streak)
            )
        }
    };

    Ok(EntryWriteResponse {
        success: true,
        message,
        entry,
        summary,
    })
}

/// Delete an entry and recompute the writer's streaks
pub fn delete_entry<S: JournalStorage>(
    storage: &S,
    engine: &StreakEngine,
    params: DeleteEntryParams,
) -> Result<EntryWriteResponse, JournalError> {
    let user = storage.get_user_by_username(&params.username)?;
    let date = params.date;

    let summary = storage.transaction(|s| -> Result<_, JournalError> {
        s.delete_entry(&user.id, date)?;
        Ok(engine.recompute(s, &user.id)?)
    })?;

    tracing::info!("{} deleted entry for {}", user.username, date);

    Ok(EntryWriteResponse {
        success: true,
        message: format!(
            "🗑️ Deleted entry for {}. Current streak: {} day{}",
            date,
            summary.current_streak,
            plural(summary.current_streak)
        ),
        entry: None,
        summary,
    })
}
