/// Tools for checking streaks and profiles
///
/// This module implements the streak_status and user_profile MCP tools.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{RefreshPolicy, StreakResult, UserSummary};
use crate::engine::StreakEngine;
use crate::storage::JournalStorage;
use crate::tools::{plural, JournalError};

/// Parameters naming a single user
#[derive(Debug, Deserialize, JsonSchema)]
pub struct UserParams {
    pub username: String,
}

/// Freshly calculated streaks, without touching stored values
#[derive(Debug, Serialize)]
pub struct StreakStatusResponse {
    pub username: String,
    pub current_streak: u32,
    pub highest_streak: u32,
    /// Maximum recorded so far, which can exceed the recalculated one
    pub recorded_highest_streak: u32,
    pub message: String,
}

/// A user's public statistics
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub username: String,
    pub member_since: String,
    pub summary: UserSummary,
    /// Whether the streaks were recomputed for this read
    pub refreshed: bool,
    pub message: String,
}

/// Calculate a user's streaks from their entries without persisting them
pub fn get_streak_status<S: JournalStorage>(
    storage: &S,
    engine: &StreakEngine,
    params: UserParams,
) -> Result<StreakStatusResponse, JournalError> {
    let user = storage.get_user_by_username(&params.username)?;
    let result = engine.calculate_streaks(storage, &user.id)?;

    Ok(StreakStatusResponse {
        message: format!("🔥 {}", result.motivational_message()),
        username: user.username,
        current_streak: result.current_streak,
        highest_streak: result.highest_streak,
        recorded_highest_streak: engine.carried_highest(&user.summary).max(result.highest_streak),
    })
}

/// Read a user's profile, refreshing streaks first under the on-read policy
pub fn get_profile<S: JournalStorage>(
    storage: &S,
    engine: &StreakEngine,
    params: UserParams,
) -> Result<ProfileResponse, JournalError> {
    let mut user = storage.get_user_by_username(&params.username)?;

    let refreshed = engine.policy().refresh == RefreshPolicy::OnRead;
    if refreshed {
        engine.update_streaks(storage, &user.id)?;
        user = storage.get_user(&user.id)?;
    }

    let summary = user.summary;
    let streaks = StreakResult {
        current_streak: summary.current_streak,
        highest_streak: summary.highest_streak,
    };

    Ok(ProfileResponse {
        message: format!(
            "📊 {}: {} entr{}, {} word{}, current streak {} (best {}). {}",
            user.username,
            summary.total_entries,
            if summary.total_entries == 1 { "y" } else { "ies" },
            summary.total_words,
            plural(summary.total_words),
            summary.current_streak,
            summary.highest_streak,
            streaks.motivational_message()
        ),
        username: user.username,
        member_since: user.created_at.date_naive().to_string(),
        summary,
        refreshed,
    })
}
