/// Streak engine tying the calculator to stored journal data
///
/// `calculate_streaks` is a read-only view over a user's entries. The update
/// path re-derives the whole summary (streaks, word and entry totals) from a
/// single read of the qualifying entries and writes it back in one statement,
/// so stored values never drift from the entry data.

use chrono::Datelike;

use crate::domain::{
    Clock, HighestStreakScope, StreakCalculator, StreakPolicy, StreakResult, UserId, UserSummary,
};
use crate::storage::{JournalStorage, QualifyingEntry, StorageError};

/// Streak engine configured with a policy and a source of "today"
#[derive(Debug, Clone, Copy, Default)]
pub struct StreakEngine {
    policy: StreakPolicy,
    calculator: StreakCalculator,
    clock: Clock,
}

impl StreakEngine {
    /// Create an engine that evaluates streaks against the system clock
    pub fn new(policy: StreakPolicy) -> Self {
        Self::with_clock(policy, Clock::System)
    }

    pub fn with_clock(policy: StreakPolicy, clock: Clock) -> Self {
        Self {
            policy,
            calculator: StreakCalculator::new(policy.highest_scope),
            clock,
        }
    }

    pub fn policy(&self) -> StreakPolicy {
        self.policy
    }

    /// Today's server-local calendar day
    pub fn today(&self) -> chrono::NaiveDate {
        self.clock.today()
    }

    /// Compute a user's streaks without writing anything
    pub fn calculate_streaks<S: JournalStorage>(
        &self,
        storage: &S,
        user_id: &UserId,
    ) -> Result<StreakResult, StorageError> {
        let entries = storage.qualifying_entries(user_id)?;
        Ok(self.calculator.calculate(entries.iter().map(|e| e.date), self.today()))
    }

    /// Recompute and persist a user's summary in its own transaction
    ///
    /// Returns the streak values as stored, i.e. with the highest streak
    /// already combined with the previously recorded maximum.
    pub fn update_streaks<S: JournalStorage>(
        &self,
        storage: &S,
        user_id: &UserId,
    ) -> Result<StreakResult, StorageError> {
        let summary = storage.transaction(|s| self.recompute(s, user_id))?;
        Ok(StreakResult {
            current_streak: summary.current_streak,
            highest_streak: summary.highest_streak,
        })
    }

    /// Recompute and persist a user's summary
    ///
    /// Callers that already hold a transaction (the entry mutation tools) use
    /// this directly so the entry write and the summary commit together. A
    /// failed read returns before anything is written.
    pub fn recompute<S: JournalStorage>(
        &self,
        storage: &S,
        user_id: &UserId,
    ) -> Result<UserSummary, StorageError> {
        let stored = storage.get_summary(user_id)?;
        let entries = storage.qualifying_entries(user_id)?;

        let summary = self.summarize(&entries, &stored);
        storage.write_summary(user_id, &summary)?;

        tracing::debug!(
            "Recomputed streaks for {}: current={} highest={}",
            user_id,
            summary.current_streak,
            summary.highest_streak
        );
        Ok(summary)
    }

    /// The stored highest streak that still counts today
    ///
    /// Under the calendar-year scope a maximum recorded in an earlier year
    /// no longer applies.
    pub fn carried_highest(&self, stored: &UserSummary) -> u32 {
        match self.calculator.scope() {
            HighestStreakScope::AllTime => stored.highest_streak,
            HighestStreakScope::CalendarYear
                if stored.highest_streak_year == Some(self.today().year()) =>
            {
                stored.highest_streak
            }
            HighestStreakScope::CalendarYear => 0,
        }
    }

    /// Derive a fresh summary from qualifying entries and the stored one
    pub fn summarize(&self, entries: &[QualifyingEntry], stored: &UserSummary) -> UserSummary {
        let today = self.today();
        let result = self.calculator.calculate(entries.iter().map(|e| e.date), today);

        let highest_streak_year = match self.calculator.scope() {
            HighestStreakScope::AllTime => None,
            HighestStreakScope::CalendarYear => Some(today.year()),
        };

        UserSummary {
            current_streak: result.current_streak,
            highest_streak: result
                .highest_streak
                .max(self.carried_highest(stored))
                .max(result.current_streak),
            highest_streak_year,
            total_words: entries.iter().map(|e| u64::from(e.word_count)).sum(),
            total_entries: entries.len() as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{JournalEntry, RefreshPolicy, User};
    use crate::storage::SqliteStorage;
    use chrono::{Duration, NaiveDate};
    use std::cell::Cell;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn engine(scope: HighestStreakScope) -> StreakEngine {
        StreakEngine::with_clock(
            StreakPolicy {
                highest_scope: scope,
                refresh: RefreshPolicy::OnRead,
            },
            Clock::Fixed(today()),
        )
    }

    fn setup() -> (SqliteStorage, User) {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let user = User::new("streaker".to_string()).unwrap();
        storage.create_user(&user).unwrap();
        (storage, user)
    }

    fn write(storage: &SqliteStorage, user: &User, days_ago: i64, content: &str) {
        let date = today() - Duration::days(days_ago);
        let entry =
            JournalEntry::new(user.id.clone(), date, content.to_string(), false, today()).unwrap();
        storage.create_entry(&entry).unwrap();
    }

    #[test]
    fn test_calculate_does_not_write() {
        let (storage, user) = setup();
        write(&storage, &user, 0, "hello there");

        let result = engine(HighestStreakScope::AllTime)
            .calculate_streaks(&storage, &user.id)
            .unwrap();
        assert_eq!(result, StreakResult { current_streak: 1, highest_streak: 1 });
        assert_eq!(storage.get_summary(&user.id).unwrap(), UserSummary::default());
    }

    #[test]
    fn test_update_persists_summary_and_totals() {
        let (storage, user) = setup();
        write(&storage, &user, 2, "one two three");
        write(&storage, &user, 1, "four five");

        let result = engine(HighestStreakScope::AllTime)
            .update_streaks(&storage, &user.id)
            .unwrap();
        assert_eq!(result, StreakResult { current_streak: 2, highest_streak: 2 });

        let stored = storage.get_summary(&user.id).unwrap();
        assert_eq!(stored.current_streak, 2);
        assert_eq!(stored.highest_streak, 2);
        assert_eq!(stored.total_words, 5);
        assert_eq!(stored.total_entries, 2);
    }

    #[test]
    fn test_highest_never_regresses_after_deletion() {
        let (storage, user) = setup();
        let engine = engine(HighestStreakScope::AllTime);
        for days_ago in 0..5 {
            write(&storage, &user, days_ago, "daily words");
        }
        engine.update_streaks(&storage, &user.id).unwrap();

        // Break the run in the middle: recomputed highest is only 2
        storage.delete_entry(&user.id, today() - Duration::days(2)).unwrap();
        let calculated = engine.calculate_streaks(&storage, &user.id).unwrap();
        assert_eq!(calculated, StreakResult { current_streak: 2, highest_streak: 2 });

        let stored = engine.update_streaks(&storage, &user.id).unwrap();
        assert_eq!(stored, StreakResult { current_streak: 2, highest_streak: 5 });
    }

    #[test]
    fn test_calendar_year_scope_drops_last_years_maximum() {
        let engine = engine(HighestStreakScope::CalendarYear);
        let stored_last_year = UserSummary {
            highest_streak: 40,
            highest_streak_year: Some(today().year() - 1),
            ..UserSummary::default()
        };
        let entries = [QualifyingEntry { date: today(), word_count: 3 }];

        let summary = engine.summarize(&entries, &stored_last_year);
        assert_eq!(summary.highest_streak, 1);
        assert_eq!(summary.highest_streak_year, Some(today().year()));

        let stored_this_year = UserSummary {
            highest_streak: 12,
            highest_streak_year: Some(today().year()),
            ..UserSummary::default()
        };
        assert_eq!(engine.summarize(&entries, &stored_this_year).highest_streak, 12);
    }

    #[test]
    fn test_carried_highest_follows_scope() {
        let last_year = UserSummary {
            highest_streak: 21,
            highest_streak_year: Some(today().year() - 1),
            ..UserSummary::default()
        };
        let this_year = UserSummary {
            highest_streak_year: Some(today().year()),
            ..last_year
        };

        assert_eq!(engine(HighestStreakScope::AllTime).carried_highest(&last_year), 21);
        assert_eq!(engine(HighestStreakScope::CalendarYear).carried_highest(&last_year), 0);
        assert_eq!(engine(HighestStreakScope::CalendarYear).carried_highest(&this_year), 21);
    }

    /// Storage whose entry reads fail, counting summary writes
    struct FailingReads {
        inner: SqliteStorage,
        summary_writes: Cell<u32>,
    }

    impl JournalStorage for FailingReads {
        fn create_user(&self, user: &User) -> Result<(), StorageError> {
            self.inner.create_user(user)
        }
        fn get_user(&self, user_id: &UserId) -> Result<User, StorageError> {
            self.inner.get_user(user_id)
        }
        fn get_user_by_username(&self, username: &str) -> Result<User, StorageError> {
            self.inner.get_user_by_username(username)
        }
        fn create_entry(&self, entry: &JournalEntry) -> Result<(), StorageError> {
            self.inner.create_entry(entry)
        }
        fn find_entry(&self, user_id: &UserId, date: NaiveDate) -> Result<Option<JournalEntry>, StorageError> {
            self.inner.find_entry(user_id, date)
        }
        fn update_entry(&self, entry: &JournalEntry) -> Result<(), StorageError> {
            self.inner.update_entry(entry)
        }
        fn delete_entry(&self, user_id: &UserId, date: NaiveDate) -> Result<(), StorageError> {
            self.inner.delete_entry(user_id, date)
        }
        fn list_entries(
            &self,
            user_id: &UserId,
            start_date: Option<NaiveDate>,
            end_date: Option<NaiveDate>,
        ) -> Result<Vec<JournalEntry>, StorageError> {
            self.inner.list_entries(user_id, start_date, end_date)
        }
        fn qualifying_entries(&self, _user_id: &UserId) -> Result<Vec<QualifyingEntry>, StorageError> {
            Err(StorageError::Connection("entry store unreachable".to_string()))
        }
        fn get_summary(&self, user_id: &UserId) -> Result<UserSummary, StorageError> {
            self.inner.get_summary(user_id)
        }
        fn write_summary(&self, user_id: &UserId, summary: &UserSummary) -> Result<(), StorageError> {
            self.summary_writes.set(self.summary_writes.get() + 1);
            self.inner.write_summary(user_id, summary)
        }
        fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
        where
            F: FnOnce(&Self) -> Result<T, E>,
            E: From<StorageError>,
        {
            f(self)
        }
    }

    #[test]
    fn test_read_failure_leaves_stored_values_untouched() {
        let (inner, user) = setup();
        let seeded = UserSummary {
            current_streak: 7,
            highest_streak: 9,
            total_words: 1200,
            total_entries: 9,
            ..UserSummary::default()
        };
        inner.write_summary(&user.id, &seeded).unwrap();

        let storage = FailingReads { inner, summary_writes: Cell::new(0) };
        let result = engine(HighestStreakScope::AllTime).update_streaks(&storage, &user.id);

        assert!(matches!(result, Err(StorageError::Connection(_))));
        assert_eq!(storage.summary_writes.get(), 0);
        assert_eq!(storage.get_summary(&user.id).unwrap(), seeded);
    }
}
