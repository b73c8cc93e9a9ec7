/// Basic unit tests to verify core functionality
use chrono::{Duration, NaiveDate};
use journal_streaks::tools::{self, CreateEntryParams, DeleteEntryParams, UpdateEntryParams};
use journal_streaks::*;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn engine_on(today: NaiveDate) -> StreakEngine {
    StreakEngine::with_clock(StreakPolicy::default(), Clock::Fixed(today))
}

fn write(storage: &SqliteStorage, engine: &StreakEngine, date: NaiveDate, content: &str) -> UserSummary {
    tools::create_entry(
        storage,
        engine,
        CreateEntryParams {
            username: "unit_writer".to_string(),
            date: Some(date),
            content: content.to_string(),
            is_private: false,
        },
    )
    .expect("entry should be saved")
    .summary
}

fn storage_with_writer() -> SqliteStorage {
    let storage = SqliteStorage::open_in_memory().expect("in-memory database");
    storage
        .create_user(&User::new("unit_writer".to_string()).unwrap())
        .unwrap();
    storage
}

#[cfg(test)]
mod basic_unit_tests {
    use super::*;

    #[test]
    fn test_user_validation() {
        assert!(User::new("  padded_name ".to_string()).is_ok());
        assert!(User::new("ab".to_string()).is_err());
        assert!(User::new("no spaces allowed".to_string()).is_err());
        assert!(User::new("x".repeat(31)).is_err());

        let user = User::new("fresh-writer".to_string()).unwrap();
        assert_eq!(user.summary, UserSummary::default());
    }

    #[test]
    fn test_entry_word_count() {
        let today = day(2024, 3, 10);
        let entry = JournalEntry::new(
            UserId::new(),
            today,
            "  rain again\n\tstill   writing ".to_string(),
            false,
            today,
        )
        .unwrap();

        assert_eq!(entry.word_count, 4);
        assert!(entry.is_qualifying());
        assert_eq!(count_words(""), 0);
    }

    #[test]
    fn test_entry_rejects_future_and_blank() {
        let today = day(2024, 3, 10);
        let future = JournalEntry::new(UserId::new(), today + Duration::days(1), "soon".to_string(), false, today);
        assert!(matches!(future, Err(DomainError::InvalidDate(_))));

        let blank = JournalEntry::new(UserId::new(), today, " \n\t ".to_string(), false, today);
        assert!(matches!(blank, Err(DomainError::InvalidContent(_))));
    }

    #[test]
    fn test_calculator_over_unsorted_duplicate_days() {
        let today = day(2024, 3, 10);
        let days = vec![
            day(2024, 3, 9),
            day(2024, 3, 1),
            day(2024, 3, 10),
            day(2024, 3, 2),
            day(2024, 3, 10),
            day(2024, 3, 3),
            day(2024, 3, 4),
        ];

        let result = StreakCalculator::new(HighestStreakScope::AllTime).calculate(days, today);
        assert_eq!(result.current_streak, 2);
        assert_eq!(result.highest_streak, 4);
    }

    #[test]
    fn test_calendar_year_scope_forgets_last_year() {
        let today = day(2025, 2, 1);
        let mut days: Vec<NaiveDate> = (0..10).map(|n| day(2024, 5, 1) + Duration::days(n)).collect();
        days.push(day(2025, 1, 30));
        days.push(day(2025, 1, 31));

        let all_time = StreakCalculator::new(HighestStreakScope::AllTime).calculate(days.clone(), today);
        let this_year = StreakCalculator::new(HighestStreakScope::CalendarYear).calculate(days, today);
        assert_eq!(all_time.highest_streak, 10);
        assert_eq!(this_year.highest_streak, 2);
        assert_eq!(this_year.current_streak, 2);
    }

    #[test]
    fn test_highest_streak_never_decreases() {
        let storage = storage_with_writer();
        let today = day(2024, 8, 20);
        let engine = engine_on(today);

        let mut highest = 0;
        for n in (0..5).rev() {
            let summary = write(&storage, &engine, today - Duration::days(n), "steady words");
            assert!(summary.highest_streak >= highest);
            highest = summary.highest_streak;
        }
        assert_eq!(highest, 5);

        // Break the run in the middle and blank out another day
        let deleted = tools::delete_entry(
            &storage,
            &engine,
            DeleteEntryParams { username: "unit_writer".to_string(), date: today - Duration::days(2) },
        )
        .unwrap();
        assert_eq!(deleted.summary.current_streak, 2);
        assert_eq!(deleted.summary.highest_streak, 5);

        let blanked = tools::update_entry(
            &storage,
            &engine,
            UpdateEntryParams {
                username: "unit_writer".to_string(),
                date: today,
                content: "   ".to_string(),
                is_private: None,
            },
        )
        .unwrap();
        assert!(blanked.entry.is_none());
        assert_eq!(blanked.summary.current_streak, 1);
        assert_eq!(blanked.summary.highest_streak, 5);
        assert_eq!(blanked.summary.total_entries, 3);
    }

    #[test]
    fn test_totals_follow_edits() {
        let storage = storage_with_writer();
        let today = day(2024, 8, 20);
        let engine = engine_on(today);

        write(&storage, &engine, today - Duration::days(1), "one two three");
        let summary = write(&storage, &engine, today, "four five");
        assert_eq!(summary.total_words, 5);
        assert_eq!(summary.total_entries, 2);

        let updated = tools::update_entry(
            &storage,
            &engine,
            UpdateEntryParams {
                username: "unit_writer".to_string(),
                date: today,
                content: "a much longer entry than before".to_string(),
                is_private: Some(true),
            },
        )
        .unwrap();
        assert_eq!(updated.summary.total_words, 9);
        assert_eq!(updated.summary.total_entries, 2);
        assert!(updated.entry.unwrap().is_private);
    }

    #[test]
    fn test_server_creation_in_memory() {
        let server = JournalServer::in_memory(StreakPolicy::default(), Clock::Fixed(day(2024, 1, 1)));
        assert!(server.is_ok());
        assert_eq!(server.unwrap().engine().today(), day(2024, 1, 1));
    }

    #[test]
    fn test_server_creation_on_disk() {
        let temp_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        let server = tokio_test::block_on(JournalServer::new(
            temp_file.path().to_path_buf(),
            StreakPolicy::default(),
        ));
        assert!(server.is_ok());
    }
}
