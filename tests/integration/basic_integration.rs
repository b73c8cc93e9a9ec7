/// Basic integration tests
use chrono::{Duration, NaiveDate};
use journal_streaks::mcp::McpServer;
use journal_streaks::tools::{self, CreateEntryParams, GetEntryParams, HeatmapParams, RegisterUserParams, UserParams};
use journal_streaks::*;
use serde_json::{json, Value};
use tempfile::TempDir;

fn written_on() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, 30).unwrap()
}

fn open(path: &std::path::Path, policy: StreakPolicy, today: NaiveDate) -> JournalServer {
    let storage = SqliteStorage::new(path).expect("Failed to open database");
    JournalServer::with_engine(storage, StreakEngine::with_clock(policy, Clock::Fixed(today)))
}

fn create(server: &JournalServer, username: &str, date: NaiveDate, content: &str, is_private: bool) {
    tools::create_entry(
        server.storage(),
        server.engine(),
        CreateEntryParams {
            username: username.to_string(),
            date: Some(date),
            content: content.to_string(),
            is_private,
        },
    )
    .expect("Failed to create entry");
}

fn register(server: &JournalServer, username: &str) {
    tools::register_user(server.storage(), RegisterUserParams { username: username.to_string() })
        .expect("Failed to register user");
}

#[cfg(test)]
mod basic_integration_tests {
    use super::*;

    #[tokio::test]
    async fn test_server_opens_fresh_database() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = dir.path().join("journal.db");

        let server = JournalServer::new(db_path.clone(), StreakPolicy::default())
            .await
            .expect("Failed to create server");
        assert!(matches!(
            server.storage().get_user_by_username("nobody"),
            Err(StorageError::UserNotFound { .. })
        ));
        assert!(db_path.exists());
    }

    #[test]
    fn test_summary_persists_across_restarts() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = dir.path().join("journal.db");

        {
            let server = open(&db_path, StreakPolicy::default(), written_on());
            register(&server, "persistent");
            for n in (0..4).rev() {
                create(&server, "persistent", written_on() - Duration::days(n), "words on the page", false);
            }
        }

        let reopened = open(&db_path, StreakPolicy::default(), written_on());
        let user = reopened.storage().get_user_by_username("persistent").unwrap();
        assert_eq!(user.summary.current_streak, 4);
        assert_eq!(user.summary.highest_streak, 4);
        assert_eq!(user.summary.total_words, 16);
        assert_eq!(user.summary.total_entries, 4);

        // A week later the profile read notices the broken streak
        let later = open(&db_path, StreakPolicy::default(), written_on() + Duration::days(7));
        let profile = tools::get_profile(
            later.storage(),
            later.engine(),
            UserParams { username: "persistent".to_string() },
        )
        .unwrap();
        assert_eq!(profile.summary.current_streak, 0);
        assert_eq!(profile.summary.highest_streak, 4);
    }

    #[test]
    fn test_calendar_year_scope_resets_highest() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = dir.path().join("journal.db");
        let policy = StreakPolicy {
            highest_scope: HighestStreakScope::CalendarYear,
            refresh: RefreshPolicy::OnRead,
        };

        {
            let server = open(&db_path, policy, written_on());
            register(&server, "yearly");
            for n in (0..5).rev() {
                create(&server, "yearly", written_on() - Duration::days(n), "december pages", false);
            }
            let user = server.storage().get_user_by_username("yearly").unwrap();
            assert_eq!(user.summary.highest_streak, 5);
            assert_eq!(user.summary.highest_streak_year, Some(2024));
        }

        // Mid-January, with the December run long over
        let january = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let server = open(&db_path, policy, january);
        create(&server, "yearly", january, "first words of the year", false);

        let user = server.storage().get_user_by_username("yearly").unwrap();
        assert_eq!(user.summary.current_streak, 1);
        assert_eq!(user.summary.highest_streak, 1);
        assert_eq!(user.summary.highest_streak_year, Some(2025));
    }

    #[test]
    fn test_privacy_and_heatmap() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let server = open(&dir.path().join("journal.db"), StreakPolicy::default(), written_on());
        register(&server, "owner");
        register(&server, "visitor");
        create(&server, "owner", written_on() - Duration::days(1), "public thoughts", false);
        create(&server, "owner", written_on(), "secret thoughts only for me", true);

        let hidden = tools::get_entry(
            server.storage(),
            GetEntryParams {
                username: "owner".to_string(),
                date: written_on(),
                viewer: Some("visitor".to_string()),
            },
        );
        assert!(matches!(hidden, Err(JournalError::PrivateEntry { .. })));

        let heatmap = tools::get_heatmap(
            server.storage(),
            HeatmapParams { username: "owner".to_string(), year: Some(2024) },
        )
        .unwrap();
        let counts: Vec<u32> = heatmap.days.iter().map(|d| d.word_count).collect();
        assert_eq!(counts, vec![2, 5]);
    }

    #[tokio::test]
    async fn test_mcp_round_trip() {
        let journal = JournalServer::in_memory(StreakPolicy::default(), Clock::Fixed(written_on())).unwrap();
        let mut mcp = McpServer::new(journal);

        let requests = [
            json!({"jsonrpc": "2.0", "id": 1, "method": "tools/call",
                   "params": {"name": "user_register", "arguments": {"username": "mcp_user"}}}),
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/call",
                   "params": {"name": "journal_create", "arguments": {"username": "mcp_user", "content": "written today"}}}),
            json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call",
                   "params": {"name": "journal_create", "arguments": {"username": "mcp_user", "content": "again"}}}),
        ];

        let mut results: Vec<Value> = Vec::new();
        for request in requests {
            let response = mcp.process_line(&request.to_string()).await.expect("request gets a response");
            results.push(serde_json::to_value(response).unwrap());
        }

        assert_eq!(results[0]["result"]["isError"], json!(false));
        assert_eq!(results[1]["result"]["isError"], json!(false));
        // Second entry for the same day is a duplicate
        assert_eq!(results[2]["result"]["isError"], json!(true));
        assert_eq!(results[2]["result"]["errorCode"], json!(mcp::protocol::error_codes::DUPLICATE));
        assert_eq!(results[2]["id"], json!(3));
    }
}
