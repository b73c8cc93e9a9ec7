/// SQLite implementation of the journal storage interface
///
/// This module provides the concrete SQLite implementation for storing
/// and retrieving users, journal entries and streak summaries. It handles all
/// SQL queries and data conversion.

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use rusqlite::types::Type;

use crate::domain::{is_blank, EntryId, JournalEntry, User, UserId, UserSummary};
use crate::storage::{migrations, JournalStorage, QualifyingEntry, StorageError};

const DATE_FORMAT: &str = "%Y-%m-%d";

const ENTRY_COLUMNS: &str =
    "id, user_id, entry_date, content, word_count, is_private, created_at, updated_at";

const USER_COLUMNS: &str = "id, username, current_streak, highest_streak, highest_streak_year, \
     total_words, total_entries, created_at, updated_at";

/// SQLite-based storage implementation
///
/// This struct holds a connection to the SQLite database and implements
/// all the storage operations defined in the JournalStorage trait.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Create a new SQLite storage instance
    ///
    /// This opens the database file and runs any necessary migrations
    /// to ensure the schema is up to date.
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self, StorageError> {
        let db_path = db_path.as_ref();
        let conn = Connection::open(db_path)
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        let storage = Self::with_connection(conn)?;
        tracing::info!("SQLite storage initialized at: {:?}", db_path);
        Ok(storage)
    }

    /// Open a private in-memory database (used by tests)
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute("PRAGMA foreign_keys = ON", [])
            .map_err(|e| StorageError::Connection(format!("Failed to enable foreign keys: {}", e)))?;

        migrations::initialize_database(&conn)?;

        Ok(Self { conn })
    }

    fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<JournalEntry> {
        let id: String = row.get(0)?;
        let user_id: String = row.get(1)?;
        let date: String = row.get(2)?;
        let created_at: String = row.get(6)?;
        let updated_at: String = row.get(7)?;

        Ok(JournalEntry::from_existing(
            EntryId::from_string(&id).map_err(|e| conversion_error(0, e))?,
            UserId::from_string(&user_id).map_err(|e| conversion_error(1, e))?,
            parse_date(2, &date)?,
            row.get(3)?, // content
            row.get(4)?, // word_count
            row.get(5)?, // is_private
            parse_timestamp(6, &created_at)?,
            parse_timestamp(7, &updated_at)?,
        ))
    }

    fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
        let id: String = row.get(0)?;
        let total_words: i64 = row.get(5)?;
        let created_at: String = row.get(7)?;
        let updated_at: String = row.get(8)?;

        let summary = UserSummary {
            current_streak: row.get(2)?,
            highest_streak: row.get(3)?,
            highest_streak_year: row.get(4)?,
            total_words: total_words.max(0) as u64,
            total_entries: row.get(6)?,
        };

        Ok(User::from_existing(
            UserId::from_string(&id).map_err(|e| conversion_error(0, e))?,
            row.get(1)?, // username
            summary,
            parse_timestamp(7, &created_at)?,
            parse_timestamp(8, &updated_at)?,
        ))
    }

    fn fetch_user(&self, column: &str, value: &str) -> Result<Option<User>, StorageError> {
        let sql = format!("SELECT {} FROM users WHERE {} = ?1", USER_COLUMNS, column);
        let user = self
            .conn
            .query_row(&sql, params![value], Self::row_to_user)
            .optional()?;
        Ok(user)
    }
}

impl JournalStorage for SqliteStorage {
    fn create_user(&self, user: &User) -> Result<(), StorageError> {
        let result = self.conn.execute(
            "INSERT INTO users (
                id, username, current_streak, highest_streak, highest_streak_year,
                total_words, total_entries, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                user.id.to_string(),
                user.username,
                user.summary.current_streak,
                user.summary.highest_streak,
                user.summary.highest_streak_year,
                user.summary.total_words as i64,
                user.summary.total_entries,
                user.created_at.to_rfc3339(),
                user.updated_at.to_rfc3339(),
            ],
        );

        match result {
            Ok(_) => {
                tracing::debug!("Created user: {} ({})", user.username, user.id);
                Ok(())
            }
            Err(e) if is_unique_violation(&e) => Err(StorageError::DuplicateUser {
                username: user.username.clone(),
            }),
            Err(e) => Err(StorageError::Query(e)),
        }
    }

    fn get_user(&self, user_id: &UserId) -> Result<User, StorageError> {
        self.fetch_user("id", &user_id.to_string())?
            .ok_or_else(|| StorageError::UserNotFound {
                user: user_id.to_string(),
            })
    }

    fn get_user_by_username(&self, username: &str) -> Result<User, StorageError> {
        self.fetch_user("username", username)?
            .ok_or_else(|| StorageError::UserNotFound {
                user: username.to_string(),
            })
    }

    fn create_entry(&self, entry: &JournalEntry) -> Result<(), StorageError> {
        let result = self.conn.execute(
            "INSERT INTO journal_entries (
                id, user_id, entry_date, content, word_count, is_private, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                entry.id.to_string(),
                entry.user_id.to_string(),
                entry.date.format(DATE_FORMAT).to_string(),
                entry.content,
                entry.word_count,
                entry.is_private,
                entry.created_at.to_rfc3339(),
                entry.updated_at.to_rfc3339(),
            ],
        );

        match result {
            Ok(_) => {
                tracing::debug!("Created journal entry {} for {} on {}", entry.id, entry.user_id, entry.date);
                Ok(())
            }
            Err(e) if is_unique_violation(&e) => Err(StorageError::DuplicateEntry {
                user: entry.user_id.to_string(),
                date: entry.date.to_string(),
            }),
            Err(e) => Err(StorageError::Query(e)),
        }
    }

    fn find_entry(
        &self,
        user_id: &UserId,
        date: NaiveDate,
    ) -> Result<Option<JournalEntry>, StorageError> {
        let sql = format!(
            "SELECT {} FROM journal_entries WHERE user_id = ?1 AND entry_date = ?2",
            ENTRY_COLUMNS
        );
        let entry = self
            .conn
            .query_row(
                &sql,
                params![user_id.to_string(), date.format(DATE_FORMAT).to_string()],
                Self::row_to_entry,
            )
            .optional()?;
        Ok(entry)
    }

    fn update_entry(&self, entry: &JournalEntry) -> Result<(), StorageError> {
        let rows_affected = self.conn.execute(
            "UPDATE journal_entries SET
                content = ?3,
                word_count = ?4,
                is_private = ?5,
                updated_at = ?6
             WHERE user_id = ?1 AND entry_date = ?2",
            params![
                entry.user_id.to_string(),
                entry.date.format(DATE_FORMAT).to_string(),
                entry.content,
                entry.word_count,
                entry.is_private,
                entry.updated_at.to_rfc3339(),
            ],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::EntryNotFound {
                user: entry.user_id.to_string(),
                date: entry.date.to_string(),
            });
        }

        tracing::debug!("Updated journal entry {} for {} on {}", entry.id, entry.user_id, entry.date);
        Ok(())
    }

    fn delete_entry(&self, user_id: &UserId, date: NaiveDate) -> Result<(), StorageError> {
        let rows_affected = self.conn.execute(
            "DELETE FROM journal_entries WHERE user_id = ?1 AND entry_date = ?2",
            params![user_id.to_string(), date.format(DATE_FORMAT).to_string()],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::EntryNotFound {
                user: user_id.to_string(),
                date: date.to_string(),
            });
        }

        tracing::debug!("Deleted journal entry for {} on {}", user_id, date);
        Ok(())
    }

    fn list_entries(
        &self,
        user_id: &UserId,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<JournalEntry>, StorageError> {
        // ISO dates sort lexically, so open bounds can use the extreme strings
        let start = start_date.map_or_else(|| "0000-01-01".to_string(), |d| d.format(DATE_FORMAT).to_string());
        let end = end_date.map_or_else(|| "9999-12-31".to_string(), |d| d.format(DATE_FORMAT).to_string());

        let sql = format!(
            "SELECT {} FROM journal_entries
             WHERE user_id = ?1 AND entry_date BETWEEN ?2 AND ?3
             ORDER BY entry_date ASC",
            ENTRY_COLUMNS
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let entry_iter = stmt.query_map(params![user_id.to_string(), start, end], Self::row_to_entry)?;

        let mut entries = Vec::new();
        for entry in entry_iter {
            entries.push(entry?);
        }

        Ok(entries)
    }

    fn qualifying_entries(&self, user_id: &UserId) -> Result<Vec<QualifyingEntry>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT entry_date, content, word_count FROM journal_entries
             WHERE user_id = ?1
             ORDER BY entry_date ASC",
        )?;

        let rows = stmt.query_map(params![user_id.to_string()], |row| {
            let date: String = row.get(0)?;
            let content: String = row.get(1)?;
            let word_count: u32 = row.get(2)?;
            Ok((parse_date(0, &date)?, content, word_count))
        })?;

        // SQLite's trim() only strips spaces, so blankness is decided here
        let mut entries = Vec::new();
        for row in rows {
            let (date, content, word_count) = row?;
            if !is_blank(&content) {
                entries.push(QualifyingEntry { date, word_count });
            }
        }

        Ok(entries)
    }

    fn get_summary(&self, user_id: &UserId) -> Result<UserSummary, StorageError> {
        Ok(self.get_user(user_id)?.summary)
    }

    fn write_summary(&self, user_id: &UserId, summary: &UserSummary) -> Result<(), StorageError> {
        let rows_affected = self.conn.execute(
            "UPDATE users SET
                current_streak = ?2,
                highest_streak = ?3,
                highest_streak_year = ?4,
                total_words = ?5,
                total_entries = ?6,
                updated_at = ?7
             WHERE id = ?1",
            params![
                user_id.to_string(),
                summary.current_streak,
                summary.highest_streak,
                summary.highest_streak_year,
                summary.total_words as i64,
                summary.total_entries,
                Utc::now().to_rfc3339(),
            ],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::UserNotFound {
                user: user_id.to_string(),
            });
        }

        tracing::debug!(
            "Wrote summary for {}: current={} highest={} words={} entries={}",
            user_id,
            summary.current_streak,
            summary.highest_streak,
            summary.total_words,
            summary.total_entries
        );
        Ok(())
    }

    fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Self) -> Result<T, E>,
        E: From<StorageError>,
    {
        self.conn
            .execute_batch("BEGIN IMMEDIATE")
            .map_err(StorageError::from)?;

        let outcome = f(self).and_then(|value| {
            self.conn
                .execute_batch("COMMIT")
                .map_err(|e| E::from(StorageError::from(e)))?;
            Ok(value)
        });

        match outcome {
            Ok(value) => Ok(value),
            // A failed COMMIT leaves the transaction open
            Err(e) => {
                if let Err(rollback_err) = self.conn.execute_batch("ROLLBACK") {
                    tracing::warn!("Failed to roll back transaction: {}", rollback_err);
                } else {
                    tracing::debug!("Rolled back transaction");
                }
                Err(e)
            }
        }
    }
}

fn is_unique_violation(error: &rusqlite::Error) -> bool {
    matches!(
        error,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

fn conversion_error<E>(column: usize, error: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(error))
}

fn parse_date(column: usize, value: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|e| conversion_error(column, e))
}

fn parse_timestamp(column: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(column, e))
}
