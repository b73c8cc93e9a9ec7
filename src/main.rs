/// Main entry point for the Journal Streaks MCP server
///
/// This file sets up logging, parses command line arguments, and starts the MCP server.
/// The server listens for JSON-RPC requests over stdin/stdout following the MCP protocol.

use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use journal_streaks::{HighestStreakScope, JournalServer, RefreshPolicy, StreakPolicy};

/// Get the default database path, falling back through several locations
fn get_default_database_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let potential_paths = [
        // 1. User's home directory (preferred)
        dirs::home_dir().map(|mut p| {
            p.push(".journal_streaks");
            p
        }),
        // 2. User's data directory (platform-specific)
        dirs::data_dir().map(|mut p| {
            p.push("journal_streaks");
            p
        }),
        // 3. User's config directory
        dirs::config_dir().map(|mut p| {
            p.push("journal_streaks");
            p
        }),
        // 4. Current working directory (last resort)
        std::env::current_dir().ok().map(|mut p| {
            p.push(".journal_streaks");
            p
        }),
    ];

    for potential_path in potential_paths.iter().flatten() {
        if std::fs::create_dir_all(potential_path).is_ok() {
            // Test if we can write to this directory
            let test_file = potential_path.join(".test_write");
            if std::fs::write(&test_file, "test").is_ok() {
                let _ = std::fs::remove_file(&test_file);
                return Ok(potential_path.join("journal.db"));
            }
        }
    }

    let mut temp_path = std::env::temp_dir();
    temp_path.push("journal_streaks");
    std::fs::create_dir_all(&temp_path)?;
    temp_path.push("journal.db");

    tracing::warn!("Using temporary directory for database: {}", temp_path.display());
    Ok(temp_path)
}

/// Command line arguments for the Journal Streaks MCP server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    /// If not provided, uses a default location in the user's home directory
    #[arg(long)]
    database: Option<PathBuf>,

    /// Range the highest streak is drawn from: all-time or calendar-year
    #[arg(long, default_value = "all-time")]
    highest_scope: HighestStreakScope,

    /// When stored streaks are recomputed: on-read or on-mutation
    #[arg(long, default_value = "on-read")]
    refresh: RefreshPolicy,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let log_level = if args.verbose {
        "debug"
    } else if args.debug {
        "info"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("journal_streaks={}", log_level))
        .with_writer(std::io::stderr) // stdout carries the JSON-RPC stream
        .init();

    info!("Starting Journal Streaks MCP server");

    let db_path = match args.database {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            path
        }
        None => get_default_database_path()?,
    };

    info!("Using database at: {}", db_path.display());

    let policy = StreakPolicy {
        highest_scope: args.highest_scope,
        refresh: args.refresh,
    };
    let server = JournalServer::new(db_path, policy).await?;

    server.run().await?;

    info!("Journal Streaks MCP server shutdown complete");
    Ok(())
}
