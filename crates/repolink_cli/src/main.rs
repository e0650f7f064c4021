//! Repolink CLI - administration, one-shot syncs and the HTTP server.

mod commands;
mod config;
mod shutdown;

use std::path::Path;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use sea_orm::DatabaseConnection;
use tracing_subscriber::EnvFilter;

use crate::commands::OutputFormat;
use crate::commands::accounts::AccountAction;
use crate::commands::repos::ReposAction;
use crate::commands::users::UserAction;

#[derive(Parser)]
#[command(name = "repolink")]
#[command(version)]
#[command(about = "Reconcile users' GitHub repositories into a local database")]
#[command(
    long_about = "Repolink keeps a local record of every GitHub repository visible to each \
linked account. A sync pass fetches the account's full repository list, creates and updates \
repository rows, and disables links to repositories that are no longer visible."
)]
#[command(after_long_help = r#"EXAMPLES
    Prepare the database:
        $ repolink migrate up

    Create a user and link a GitHub account:
        $ repolink user add alice
        $ repolink account link alice --login alice-gh --token ghp_...

    Sync once and look at the result:
        $ repolink sync alice
        $ repolink repos list alice --page 2

    Run the HTTP API:
        $ repolink serve --bind 0.0.0.0:8080

CONFIGURATION
    Repolink reads configuration from:
      1. ~/.config/repolink/config.toml (or $XDG_CONFIG_HOME/repolink/config.toml)
      2. ./repolink.toml
      3. Environment variables (REPOLINK_* prefix)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    REPOLINK_DATABASE_URL        Database connection string (default: ~/.local/state/repolink/repolink.db)
    REPOLINK_GITHUB__API_URL     GitHub API base URL
    REPOLINK_SYNC__WINDOW_SECS   Minimum seconds between triggers per user
    REPOLINK_SERVER__BIND        Server listen address
    REPOLINK_GITHUB_TOKEN        Token for `account link` when --token is omitted
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
    /// Manage local users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Manage linked GitHub accounts
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
    /// Run a sync pass for a user and wait for it
    Sync {
        /// User id or username
        user: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
    /// Browse and search stored repositories
    Repos {
        #[command(subcommand)]
        action: ReposAction,
    },
    /// Serve the HTTP API
    Serve {
        /// Listen address (default from config or 127.0.0.1:8080)
        #[arg(short, long)]
        bind: Option<String>,
    },
}

#[derive(Subcommand)]
enum MigrateAction {
    /// Apply all pending migrations
    Up,
    /// Rollback the last migration
    Down,
    /// Show migration status
    Status,
    /// Drop all tables and reapply migrations
    Fresh,
}

/// Create the parent directory of a file-backed SQLite database.
fn ensure_sqlite_dir(database_url: &str) -> std::io::Result<()> {
    let Some(db_path) = database_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    // Strip query parameters (e.g., ?mode=rwc) before path operations
    let db_path = db_path.split('?').next().unwrap_or(db_path);
    if db_path.is_empty() || db_path.starts_with(":memory:") {
        return Ok(());
    }
    let db_path = Path::new(db_path);

    if db_path.is_relative() {
        tracing::warn!(
            "Database path '{}' is relative - behavior depends on current directory. \
             Consider using an absolute path.",
            db_path.display()
        );
    }

    if let Some(parent) = db_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new("repolink=info,repolink_cli=info"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration (config file -> env vars -> defaults)
    let config = config::Config::load();

    let cli = Cli::parse();

    let database_url = config
        .database_url()
        .ok_or("Could not determine a database URL; set REPOLINK_DATABASE_URL")?;
    ensure_sqlite_dir(&database_url)?;

    match cli.command {
        Commands::Migrate { action } => {
            commands::migrate::handle_migrate(action, &database_url).await?;
        }
        Commands::User { action } => {
            let db = connect(&database_url).await?;
            commands::users::handle_user(action, &db).await?;
        }
        Commands::Account { action } => {
            let db = connect(&database_url).await?;
            commands::accounts::handle_account(action, &db).await?;
        }
        Commands::Sync { user, output } => {
            let db = Arc::new(connect(&database_url).await?);
            commands::sync::handle_sync(&user, output, &config, &db).await?;
        }
        Commands::Repos { action } => {
            let db = connect(&database_url).await?;
            commands::repos::handle_repos(action, &db).await?;
        }
        Commands::Serve { bind } => {
            let db = Arc::new(connect(&database_url).await?);
            commands::serve::handle_serve(bind, &config, db).await?;
        }
    }

    Ok(())
}

/// Connect and bring the schema up to date before any data command runs.
async fn connect(database_url: &str) -> Result<DatabaseConnection, sea_orm::DbErr> {
    let db = repolink::connect_and_migrate(database_url).await?;
    tracing::debug!("database ready");
    Ok(db)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_nested_commands() {
        let cli = Cli::try_parse_from(["repolink", "repos", "list", "alice", "--page", "2"]).unwrap();
        match cli.command {
            Commands::Repos {
                action: ReposAction::List { user, page, .. },
            } => {
                assert_eq!(user, "alice");
                assert_eq!(page, 2);
            }
            _ => panic!("expected repos list"),
        }
    }

    #[test]
    fn cli_requires_user_for_sync() {
        assert!(Cli::try_parse_from(["repolink", "sync"]).is_err());
    }

    #[test]
    fn ensure_sqlite_dir_skips_memory_and_other_schemes() {
        ensure_sqlite_dir("sqlite::memory:").unwrap();
        ensure_sqlite_dir("sqlite://:memory:").unwrap();
        ensure_sqlite_dir("postgres://localhost/repolink").unwrap();
    }

    #[test]
    fn ensure_sqlite_dir_creates_parent() {
        let base = std::env::temp_dir().join(format!("repolink-cli-{}", std::process::id()));
        let url = format!("sqlite://{}/nested/app.db?mode=rwc", base.display());

        ensure_sqlite_dir(&url).unwrap();
        assert!(base.join("nested").is_dir());

        std::fs::remove_dir_all(&base).unwrap();
    }
}
