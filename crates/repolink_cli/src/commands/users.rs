//! Local user administration.

use clap::Subcommand;
use sea_orm::DatabaseConnection;
use tabled::{Table, Tabled, settings::Style};

use repolink::UserModel;
use repolink::repository::{self, RepositoryError};

use super::OutputFormat;

/// User management subcommands.
#[derive(Subcommand)]
pub enum UserAction {
    /// Create a local user
    Add {
        /// Unique username
        username: String,
    },
    /// List local users
    List {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
}

#[derive(Debug, Clone, serde::Serialize, Tabled)]
struct UserDisplay {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Username")]
    username: String,
    #[tabled(rename = "Created")]
    created_at: String,
    #[tabled(rename = "Last Sync")]
    last_synced_at: String,
}

impl From<&UserModel> for UserDisplay {
    fn from(user: &UserModel) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.clone(),
            created_at: user.created_at.format("%Y-%m-%d").to_string(),
            last_synced_at: user
                .last_synced_at
                .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "never".to_string()),
        }
    }
}

pub async fn handle_user(
    action: UserAction,
    db: &DatabaseConnection,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        UserAction::Add { username } => add_user(db, &username).await,
        UserAction::List { output } => list_users(db, output).await,
    }
}

async fn add_user(db: &DatabaseConnection, username: &str) -> Result<(), Box<dyn std::error::Error>> {
    match repository::create_user(db, username).await {
        Ok(user) => {
            println!("Created user '{}' ({})", user.username, user.id);
            Ok(())
        }
        Err(RepositoryError::Duplicate { .. }) => {
            Err(format!("User '{username}' already exists.").into())
        }
        Err(e) => Err(e.into()),
    }
}

async fn list_users(
    db: &DatabaseConnection,
    output: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let users = repository::list_users(db).await?;

    if users.is_empty() {
        println!("No users yet.");
        println!();
        println!("Create one with:");
        println!("  repolink user add <username>");
        return Ok(());
    }

    let displays: Vec<UserDisplay> = users.iter().map(UserDisplay::from).collect();

    match output {
        OutputFormat::Table => {
            let mut table = Table::new(displays);
            table.with(Style::rounded());
            println!("{table}");
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&displays)?);
        }
    }

    Ok(())
}
