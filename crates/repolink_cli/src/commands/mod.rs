pub(crate) mod accounts;
pub(crate) mod migrate;
pub(crate) mod repos;
pub(crate) mod serve;
pub(crate) mod sync;
pub(crate) mod users;

use clap::ValueEnum;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use repolink::UserModel;
use repolink::repository;

/// Output format for listings.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Display as a formatted table (default)
    #[default]
    Table,
    /// Display as JSON
    Json,
}

/// Resolve a user given either its id or its username.
pub(crate) async fn resolve_user(
    db: &DatabaseConnection,
    user: &str,
) -> Result<UserModel, Box<dyn std::error::Error>> {
    let found = match Uuid::parse_str(user) {
        Ok(id) => repository::find_user(db, id).await?,
        Err(_) => repository::find_user_by_username(db, user).await?,
    };

    found.ok_or_else(|| {
        format!("User '{user}' not found. Create it first with: repolink user add {user}").into()
    })
}

