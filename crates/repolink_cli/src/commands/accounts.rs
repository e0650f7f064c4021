//! Upstream account linking.

use clap::Subcommand;
use sea_orm::DatabaseConnection;

use repolink::repository::{self, AccountLink};

use super::resolve_user;

#[derive(Subcommand)]
pub enum AccountAction {
    /// Attach a GitHub account and access token to a user
    ///
    /// Replaces any account already linked to the user.
    Link {
        /// User id or username
        user: String,

        /// GitHub login of the account
        #[arg(short, long)]
        login: String,

        /// Access token used for repository reads
        #[arg(short, long, env = "REPOLINK_GITHUB_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Avatar image URL shown alongside the listing
        #[arg(short, long)]
        avatar_url: Option<String>,
    },
}

pub async fn handle_account(
    action: AccountAction,
    db: &DatabaseConnection,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        AccountAction::Link {
            user,
            login,
            token,
            avatar_url,
        } => {
            let user = resolve_user(db, &user).await?;
            let link = AccountLink {
                provider_login: login,
                access_token: token.filter(|t| !t.trim().is_empty()),
                avatar_url,
            };
            let account = repository::link_account(db, user.id, link).await?;

            println!(
                "Linked GitHub account '{}' to user '{}'",
                account.provider_login, user.username
            );
            if account.usable_token().is_none() {
                println!("No access token stored; syncs for this user will fail until one is set.");
            }
        }
    }
    Ok(())
}
