//! Repository listing and search.

use clap::Subcommand;
use sea_orm::DatabaseConnection;
use tabled::{Table, Tabled, settings::Style};

use repolink::GitHubRepositoryModel;
use repolink::browse::{self, DEFAULT_PAGE_NUM, DEFAULT_PAGE_SIZE};
use repolink::repository::{self, LinkedRepository};

use super::{OutputFormat, resolve_user};

const DEFAULT_SEARCH_LIMIT: u64 = 25;

#[derive(Subcommand)]
pub enum ReposAction {
    /// List a user's linked repositories, most starred first
    List {
        /// User id or username
        user: String,

        /// Page number, starting at 1
        #[arg(short, long, default_value_t = DEFAULT_PAGE_NUM)]
        page: u64,

        /// Repositories per page
        #[arg(short = 's', long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: u64,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
    /// Search all stored repositories by name, full name, language or id
    Search {
        term: String,

        /// Maximum number of results
        #[arg(short, long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: u64,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
}

#[derive(Debug, Tabled)]
struct LinkedDisplay {
    #[tabled(rename = "Repository")]
    full_name: String,
    #[tabled(rename = "Language")]
    language: String,
    #[tabled(rename = "Stars")]
    stars: i32,
    #[tabled(rename = "Forks")]
    forks: i32,
    #[tabled(rename = "Private")]
    private: &'static str,
    #[tabled(rename = "Status")]
    status: &'static str,
}

impl From<&LinkedRepository> for LinkedDisplay {
    fn from(repo: &LinkedRepository) -> Self {
        Self {
            full_name: repo.full_name.clone(),
            language: repo.language.clone().unwrap_or_default(),
            stars: repo.stargazers_count,
            forks: repo.forks_count,
            private: if repo.private { "yes" } else { "" },
            status: if repo.disabled { "disabled" } else { "active" },
        }
    }
}

#[derive(Debug, Tabled)]
struct SearchDisplay {
    #[tabled(rename = "GitHub ID")]
    github_id: i64,
    #[tabled(rename = "Repository")]
    full_name: String,
    #[tabled(rename = "Language")]
    language: String,
    #[tabled(rename = "Stars")]
    stars: i32,
    #[tabled(rename = "Synced")]
    synced_at: String,
}

impl From<&GitHubRepositoryModel> for SearchDisplay {
    fn from(repo: &GitHubRepositoryModel) -> Self {
        Self {
            github_id: repo.github_id,
            full_name: repo.full_name.clone(),
            language: repo.language.clone().unwrap_or_default(),
            stars: repo.stargazers_count,
            synced_at: repo.synced_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

pub async fn handle_repos(
    action: ReposAction,
    db: &DatabaseConnection,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ReposAction::List {
            user,
            page,
            page_size,
            output,
        } => list_repos(db, &user, page, page_size, output).await,
        ReposAction::Search {
            term,
            limit,
            output,
        } => search_repos(db, &term, limit, output).await,
    }
}

async fn list_repos(
    db: &DatabaseConnection,
    user: &str,
    page: u64,
    page_size: u64,
    output: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let user = resolve_user(db, user).await?;
    let page_num = page.to_string();
    let page_size = page_size.to_string();
    let page = browse::browse(db, user.id, Some(&page_num), Some(&page_size)).await?;

    if let OutputFormat::Json = output {
        println!("{}", serde_json::to_string_pretty(&page)?);
        return Ok(());
    }

    if let Some(message) = &page.error {
        println!("{message}");
        println!("Link one with: repolink account link {} --login <login>", user.username);
        return Ok(());
    }
    if page.items.is_empty() {
        println!("No repositories linked to '{}' yet. Run: repolink sync {}", user.username, user.username);
        return Ok(());
    }

    let displays: Vec<LinkedDisplay> = page.items.iter().map(LinkedDisplay::from).collect();
    let mut table = Table::new(displays);
    table.with(Style::rounded());
    println!("{table}");
    println!(
        "Page {} of {} ({} repositories)",
        page.page_num, page.total_pages, page.total
    );

    Ok(())
}

async fn search_repos(
    db: &DatabaseConnection,
    term: &str,
    limit: u64,
    output: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let repos = repository::search(db, term, limit).await?;

    match output {
        OutputFormat::Table => {
            if repos.is_empty() {
                let total = repository::count(db).await?;
                println!("No match for '{term}' among {total} stored repositories.");
                return Ok(());
            }
            let displays: Vec<SearchDisplay> = repos.iter().map(SearchDisplay::from).collect();
            let mut table = Table::new(displays);
            table.with(Style::rounded());
            println!("{table}");
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&repos)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linked(disabled: bool, private: bool) -> LinkedRepository {
        LinkedRepository {
            github_id: 1,
            name: "repolink".to_string(),
            full_name: "acme/repolink".to_string(),
            html_url: "https://github.com/acme/repolink".to_string(),
            description: None,
            language: None,
            private,
            stargazers_count: 3,
            forks_count: 1,
            disabled,
        }
    }

    #[test]
    fn linked_display_shows_link_state() {
        let active = LinkedDisplay::from(&linked(false, true));
        assert_eq!(active.status, "active");
        assert_eq!(active.private, "yes");
        assert_eq!(active.language, "");

        let disabled = LinkedDisplay::from(&linked(true, false));
        assert_eq!(disabled.status, "disabled");
        assert_eq!(disabled.private, "");
    }
}
