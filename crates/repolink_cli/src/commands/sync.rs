//! One-shot reconciliation from the command line.

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tabled::{Table, Tabled, settings::Style};

use repolink::credentials::DbCredentialSource;
use repolink::github::GitHubClient;
use repolink::sync::{ReconcileReport, SyncError, SyncService};

use super::{OutputFormat, resolve_user};
use crate::config::Config;
use crate::shutdown::shutdown_signal;

#[derive(Debug, Tabled)]
struct ReportRow {
    #[tabled(rename = "Outcome")]
    outcome: &'static str,
    #[tabled(rename = "Count")]
    count: usize,
    #[tabled(rename = "GitHub IDs")]
    ids: String,
}

impl ReportRow {
    fn new(outcome: &'static str, ids: &[i64]) -> Self {
        const SHOWN: usize = 10;

        let mut listed = ids
            .iter()
            .take(SHOWN)
            .map(i64::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        if ids.len() > SHOWN {
            listed.push_str(&format!(", … (+{})", ids.len() - SHOWN));
        }

        Self {
            outcome,
            count: ids.len(),
            ids: listed,
        }
    }
}

fn report_rows(report: &ReconcileReport) -> Vec<ReportRow> {
    vec![
        ReportRow::new("created", &report.created_ids),
        ReportRow::new("updated", &report.updated_ids),
        ReportRow::new("linked", &report.linked_ids),
        ReportRow::new("re-enabled", &report.reenabled_ids),
        ReportRow::new("disabled", &report.disabled_ids),
    ]
}

/// Run a reconciliation pass for one user in the foreground.
///
/// Bypasses the trigger rate limit, which only guards the HTTP entry point.
/// Ctrl+C drops the pass before commit, leaving the store untouched.
pub(crate) async fn handle_sync(
    user: &str,
    output: OutputFormat,
    config: &Config,
    db: &Arc<DatabaseConnection>,
) -> Result<(), Box<dyn std::error::Error>> {
    let user = resolve_user(db, user).await?;
    let client = GitHubClient::new(config.client_config())?;
    let service = SyncService::new(
        Arc::clone(db),
        Arc::new(DbCredentialSource::new(Arc::clone(db))),
        Arc::new(client),
    );

    tracing::info!(user = %user.username, "starting sync pass");
    let result = tokio::select! {
        result = service.run_pass(user.id) => result,
        () = shutdown_signal() => Err(SyncError::Interrupted("cancelled by user".to_string())),
    };

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            return Err(format!("Sync for '{}' failed ({}): {e}", user.username, e.reason()).into());
        }
    };

    match output {
        OutputFormat::Table => {
            println!(
                "Fetched {} repositories for '{}', {} row(s) written.",
                report.fetched, user.username, report.applied_count
            );
            if report.truncated {
                println!("Listing was incomplete; no links were disabled.");
            }
            if !report.is_noop() {
                let mut table = Table::new(report_rows(&report));
                table.with(Style::rounded());
                println!("{table}");
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
