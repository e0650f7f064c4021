//! Schema migration commands.

use repolink::db;
use repolink::migration::{Migrator, MigratorTrait};

use crate::MigrateAction;

pub(crate) async fn handle_migrate(
    action: MigrateAction,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    // Plain connect: `connect_and_migrate` would apply pending migrations
    // before `down` or `status` got a chance to run.
    let db = db::connect(database_url).await?;

    match action {
        MigrateAction::Up => {
            let pending = Migrator::get_pending_migrations(&db).await?;
            if pending.is_empty() {
                println!("Schema is up to date.");
                return Ok(());
            }
            println!("Applying {} migration(s)...", pending.len());
            Migrator::up(&db, None).await?;
            println!("Migrations applied.");
        }
        MigrateAction::Down => {
            println!("Rolling back the most recent migration...");
            Migrator::down(&db, Some(1)).await?;
            println!("Rollback complete.");
        }
        MigrateAction::Status => {
            println!("Migration status:");
            Migrator::status(&db).await?;
        }
        MigrateAction::Fresh => {
            tracing::warn!("dropping every table, stored users and repositories are lost");
            Migrator::fresh(&db).await?;
            println!("Schema recreated from scratch.");
        }
    }

    Ok(())
}
