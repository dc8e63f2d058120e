//! Database migration runner for Procura.
//!
//! Usage:
//!   migrator up      - Run all pending migrations
//!   migrator down    - Rollback last migration
//!   migrator status  - Show migration status
//!   migrator fresh   - Drop all tables and re-run migrations
//!
//! The database URL and log settings come from `AppConfig`
//! (`PROCURA__DATABASE__URL`, `.env`, `config/*.toml`).

use anyhow::{Context, bail};
use procura_db::migration::{Migrator, MigratorTrait};
use procura_shared::{AppConfig, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load_with_dotenv().context("failed to load configuration")?;
    telemetry::init_tracing(&config.log);

    let command = std::env::args().nth(1).unwrap_or_else(|| "up".to_string());

    let db = procura_db::connect_with_config(&config.database)
        .await
        .context("failed to connect to database")?;

    match command.as_str() {
        "up" => {
            Migrator::up(&db, None).await?;
            tracing::info!("migrations applied");
        }
        "down" => {
            Migrator::down(&db, Some(1)).await?;
            tracing::info!("last migration rolled back");
        }
        "fresh" => {
            Migrator::fresh(&db).await?;
            tracing::info!("database recreated");
        }
        "status" => {
            let applied = Migrator::get_applied_migrations(&db).await?.len();
            let pending = Migrator::get_pending_migrations(&db).await?.len();
            tracing::info!(applied, pending, "migration status");
        }
        other => bail!("unknown command `{other}`; expected up, down, status or fresh"),
    }

    Ok(())
}
