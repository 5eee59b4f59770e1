use anyhow::Context;
use trivia_api::config::get_configuration;
use trivia_api::db;
use trivia_api::server::app::run_server;
use trivia_api::telemetry::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let settings = get_configuration().context("Failed to read configuration")?;
    let db_path = &settings.database.path;
    let pool = db::establish_connection(db_path)
        .await
        .with_context(|| format!("Cannot open database {}", db_path.display()))?;

    tracing::info!("Running db migrations...");
    db::run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;

    run_server(pool, &settings.application.address()).await
}
