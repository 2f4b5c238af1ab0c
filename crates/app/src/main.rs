use std::{path::Path, sync::Arc, time::Duration};

use clap::Parser;
use cloud::{MemoryDatabase, PostgrestClient, RemoteAdapter, RemoteDatabase};
use migration::{Migrator, MigratorTrait};
use settings::{Args, Command, Database, Settings};
use store::{Backup, Store};
use sync::SyncEngine;

use crate::error::Result;

mod error;
mod settings;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let settings = settings::load(&args)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "howmuch={level},sync={level},cloud={level},store={level}",
            level = settings.level
        ))
        .init();

    let db = parse_database(&settings.database).await?;
    let store = Store::builder().database(db).build();
    store.seed_defaults().await?;

    match args.command {
        Command::Sync { owner, .. } => sync(store, &settings, &owner).await,
        Command::Export { path } => export(&store, &path).await,
        Command::Import { path } => import(&store, &path).await,
        Command::Reset => {
            store.clear_all().await?;
            Ok(())
        }
    }
}

async fn parse_database(config: &Database) -> Result<sea_orm::DatabaseConnection> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}

fn remote_database(settings: &Settings) -> Result<Arc<dyn RemoteDatabase>> {
    let Some(remote) = &settings.remote else {
        tracing::warn!("no remote configured, syncing to an in-memory database");
        return Ok(Arc::new(MemoryDatabase::new()));
    };
    let client = PostgrestClient::builder()
        .url(&remote.url)
        .api_key(&remote.api_key)
        .access_token(remote.access_token.as_deref())
        .timeout(Duration::from_secs(remote.request_timeout_secs))
        .build()?;
    Ok(Arc::new(client))
}

async fn sync(store: Store, settings: &Settings, owner: &str) -> Result<()> {
    let remote = RemoteAdapter::new(remote_database(settings)?);
    let engine = SyncEngine::new(Arc::new(store), remote)
        .with_interval(Duration::from_secs(settings.sync.interval_secs));

    let initial = engine.start_session(owner).await?;
    tracing::info!(owner, ?initial, "syncing, press Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;
    tracing::info!("flushing local changes before exit");
    let flushed = engine.force_sync_now().await;
    engine.end_session().await;

    let report = flushed?;
    for (kind, message) in report.failures() {
        tracing::error!(%kind, "last push failed: {message}");
    }
    Ok(())
}

async fn export(store: &Store, path: &Path) -> Result<()> {
    let backup = store.export_backup().await?;
    let json = serde_json::to_string_pretty(&backup)?;
    tokio::fs::write(path, json).await?;
    tracing::info!(path = %path.display(), "exported backup");
    Ok(())
}

async fn import(store: &Store, path: &Path) -> Result<()> {
    let json = tokio::fs::read_to_string(path).await?;
    let backup: Backup = serde_json::from_str(&json)?;
    store.import_backup(backup).await?;
    Ok(())
}
