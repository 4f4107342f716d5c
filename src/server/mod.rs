pub mod app;
pub mod auth;
pub mod error;
pub mod handlers;
pub mod policy;

use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum MigrateDirection {
    Up,
    Down,
    Fresh,
}

use crate::config::Config;
use crate::database::{connection::*, migrations::Migrator};
use anyhow::Result;
use sea_orm_migration::prelude::*;
use tracing::info;

pub async fn start_server(port: u16, database_path: &str, cors_origin: Option<&str>) -> Result<()> {
    let database_url = get_database_url(Some(database_path));
    let db = establish_connection(&database_url).await?;

    // Run migrations
    Migrator::up(&db, None).await?;
    info!("Database migrations completed");

    let config = Config::from_env();
    tokio::fs::create_dir_all(&config.upload_dir).await?;

    let app = app::create_app(db, config, cors_origin).await?;

    log_routes(port);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("Server running on http://0.0.0.0:{}", port);

    axum::serve(listener, app).await?;

    Ok(())
}

fn log_routes(port: u16) {
    info!("API Endpoints:");
    info!("  /health                     - Health check");
    info!("  /docs                       - Swagger UI documentation");
    info!("  /api/v1/auth/*              - Register and login");
    info!("  /api/v1/projects/*          - Projects, phases, tasks, members, notes, budget, files");
    info!("  /api/v1/phase-details/*     - Phase detail trees and detail notes");
    info!("");
    info!("Base URL: http://localhost:{}/api/v1", port);
}

pub async fn migrate_database(database_path: &str, direction: MigrateDirection) -> Result<()> {
    let database_url = get_database_url(Some(database_path));
    let db = establish_connection(&database_url).await?;

    match direction {
        MigrateDirection::Up => {
            info!("Running migrations up");
            Migrator::up(&db, None).await?;
        }
        MigrateDirection::Down => {
            info!("Running migrations down");
            Migrator::down(&db, None).await?;
        }
        MigrateDirection::Fresh => {
            info!("Running fresh migrations (down then up)");
            Migrator::down(&db, None).await?;
            Migrator::up(&db, None).await?;
        }
    }

    info!("Database migration completed");
    Ok(())
}
