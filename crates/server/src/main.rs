mod config;
mod http;

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::{bail, Result};
use api::schema::{build_schema, schema_sdl, seed_hr_demo, AppSchema};
use clap::{Parser, Subcommand, ValueEnum};
use migration::{Migrator, MigratorTrait};
use platform_db::{connect, DatabaseSettings};
use platform_obs::{init_tracing, ObsConfig};
use sea_orm::DatabaseConnection;
use tracing::info;

use crate::{config::AppConfig, http::AppState};

#[derive(Parser, Debug)]
#[command(name = "hrm-server", version, about = "HRM dashboard backend")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP + GraphQL server.
    Serve {
        /// Overrides `BIND`.
        #[arg(long)]
        bind: Option<SocketAddr>,
        #[arg(long, help = "Allow starting even when migrations are pending")]
        allow_dirty: bool,
    },
    /// Run database migrations.
    Migrate {
        #[arg(long, value_enum, default_value_t = MigrateAction::Up)]
        action: MigrateAction,
    },
    /// Insert demo departments, employees, attendance, payroll and reviews.
    Seed,
    /// Print the GraphQL SDL.
    PrintSchema {
        #[arg(long, value_name = "FILE", help = "Write to a file instead of stdout")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum MigrateAction {
    Up,
    Down,
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    init_tracing(ObsConfig::default().with_otlp_endpoint(config.otlp_endpoint.clone()))?;

    match cli.command {
        Command::Serve { bind, allow_dirty } => run_server(config, bind, allow_dirty).await,
        Command::Migrate { action } => run_migrations(action).await,
        Command::Seed => run_seed().await,
        Command::PrintSchema { output } => print_schema(output),
    }
}

async fn setup_pool() -> Result<DatabaseConnection> {
    let settings = DatabaseSettings::from_env()?;
    Ok(connect(&settings).await?)
}

async fn run_server(config: AppConfig, bind: Option<SocketAddr>, allow_dirty: bool) -> Result<()> {
    let auth = Arc::new(config.auth()?);
    let db = setup_pool().await?;
    ensure_migrations(&db, allow_dirty).await?;
    let AppSchema(schema) = build_schema(Arc::new(db));
    let state = AppState {
        schema,
        auth,
        cors_allowed_origins: Arc::new(config.cors_allowed_origins.clone()),
    };
    http::serve(bind.unwrap_or(config.bind), state).await
}

async fn ensure_migrations(db: &DatabaseConnection, allow_dirty: bool) -> Result<()> {
    let pending = Migrator::get_pending_migrations(db).await?;
    if !pending.is_empty() && !allow_dirty {
        bail!(
            "{} pending migrations; run `hrm-server migrate` or pass --allow-dirty",
            pending.len()
        );
    }
    Ok(())
}

async fn run_migrations(action: MigrateAction) -> Result<()> {
    let db = setup_pool().await?;
    match action {
        MigrateAction::Up => {
            Migrator::up(&db, None).await?;
            info!("database migrations applied");
        }
        MigrateAction::Down => {
            Migrator::down(&db, Some(1)).await?;
            info!("most recent migration rolled back");
        }
        MigrateAction::Reset => {
            Migrator::reset(&db).await?;
            info!("all migrations rolled back");
        }
    }
    Ok(())
}

async fn run_seed() -> Result<()> {
    let db = setup_pool().await?;
    Migrator::up(&db, None).await?;
    let seeded = seed_hr_demo(&db).await?;
    info!(
        departments = seeded.departments.len(),
        employees = seeded.employees.len(),
        "demo data seeded"
    );
    Ok(())
}

fn print_schema(output: Option<PathBuf>) -> Result<()> {
    let sdl = schema_sdl();
    match output {
        Some(path) => {
            std::fs::write(&path, sdl)?;
            info!(path = %path.display(), "schema written");
        }
        None => println!("{sdl}"),
    }
    Ok(())
}
