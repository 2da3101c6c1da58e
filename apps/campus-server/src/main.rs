use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs, DatabaseConfig};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use users_projects::config::UsersProjectsConfig;
use users_projects::UsersProjects;

mod request_id;
mod shutdown;
mod web;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const MODULE_NAME: &str = "users_projects";

/// Campus Registry Server - users and projects REST API
#[derive(Parser)]
#[command(name = "campus-server")]
#[command(about = "Campus Registry Server - users and projects REST API")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("Campus Registry Server starting");

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, args).await,
        Commands::Check => check_config(config),
    }
}

/// Connection URL to use: in-memory SQLite for `--mock`, otherwise the
/// configured URL with relative SQLite paths resolved under `home_dir`.
fn database_url(db: Option<&DatabaseConfig>, home_dir: &Path, mock: bool) -> Result<String> {
    if mock {
        return Ok("sqlite::memory:".to_string());
    }
    let db = db.ok_or_else(|| anyhow!("Database configuration missing (use --mock to run in memory)"))?;
    if db.url.trim().is_empty() {
        return Err(anyhow!("Database URL not configured"));
    }
    db.resolved_url(home_dir)
}

async fn connect(config: &AppConfig, mock: bool) -> Result<DatabaseConnection> {
    let url = database_url(
        config.database.as_ref(),
        Path::new(&config.server.home_dir),
        mock,
    )?;

    let mut opts = ConnectOptions::new(url.clone());
    opts.acquire_timeout(Duration::from_secs(5))
        .sqlx_logging(false);
    if mock {
        // The shared in-memory database is dropped once its last connection
        // closes, and shared-cache table locks fail with SQLITE_LOCKED
        // instead of waiting on busy_timeout. One pinned connection avoids
        // both.
        opts.max_connections(1).min_connections(1);
    } else if let Some(db) = &config.database {
        if let Some(max) = db.max_conns {
            opts.max_connections(max);
        }
        let busy = Duration::from_millis(u64::from(db.busy_timeout_ms.unwrap_or(5000)));
        opts.map_sqlx_sqlite_opts(move |o| o.busy_timeout(busy));
    }

    tracing::info!("Connecting to database: {}", url);
    let db = Database::connect(opts)
        .await
        .with_context(|| format!("Failed to connect to {url}"))?;
    tracing::info!("Connected DB backend: {:?}", db.get_database_backend());
    Ok(db)
}

async fn run_server(config: AppConfig, args: CliArgs) -> Result<()> {
    tracing::info!("Initializing modules...");

    let db = connect(&config, args.mock).await?;
    UsersProjects::migrate(&db).await?;

    let module_cfg = UsersProjectsConfig::from_value(config.module(MODULE_NAME))?;
    let module = UsersProjects::new(db, &module_cfg);

    let timeout = (config.server.timeout_sec > 0)
        .then(|| Duration::from_secs(config.server.timeout_sec));
    let router = web::build_router(&module, timeout);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "Invalid bind address {}:{}",
                config.server.host, config.server.port
            )
        })?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("HTTP server bound on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = shutdown::wait_for_shutdown().await {
                tracing::error!("Failed to listen for shutdown signals: {}", e);
            }
            tracing::info!("HTTP server shutting down gracefully");
        })
        .await?;

    tracing::info!("Campus Registry Server stopped");
    Ok(())
}

fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    UsersProjectsConfig::from_value(config.module(MODULE_NAME))?;
    if let Some(db) = &config.database {
        db.resolved_url(Path::new(&config.server.home_dir))?;
    }

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}
