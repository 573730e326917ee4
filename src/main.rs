use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use std::{fmt::Debug, path::PathBuf};
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use jobs_server::config;
use jobs_server::job::{JobManager, SqliteJobStore};
use jobs_server::server::{metrics, run_server, RequestsLoggingLevel};
use jobs_server::user::{SqliteUserStore, UserManager};

fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(format!("Error resolving path '{}': {}", s, msg));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir().map_err(|e| format!("Failed to get current dir: {}", e))?;
    Ok(cwd.join(original_path))
}

fn parse_dir(s: &str) -> Result<PathBuf, String> {
    let path = parse_path(s)?;
    if !path.exists() {
        return Err(format!("Directory does not exist: {}", s));
    }
    if !path.is_dir() {
        return Err(format!("Path is not a directory: {}", s));
    }
    Ok(path)
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Directory containing database files (jobs.db, user.db).
    /// Can also be specified in config file.
    #[clap(long, value_parser = parse_dir)]
    pub db_dir: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = 9091)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,

    /// Number of days an auth token can stay unused before being pruned. Set to 0 to disable pruning.
    #[clap(long, default_value_t = 30)]
    pub token_retention_days: u64,

    /// Interval in hours between pruning runs. Only used if token_retention_days > 0.
    #[clap(long, default_value_t = 24)]
    pub prune_interval_hours: u64,
}

impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            db_dir: args.db_dir.clone(),
            port: args.port,
            metrics_port: args.metrics_port,
            logging_level: args.logging_level.clone(),
            frontend_dir_path: args.frontend_dir_path.clone(),
            token_retention_days: args.token_retention_days,
            prune_interval_hours: args.prune_interval_hours,
        }
    }
}

fn spawn_token_pruning(user_manager: UserManager, retention_days: u64, interval_hours: u64) {
    info!(
        "Auth token pruning enabled: retaining {} days, pruning every {} hours",
        retention_days, interval_hours
    );

    tokio::spawn(async move {
        let interval = Duration::from_secs(interval_hours.max(1) * 60 * 60);
        let mut ticker = tokio::time::interval(interval);

        // Skip the first immediate tick, wait for the first interval
        ticker.tick().await;

        loop {
            ticker.tick().await;

            match user_manager.prune_unused_auth_tokens(retention_days) {
                Ok(count) => {
                    metrics::record_pruned_auth_tokens(count);
                    if count > 0 {
                        info!("Pruned {} unused auth tokens", count);
                    }
                }
                Err(e) => {
                    error!("Failed to prune auth tokens: {:#}", e);
                }
            }
        }
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()?;

    // Load TOML config if provided
    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(config::FileConfig::load(path)?)
        }
        None => None,
    };

    // Resolve final configuration (TOML overrides CLI)
    let cli_config: config::CliConfig = (&cli_args).into();
    let app_config = config::AppConfig::resolve(&cli_config, file_config)?;

    info!("Configuration loaded:");
    info!("  db_dir: {:?}", app_config.db_dir);
    info!("  port: {}", app_config.port);
    info!("  logging_level: {}", app_config.logging_level);

    info!(
        "Opening SQLite jobs database at {:?}...",
        app_config.jobs_db_path()
    );
    let job_store = Arc::new(SqliteJobStore::new(app_config.jobs_db_path())?);
    let job_manager = JobManager::new(job_store);

    info!(
        "Opening SQLite user database at {:?}...",
        app_config.user_db_path()
    );
    let user_manager = UserManager::new(Box::new(SqliteUserStore::new(
        app_config.user_db_path(),
    )?));

    info!("Initializing metrics...");
    metrics::init_metrics();

    if app_config.token_retention_days > 0 {
        // own connection, SQLite's busy timeout arbitrates with the server's one
        let pruning_manager = UserManager::new(Box::new(SqliteUserStore::new(
            app_config.user_db_path(),
        )?));
        spawn_token_pruning(
            pruning_manager,
            app_config.token_retention_days,
            app_config.prune_interval_hours,
        );
    }

    info!("Ready to serve at port {}!", app_config.port);
    info!("Metrics available at port {}!", app_config.metrics_port);
    run_server(app_config.server_config(), job_manager, user_manager).await
}
