use std::path::PathBuf;

use clap::Parser;
use wealthplan_server::{app, config::ServerConfig, db, logging::init_logging};

#[derive(Parser, Debug)]
#[command(name = "wealthplan-server")]
#[command(about = "Wealth projection and advisory API server")]
struct Args {
    /// Path to a YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on (default: 0.0.0.0:3001)
    #[arg(short, long)]
    bind: Option<String>,

    /// SQLite database path, or :memory:
    #[arg(short, long)]
    database: Option<String>,

    /// Log level (debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let mut config = ServerConfig::load(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.bind = bind;
    }
    if let Some(database) = args.database {
        config.database = database;
    }
    if let Some(level) = args.log_level {
        config.log_level = level;
    }

    init_logging(&config.log_level)?;

    let conn = db::open(&config.database)?;
    tracing::info!(database = %config.database, "database ready");

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app(conn, config.defaults)).await?;

    tracing::info!("server shutting down");
    Ok(())
}
