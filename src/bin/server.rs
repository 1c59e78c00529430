use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use vps_inventory::db::connect_and_migrate;
use vps_inventory::server::config::ServerConfig;
use vps_inventory::version::VERSION;
use vps_inventory::web::create_axum_router;

#[derive(Parser, Debug)]
#[command(author, version = VERSION, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<String>,
}

fn init_logging(log_dir: &Path) {
    // JSON, rotated daily
    let file_appender = rolling::daily(log_dir, "server.log");
    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .json();

    let stdout_layer = fmt::layer().with_writer(std::io::stdout);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sea_orm=warn,sqlx::query=warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received.");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    // Logging is not up yet, so configuration errors go to stderr.
    let server_config = match ServerConfig::load(args.config.as_deref()) {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("Failed to load server configuration: {e}");
            return Err(e.into());
        }
    };

    init_logging(Path::new(&server_config.log_dir));
    info!("Starting server, version: {}", VERSION);

    if server_config.uses_sqlite() {
        std::fs::create_dir_all(&server_config.data_dir)?;
    }

    let db_pool = connect_and_migrate(
        &server_config.resolved_database_url(),
        server_config.max_db_connections,
    )
    .await
    .map_err(|e| {
        error!("Failed to prepare the database: {}", e);
        e
    })?;

    let http_addr = server_config.http_addr.clone();
    let app = create_axum_router(db_pool, server_config)?;

    let listener = TcpListener::bind(&http_addr).await?;
    info!("HTTP server listening on {}", http_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped.");
    Ok(())
}
