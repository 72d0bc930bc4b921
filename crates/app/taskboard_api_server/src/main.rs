//! Taskboard API server binary.
//!
//! Reads configuration from the environment (and `.env`), connects to
//! PostgreSQL and runs migrations, then serves the REST API until Ctrl-C.

use std::sync::Arc;

use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use taskboard_api::AppState;
use taskboard_api::config::ApiConfig;
use taskboard_core::store::Store;
use taskboard_core::store::memory::MemoryStore;
use taskboard_core::store::postgres::PgStore;
use tracing::{error, info, warn};

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "taskboard_api_server", about = "Taskboard API server")]
struct Args {
    /// Port to listen on; overrides the port in `BIND_ADDR` (0 = ephemeral).
    #[arg(long)]
    port: Option<u16>,

    /// PostgreSQL connection URL.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Maximum number of database connections in the pool.
    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = 5)]
    max_connections: u32,

    /// Keep all data in process memory instead of PostgreSQL. Data is lost on
    /// exit.
    #[arg(long, env = "TASKBOARD_IN_MEMORY", default_value_t = false)]
    in_memory: bool,
}

/// Replace the port of a `host:port` bind address.
fn with_port(bind_addr: &str, port: u16) -> String {
    let host = bind_addr
        .rsplit_once(':')
        .map_or(bind_addr, |(host, _)| host);
    format!("{host}:{port}")
}

async fn open_store(
    args: &Args,
    config: &ApiConfig,
) -> Result<Arc<dyn Store>, Box<dyn std::error::Error>> {
    if args.in_memory {
        warn!("using in-memory store, data will not survive a restart");
        return Ok(Arc::new(MemoryStore::new()));
    }

    info!(max_connections = args.max_connections, "configuring connection pool");
    let pool = PgPoolOptions::new()
        .max_connections(args.max_connections)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .connect(&config.database_url)
        .await?;

    let store = PgStore::new(pool);
    info!("running database migrations");
    store.migrate().await?;
    Ok(Arc::new(store))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
    }
    info!("shutting down");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("info,taskboard_api=debug,taskboard_core=debug")
            }),
        )
        .init();

    let args = Args::parse();

    let mut config = match ApiConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return Err(e.into());
        }
    };
    if let Some(port) = args.port {
        config.bind_addr = with_port(&config.bind_addr, port);
    }
    if let Some(url) = &args.database_url {
        config.database_url = url.clone();
    }

    info!(bind_addr = %config.bind_addr, in_memory = args.in_memory, "starting taskboard_api_server");

    let store = open_store(&args, &config).await?;
    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(store, config)?;
    let app = taskboard_api::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %listener.local_addr()?, "REST API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_override_keeps_host() {
        assert_eq!(with_port("127.0.0.1:3100", 8080), "127.0.0.1:8080");
        assert_eq!(with_port("0.0.0.0:0", 1), "0.0.0.0:1");
        assert_eq!(with_port("localhost", 9), "localhost:9");
    }

    #[test]
    fn args_parse_flags() {
        let args = Args::parse_from(["taskboard_api_server", "--port", "4000", "--in-memory"]);
        assert_eq!(args.port, Some(4000));
        assert!(args.in_memory);
        assert_eq!(args.max_connections, 5);
    }

    #[test]
    fn database_flags_fall_back_to_env() {
        let cmd = <Args as clap::CommandFactory>::command();
        let env_of = |id: &str| {
            cmd.get_arguments()
                .find(|a| a.get_id() == id)
                .and_then(|a| a.get_env())
                .map(|v| v.to_string_lossy().into_owned())
        };
        assert_eq!(env_of("database_url").as_deref(), Some("DATABASE_URL"));
        assert_eq!(
            env_of("max_connections").as_deref(),
            Some("DATABASE_MAX_CONNECTIONS")
        );
        assert_eq!(env_of("in_memory").as_deref(), Some("TASKBOARD_IN_MEMORY"));
    }
}
