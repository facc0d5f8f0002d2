use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use movie_gateway::cache::MovieCache;
use movie_gateway::config::load_config;
use movie_gateway::lifecycle::{wait_for_signal, Shutdown};
use movie_gateway::observability::{logging::init_logging, metrics::init_metrics};
use movie_gateway::{HttpServer, ServicesApiServer};

#[derive(Parser)]
#[command(name = "movie-gateway")]
#[command(about = "Public and services API gateway for the movie reviews platform", long_about = None)]
struct Args {
    /// TOML configuration file; defaults and environment variables apply without one
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Validate the configuration and exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    init_logging(&config.observability);

    if args.check {
        tracing::info!("Configuration is valid");
        return Ok(());
    }

    tracing::info!(
        public_address = %config.listener.bind_address,
        services_api_enabled = config.services_api.enabled,
        services_api_address = %config.services_api.bind_address,
        cache = ?config.cache.backend,
        "movie-gateway v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let cache = MovieCache::connect(&config.cache).await;
    let shutdown = Shutdown::new();

    let services_api = if config.services_api.enabled {
        let server = ServicesApiServer::new(&config)?;
        let listener = TcpListener::bind(&config.services_api.bind_address).await?;
        Some(tokio::spawn(server.run(listener, shutdown.subscribe())))
    } else {
        None
    };

    let public_listener = TcpListener::bind(&config.listener.bind_address).await?;
    let public_api = tokio::spawn(HttpServer::new(config, cache)?.run(public_listener, shutdown.subscribe()));

    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            wait_for_signal().await;
            shutdown.trigger();
        }
    });

    public_api.await??;
    if let Some(services_api) = services_api {
        services_api.await??;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
