//! pagetree: file-based routing and rendering engine.
//!
//! Directories become routes: a `route.rhai` script answers HTTP methods,
//! a `page.html` renders GET, `layout.html` fragments nest along the
//! directory chain, and a root `document.html` wraps every page.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌───────────────────────────────────────────────┐
//!                         │                   PAGETREE                    │
//!    Client Request       │  ┌────────┐    ┌──────────┐    ┌───────────┐  │
//!    ─────────────────────┼─▶│  http  │───▶│ dispatch │───▶│  routing  │  │
//!                         │  │ server │    │ (decide) │    │   table   │  │
//!                         │  └────────┘    └────┬─────┘    └─────▲─────┘  │
//!                         │                     │                │ swap   │
//!                         │          ┌──────────┴────────┐   ┌───┴────┐   │
//!                         │          ▼                   ▼   │ watch  │   │
//!                         │   ┌────────────┐      ┌─────────┐│ (dev)  │   │
//!    Client Response      │   │  handler   │      │ render  │└────────┘   │
//!    ◀────────────────────┼───│ rhai cache │      │ compose │             │
//!                         │   └────────────┘      └─────────┘             │
//!                         │                                               │
//!                         │   config · lifecycle · observability          │
//!                         └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use arc_swap::ArcSwap;
use clap::Parser;
use tokio::net::TcpListener;

use pagetree::config::{self, PagetreeConfig};
use pagetree::handler::HandlerCache;
use pagetree::http::HttpServer;
use pagetree::lifecycle::Shutdown;
use pagetree::observability::{logging, metrics};
use pagetree::routing::RouteTable;
use pagetree::watch::DevReloader;

/// File-based routing and rendering engine.
#[derive(Parser, Debug)]
#[command(name = "pagetree", version, about)]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, default_value = "pagetree.toml")]
    config: PathBuf,

    /// Force dev mode (filesystem watching) on.
    #[arg(long)]
    dev: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let cli = Cli::parse();
    tracing::info!("pagetree v0.1.0 starting");

    // Load configuration; a missing file just means defaults.
    let mut config = if cli.config.is_file() {
        config::load_config(&cli.config)?
    } else {
        tracing::info!(file = ?cli.config, "No config file found, using defaults");
        PagetreeConfig::default()
    };
    config::apply_env_overrides(&mut config);
    if cli.dev {
        config.dev.enabled = true;
    }
    tracing::info!(
        bind_address = %config.server.bind_address,
        root = ?config.app.root,
        route_file = %config.app.route_file,
        dev = config.dev.enabled,
        "Configuration loaded"
    );

    // Build the initial route table
    let table = RouteTable::build(&config.app.root, &config.app.route_file, 0)?;
    let routes: Vec<&str> = table.routes().iter().map(|r| r.path.as_str()).collect();
    tracing::info!(?routes, "Routes loaded");
    metrics::record_routes(table.len());
    let table = Arc::new(ArcSwap::from_pointee(table));
    let handlers = Arc::new(HandlerCache::new());

    // Metrics exporter
    if config.observability.metrics_enabled {
        if let Ok(address) = config.observability.metrics_address.parse() {
            metrics::init_exporter(address);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    // Dev reloader
    let shutdown = Shutdown::new();
    if config.dev.enabled {
        DevReloader::new(
            config.app.root.clone(),
            config.app.route_file.clone(),
            config.dev.debounce_ms,
            table.clone(),
        )
        .spawn(shutdown.subscribe())?;
    }

    // Bind and serve
    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config, table, handlers);
    server.run(listener).await?;

    shutdown.trigger();
    tracing::info!("Shutdown complete");
    Ok(())
}
