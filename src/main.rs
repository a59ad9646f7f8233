//! Function Gateway Entry Point
//!
//! `function-gateway [serve|describe]`
//!
//! - `serve` (default): load the handler directories, start the reload
//!   watcher and serve HTTP until Ctrl-C.
//! - `describe`: load the handler directories and write the catalog to the
//!   configured output path, or to stdout.

use anyhow::{Context, Result, bail};
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

use function_gateway::core::{Config, GatewayServer, GatewayService, config::LoggingConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration from the optional file and environment
    let config = Config::load()?;

    // Initialize logging
    init_logging(&config.logging);

    let command = std::env::args().nth(1).unwrap_or_else(|| "serve".to_string());
    if !matches!(command.as_str(), "serve" | "describe") {
        bail!("unknown command '{command}' (expected 'serve' or 'describe')");
    }

    info!("Starting {} v{}", config.server.name, config.server.version);
    if let Some(origin) = &config.origin {
        info!("Configuration loaded from {}", origin.display());
    }
    info!("Handler directories: {:?}", config.handlers.sources);

    let output_path = config.catalog.output_path.clone();
    let server = GatewayServer::new(config);

    let snapshot = server
        .reload()
        .context("failed to load handler directories")?;
    info!("Loaded handlers: {:?}", snapshot.names());

    match command.as_str() {
        "serve" => {
            if let Some(path) = &output_path {
                server.write_catalog(path)?;
            }

            GatewayService::new(server).run().await?;
            info!("Server shutting down");
        }
        // describe
        _ => match &output_path {
            Some(path) => server.write_catalog(path)?,
            None => println!("{}", server.catalog()?.to_json()?),
        },
    }

    Ok(())
}

/// Initialize the logging subsystem.
///
/// Configures tracing with the specified log level and format. Logs go to
/// stderr so `describe` can print the catalog on stdout.
fn init_logging(logging: &LoggingConfig) {
    let level = match logging.level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr);

    if logging.with_timestamps {
        builder.init();
    } else {
        builder.without_time().init();
    }
}
