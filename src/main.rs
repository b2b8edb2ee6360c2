use std::path::PathBuf;

use clap::Parser;

use plainhttp::config::{loader::read_config, validate_config, ConfigError, ServerConfig};
use plainhttp::lifecycle::signals::wait_for_signal;
use plainhttp::net::Listener;
use plainhttp::observability::init_logging;
use plainhttp::{HttpServer, Shutdown};

#[derive(Parser, Debug)]
#[command(name = "plainhttp")]
#[command(about = "Minimal HTTP/1.1 server with echo, user-agent and file routes", long_about = None)]
struct Cli {
    /// Base directory for the /files routes
    #[arg(long)]
    directory: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overriding the configuration
    #[arg(long)]
    bind: Option<String>,
}

impl Cli {
    fn into_config(self) -> Result<ServerConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => ServerConfig::default(),
        };

        if let Some(directory) = self.directory {
            config.files.directory = directory;
        }
        if let Some(bind) = self.bind {
            config.listener.bind_address = bind;
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;
    init_logging(&config.observability)?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        directory = %config.files.directory.display(),
        read_timeout_secs = config.timeouts.read_secs,
        "Configuration loaded"
    );

    let listener = Listener::bind(&config.listener).await?;

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config);
    let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    wait_for_signal().await?;
    shutdown.trigger();
    server_task.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}
