use adminserver_config::{ConfigLoader, ServiceConfig, Validatable};
use adminserver_server::{init_logging, Server};
use anyhow::{Context, Result};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "adminserver")]
#[command(about = "Configuration admin server")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Address to bind (overrides ADMINSERVER_BIND_ADDRESS)
    #[arg(long, value_name = "ADDRESS")]
    bind: Option<String>,

    /// Port to listen on (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Log level (overrides LOG_LEVEL)
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Validate the settings, print them and exit
    #[arg(long)]
    check_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ConfigLoader::new()
        .load()
        .context("Failed to load server settings")?;
    apply_cli_overrides(&mut config, &cli);
    config.validate().context("Invalid server settings")?;

    if cli.check_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    init_logging(&config.log_level, config.log_format);
    tracing::info!("Starting admin server v{}", env!("CARGO_PKG_VERSION"));

    Server::new(config).await?.start().await
}

fn apply_cli_overrides(config: &mut ServiceConfig, cli: &Cli) {
    if let Some(bind) = &cli.bind {
        config.bind_address = bind.clone();
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.to_lowercase();
    }
}
