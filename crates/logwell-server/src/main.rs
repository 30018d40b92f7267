use clap::Parser;
use logwell_logging::LogwellSubscriberBuilder;
use logwell_server::{Cli, LogwellServer, ServerConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = ServerConfig::resolve(&cli)?;

    // Held until exit so file output is flushed
    let _log_guard = LogwellSubscriberBuilder::new()
        .with_config(config.log.clone())
        .try_init()?;

    info!(
        bind = %config.bind,
        data_file = %config.data_file.display(),
        "Starting logwell server"
    );

    LogwellServer::new(config).run().await?;
    Ok(())
}
