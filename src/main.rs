use clap::Parser;
use livebook::cli::Cli;
use livebook::infrastructure::config::settings::Config;
use livebook::infrastructure::runtime::run_with_shutdown;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let mut config = match Config::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config {}: {e}", cli.config.display());
            std::process::exit(1);
        }
    };

    config
        .logging
        .apply_overrides(cli.log_level.as_deref(), cli.json_logs);
    config.init_logging();
    info!(config = %cli.config.display(), "livebook starting");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut runner = tokio::spawn(run_with_shutdown(config, shutdown_rx));

    let result = tokio::select! {
        joined = &mut runner => joined?,
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received");
            let _ = shutdown_tx.send(true);
            runner.await?
        }
    };

    if let Err(e) = result {
        error!(error = %e, details = ?e, "Fatal error");
        std::process::exit(1);
    }

    info!("livebook stopped");
    Ok(())
}
