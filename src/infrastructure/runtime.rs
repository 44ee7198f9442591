//! Process runtime: wire the components and drive the polling loop.

use tokio::sync::watch;
use tracing::info;

use super::bootstrap::{build_connector, build_scheduler, build_sinks};
use crate::error::Result;
use crate::infrastructure::config::settings::Config;

/// Run until `shutdown` carries `true`.
///
/// Sinks are opened and the first login happens before the loop starts; a
/// failure in either is returned instead of retried.
///
/// # Errors
///
/// Returns an error if a sink cannot be opened, credentials are missing, or
/// the initial login fails.
pub async fn run_with_shutdown(config: Config, shutdown: watch::Receiver<bool>) -> Result<()> {
    let sinks = build_sinks(&config.sinks)?;
    info!(sinks = ?sinks.names(), "Sinks initialized");

    let connector = build_connector(&config)?;
    let scheduler = build_scheduler(&config, connector, sinks).await?;

    scheduler.run(shutdown).await;
    Ok(())
}
