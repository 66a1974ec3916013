//! Home Assistant Customizer
//!
//! Main entry point: loads configuration, then runs the pipeline once
//! against the configured Home Assistant instance.

use anyhow::Result;
use ha_client::HaClient;
use ha_customizer::{load_settings, log_filter, run, subscriber, CONFIG_ENV};
use std::path::PathBuf;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);

    // The configured level is only known once the config is loaded
    let settings = tracing::subscriber::with_default(
        subscriber(log_filter(false), std::io::stderr),
        || load_settings(config_path),
    )?;

    // Initialize tracing
    tracing::subscriber::set_global_default(subscriber(
        log_filter(settings.debug),
        std::io::stderr,
    ))?;

    info!("Updating {}", settings.customize_file.display());

    let client = HaClient::new(
        &settings.api_url,
        settings.api_token.clone(),
        settings.api_password.clone(),
    )?;
    let report = run(&settings, &client).await?;

    if report.written.is_none() {
        eprintln!("{}", report.output);
    }

    Ok(())
}
