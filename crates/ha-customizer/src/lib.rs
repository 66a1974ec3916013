//! Home Assistant customizer pipeline
//!
//! One run: back up the customize file, load it, fetch the live entities,
//! merge, render, and write the result (or hand it back for printing in
//! debug mode).

use anyhow::{Context, Result};
use ha_client::StateSource;
use ha_config::{CustomizerConfig, Settings};
use ha_customize::{
    persist, Classifier, CustomizeStore, Customizer, Integration, MergeOptions, MergeSummary,
    RenderOptions, Renderer, RunTimestamp, StoreFormat,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

mod logging;

pub use logging::{log_filter, subscriber};

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "HA_CUSTOMIZER_CONFIG";

/// Config file used when the environment does not name one
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// What a run did
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Rendered document
    pub output: String,
    /// File the document was written to, `None` in debug mode
    pub written: Option<PathBuf>,
    /// Backup that was written before processing
    pub backup: Option<PathBuf>,
    /// Shape the customize file was read in
    pub format: StoreFormat,
    pub summary: MergeSummary,
}

/// Load and resolve settings
///
/// `path` comes from the environment when set. Without it the default
/// `config.json` is used if present, otherwise the built-in defaults.
pub fn load_settings(path: Option<PathBuf>) -> Result<Settings> {
    let config = match path {
        Some(path) => CustomizerConfig::load(&path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            CustomizerConfig::load(DEFAULT_CONFIG_FILE)
                .with_context(|| format!("failed to load config from {}", DEFAULT_CONFIG_FILE))?
        }
        None => CustomizerConfig::default(),
    };

    Ok(config.resolve()?)
}

/// Build the merge-and-render pipeline described by `settings`
pub fn customizer_for(settings: &Settings) -> Customizer {
    let classifier = Classifier::new(
        settings.default_hidden,
        vec![
            Integration::new("haaska", settings.haaska_domains.iter().cloned()),
            Integration::new("homebridge", settings.homebridge_domains.iter().cloned()),
        ],
    );
    let merge_options = MergeOptions {
        key_date_added: settings.key_date_added.clone(),
        key_date_updated: settings.key_date_updated.clone(),
    };
    let renderer = Renderer::new(RenderOptions {
        double_quote_strings: settings.double_quote_strings,
    });

    Customizer::new(classifier, merge_options, renderer)
}

/// Run the pipeline once with the current time
pub async fn run(settings: &Settings, source: &dyn StateSource) -> Result<RunReport> {
    run_at(settings, source, RunTimestamp::now()).await
}

/// Run the pipeline once with a fixed timestamp
pub async fn run_at(
    settings: &Settings,
    source: &dyn StateSource,
    now: RunTimestamp,
) -> Result<RunReport> {
    let backup = match settings.customize_file_backup {
        Some(ref backup) if !settings.debug => {
            persist::write_backup(&settings.customize_file, backup).await?;
            Some(backup.clone())
        }
        _ => None,
    };

    let (store, format) = CustomizeStore::load(&settings.customize_file).await?;
    debug!("Loaded {} customized entities", store.len());

    let entities = source
        .fetch_states()
        .await
        .context("failed to fetch states")?;

    let customizer = customizer_for(settings);
    let outcome = customizer.merge(&entities, &store, &now);
    let summary = outcome.summary;
    info!(
        live = summary.live,
        added = summary.added,
        updated = summary.updated,
        unchanged = summary.unchanged,
        retained = summary.retained,
        "Merged customize data"
    );

    let output = customizer.render(&outcome.merged, &now)?;

    let written = if settings.debug {
        debug!("Debug mode, not writing {:?}", settings.customize_file_output);
        None
    } else {
        persist::write_output(&settings.customize_file_output, &output).await?;
        info!("{} has been updated", settings.customize_file_output.display());
        Some(settings.customize_file_output.clone())
    };

    Ok(RunReport {
        output,
        written,
        backup,
        format,
        summary,
    })
}
