//! Write the config file.

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::Settings;

/// Run the init command.
///
/// Starts from the existing file, if any, and overwrites the given values.
pub async fn run(
    config_dir: &Path,
    api_url: Option<&str>,
    timeout_secs: Option<u64>,
    page_size: Option<u32>,
) -> Result<()> {
    let mut settings = Settings::load(config_dir)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Ignoring unreadable config, starting from defaults");
            Settings::default()
        });

    if let Some(url) = api_url {
        settings.api_url = url.trim_end_matches('/').to_string();
    }
    if let Some(secs) = timeout_secs {
        settings.timeout_secs = secs;
    }
    if let Some(size) = page_size {
        settings.page_size = size;
    }

    let path = settings
        .save(config_dir)
        .await
        .context("Failed to save configuration")?;

    println!("Configuration written to {}", path.display());
    println!("  api_url:      {}", settings.api_url);
    println!("  timeout_secs: {}", settings.timeout_secs);
    println!("  page_size:    {}", settings.page_size);
    Ok(())
}
