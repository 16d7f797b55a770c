//! `config` and `config reset`.

use crate::config::{Config, ConfigStore};
use anyhow::Result;

/// Render the effective configuration and where it lives.
pub fn show(store: &ConfigStore, config: &Config) -> Result<String> {
    Ok(format!(
        "# {}\n{}",
        store.path().display(),
        serde_json::to_string_pretty(config)?
    ))
}

pub fn reset(store: &ConfigStore) -> Result<String> {
    store.reset()?;
    Ok(format!(
        "Configuration reset to defaults: {}",
        store.path().display()
    ))
}
