pub mod config;
pub mod image;
pub mod insert_date;
pub mod install;
pub mod merge;
pub mod pages;
pub mod sign;
pub mod to_word;

use crate::config::OutputConfig;
use crate::paths::{check_overwrite, normalize_path, output_path};
use anyhow::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// What a finished command reports: printed by the CLI, serialized by the MCP server.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
    pub message: String,
}

impl Report {
    pub fn new<P: AsRef<Path>>(output: P, page_count: Option<u32>, message: String) -> Self {
        Report {
            output: output.as_ref().display().to_string(),
            page_count,
            message,
        }
    }
}

/// Where a command writes: the explicit `-o` path, or one derived from the input.
pub fn resolve_output(
    input: &Path,
    explicit: Option<&Path>,
    suffix: &str,
    extension: Option<&str>,
    config: &OutputConfig,
    overwrite: bool,
) -> Result<PathBuf> {
    let output = match explicit {
        Some(path) => normalize_path(path),
        None => output_path(input, suffix, extension, config),
    };
    check_overwrite(&output, overwrite)?;
    tracing::debug!(input = %input.display(), output = %output.display(), "resolved output");
    Ok(output)
}
