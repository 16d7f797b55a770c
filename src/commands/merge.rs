use crate::commands::{resolve_output, Report};
use crate::config::Config;
use crate::error::PdfileError;
use crate::paths::{normalize_path, require_extension};
use crate::pdf::document::save_document;
use crate::pdf::merge::{merge_files, MIN_INPUTS};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Expand directories into the PDF files directly inside them, sorted by name.
fn expand_inputs<P: AsRef<Path>>(inputs: &[P]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        let input = normalize_path(input);
        if input.is_dir() {
            let mut found = Vec::new();
            for entry in WalkDir::new(&input).min_depth(1).max_depth(1) {
                let entry = entry
                    .with_context(|| format!("Failed to read directory: {}", input.display()))?;
                let path = entry.into_path();
                if path.is_file() && require_extension(&path, &["pdf"]).is_ok() {
                    found.push(path);
                }
            }
            found.sort();
            files.extend(found);
        } else {
            files.push(input);
        }
    }
    Ok(files)
}

/// Check the inputs without touching the output side of the filesystem.
fn validate_inputs(inputs: &[PathBuf]) -> Result<(), PdfileError> {
    if inputs.len() < MIN_INPUTS {
        return Err(PdfileError::TooFewInputs {
            required: MIN_INPUTS,
            given: inputs.len(),
        });
    }
    inputs
        .iter()
        .try_for_each(|input| require_extension(input, &["pdf"]))
}

pub fn run<P: AsRef<Path>>(
    inputs: &[P],
    output: Option<&Path>,
    overwrite: bool,
    config: &Config,
) -> Result<Report> {
    let inputs = expand_inputs(inputs)?;
    validate_inputs(&inputs)?;

    let output = resolve_output(
        &inputs[0],
        output,
        "_merged",
        Some("pdf"),
        &config.output,
        overwrite,
    )?;

    let mut merged = merge_files(&inputs)?;
    let total_pages = merged.get_pages().len() as u32;
    save_document(&mut merged, &output, &config.compression)?;

    tracing::info!(files = inputs.len(), pages = total_pages, "merged");
    Ok(Report::new(
        &output,
        Some(total_pages),
        format!(
            "Merged {} files ({} pages) into {}",
            inputs.len(),
            total_pages,
            output.display()
        ),
    ))
}
