//! `remove-pages` and `reorder-pages`.

use crate::commands::{resolve_output, Report};
use crate::config::Config;
use crate::error::PdfileError;
use crate::page_range::parse_page_list;
use crate::paths::{normalize_path, require_extension};
use crate::pdf::PdfDocument;
use anyhow::Result;
use std::path::Path;

fn required_pages(pages: Option<&str>) -> Result<&str, PdfileError> {
    pages.ok_or(PdfileError::EmptySelection)
}

pub fn remove(
    input: &Path,
    pages: Option<&str>,
    output: Option<&Path>,
    overwrite: bool,
    config: &Config,
) -> Result<Report> {
    let input = normalize_path(input);
    require_extension(&input, &["pdf"])?;
    let selection = parse_page_list(required_pages(pages)?)?;
    let output = resolve_output(&input, output, "_removed", None, &config.output, overwrite)?;

    let mut doc = PdfDocument::open(&input)?;
    let removed = doc.remove_pages(&selection)?;
    let remaining = doc.page_count();
    doc.save(&output, &config.compression)?;

    tracing::info!(removed, remaining, "removed pages");
    Ok(Report::new(
        &output,
        Some(remaining),
        format!(
            "Removed {} page(s), {} left, saved to {}",
            removed,
            remaining,
            output.display()
        ),
    ))
}

pub fn reorder(
    input: &Path,
    order: Option<&str>,
    output: Option<&Path>,
    overwrite: bool,
    config: &Config,
) -> Result<Report> {
    let input = normalize_path(input);
    require_extension(&input, &["pdf"])?;
    let order = parse_page_list(required_pages(order)?)?;
    let output = resolve_output(&input, output, "_reordered", None, &config.output, overwrite)?;

    let mut doc = PdfDocument::open(&input)?;
    doc.reorder_pages(&order)?;
    let total = doc.page_count();
    doc.save(&output, &config.compression)?;

    tracing::info!(pages = total, "reordered pages");
    Ok(Report::new(
        &output,
        Some(total),
        format!("Reordered {} pages into {}", total, output.display()),
    ))
}
