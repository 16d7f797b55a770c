//! `remove-bg` and `filter`: image commands backed by ImageMagick.

use crate::commands::sign::IMAGE_EXTENSIONS;
use crate::commands::{resolve_output, Report};
use crate::config::Config;
use crate::magick::{self, BackgroundOptions, Filter};
use crate::paths::{commit_staged, normalize_path, require_extension, staging_file};
use anyhow::Result;
use std::path::Path;

pub async fn remove_background(
    input: &Path,
    options: &BackgroundOptions,
    output: Option<&Path>,
    overwrite: bool,
    config: &Config,
) -> Result<Report> {
    let input = normalize_path(input);
    require_extension(&input, &IMAGE_EXTENSIONS)?;

    // Transparency needs an alpha-capable format; animations keep theirs.
    let extension = if magick::is_animated(&input) {
        None
    } else {
        Some("png")
    };
    let output = resolve_output(&input, output, "_nobg", extension, &config.output, overwrite)?;

    let staged = staging_file(&output)?;
    magick::remove_background(&input, staged.path(), options).await?;
    commit_staged(staged, &output)?;

    tracing::info!(output = %output.display(), "removed background");
    Ok(Report::new(
        &output,
        None,
        format!("Removed background, saved to {}", output.display()),
    ))
}

pub async fn apply_filter(
    input: &Path,
    filter: &str,
    output: Option<&Path>,
    overwrite: bool,
    config: &Config,
) -> Result<Report> {
    let input = normalize_path(input);
    require_extension(&input, &IMAGE_EXTENSIONS)?;
    let filter: Filter = filter.parse()?;

    let suffix = format!("_{}", filter.name());
    let output = resolve_output(&input, output, &suffix, None, &config.output, overwrite)?;

    let staged = staging_file(&output)?;
    magick::apply_filter(&input, staged.path(), filter).await?;
    commit_staged(staged, &output)?;

    tracing::info!(filter = filter.name(), output = %output.display(), "applied filter");
    Ok(Report::new(
        &output,
        None,
        format!("Applied {} filter, saved to {}", filter.name(), output.display()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_filter_fails_before_running() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("photo.png");
        std::fs::write(&input, b"not really a png").unwrap();

        assert!(apply_filter(&input, "vaporwave", None, false, &Config::default())
            .await
            .is_err());
        assert!(!dir.path().join("PDFile").exists());
    }

    #[tokio::test]
    async fn test_non_image_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("doc.pdf");
        std::fs::write(&input, b"%PDF").unwrap();

        let result = remove_background(
            &input,
            &BackgroundOptions::default(),
            None,
            false,
            &Config::default(),
        )
        .await;
        assert!(result.is_err());
    }
}
