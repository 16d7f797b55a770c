use crate::commands::{resolve_output, Report};
use crate::config::Config;
use crate::magick::{remove_background, BackgroundOptions};
use crate::page_range::PageTarget;
use crate::paths::{normalize_path, require_extension};
use crate::pdf::stamp::{add_image, ImagePlacement, RasterImage};
use crate::pdf::PdfDocument;
use anyhow::{Context, Result};
use std::path::Path;

pub const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "webp"];

#[derive(Debug, Clone, Default)]
pub struct SignOptions {
    pub placement: ImagePlacement,
    pub pages: Option<String>,
    /// `None` keeps the image as-is.
    pub background: Option<BackgroundOptions>,
}

pub async fn run(
    pdf: &Path,
    signature: &Path,
    options: &SignOptions,
    output: Option<&Path>,
    overwrite: bool,
    config: &Config,
) -> Result<Report> {
    let pdf = normalize_path(pdf);
    let signature = normalize_path(signature);
    require_extension(&pdf, &["pdf"])?;
    require_extension(&signature, &IMAGE_EXTENSIONS)?;
    options.placement.opacity()?;
    let target = PageTarget::parse(options.pages.as_deref())?;
    let output = resolve_output(&pdf, output, "_signed", None, &config.output, overwrite)?;

    let mut doc = PdfDocument::open(&pdf)?;
    let pages = target.resolve(doc.page_count())?;

    // Holds the processed image until the stamp is embedded.
    let workdir = tempfile::tempdir().context("Failed to create temporary directory")?;
    let image_path = match &options.background {
        Some(background) => {
            // A still PNG out, even when the signature is an animated GIF or WebP.
            let background = BackgroundOptions {
                first_frame: true,
                ..background.clone()
            };
            let cleaned = workdir.path().join("signature.png");
            remove_background(&signature, &cleaned, &background)
                .await
                .context("Background removal failed (use --no-remove-bg to skip it)")?;
            cleaned
        }
        None => signature.clone(),
    };

    let image = RasterImage::open(&image_path)?;
    let placed = add_image(&mut doc.doc, &pages, &image, &options.placement)?;
    doc.save(&output, &config.compression)?;

    tracing::info!(pages = ?pages, rects = ?placed, "added signature");
    Ok(Report::new(
        &output,
        Some(pages.len() as u32),
        format!(
            "Signed {} page(s), saved to {}",
            pages.len(),
            output.display()
        ),
    ))
}
