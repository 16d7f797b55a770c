use crate::commands::{resolve_output, Report};
use crate::config::Config;
use crate::page_range::PageTarget;
use crate::paths::{normalize_path, require_extension};
use crate::pdf::stamp::{insert_text, DateFormat, TextStamp};
use crate::pdf::PdfDocument;
use anyhow::Result;
use chrono::NaiveDate;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct DateOptions {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub size: Option<f32>,
    pub format: Option<String>,
    pub pages: Option<String>,
}

impl DateOptions {
    fn stamp(&self, today: NaiveDate) -> Result<TextStamp> {
        let format = match &self.format {
            Some(f) => DateFormat::parse(f)?,
            None => DateFormat::Us,
        };
        Ok(TextStamp {
            text: format.render(today),
            x: self.x.unwrap_or(50.0),
            y: self.y.unwrap_or(50.0),
            size: self.size.unwrap_or(12.0),
        })
    }
}

pub fn run(
    input: &Path,
    options: &DateOptions,
    output: Option<&Path>,
    overwrite: bool,
    config: &Config,
) -> Result<Report> {
    run_on(
        input,
        options,
        chrono::Local::now().date_naive(),
        output,
        overwrite,
        config,
    )
}

fn run_on(
    input: &Path,
    options: &DateOptions,
    today: NaiveDate,
    output: Option<&Path>,
    overwrite: bool,
    config: &Config,
) -> Result<Report> {
    let input = normalize_path(input);
    require_extension(&input, &["pdf"])?;
    let target = PageTarget::parse(options.pages.as_deref())?;
    let stamp = options.stamp(today)?;
    let output = resolve_output(&input, output, "_dated", None, &config.output, overwrite)?;

    let mut doc = PdfDocument::open(&input)?;
    let pages = target.resolve(doc.page_count())?;
    insert_text(&mut doc.doc, &pages, &stamp)?;
    doc.save(&output, &config.compression)?;

    tracing::info!(date = %stamp.text, pages = ?pages, "inserted date");
    Ok(Report::new(
        &output,
        Some(pages.len() as u32),
        format!(
            "Inserted {} on {} page(s), saved to {}",
            stamp.text,
            pages.len(),
            output.display()
        ),
    ))
}
