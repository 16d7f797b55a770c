use crate::commands::{resolve_output, Report};
use crate::config::Config;
use crate::docx::write_docx;
use crate::paths::{normalize_path, require_extension, write_atomic_with};
use crate::pdf::text::{classify, extract_text, Block};
use anyhow::Result;
use std::path::Path;

/// Convert a PDF's text to a .docx, keeping only headings and paragraphs.
pub fn run(
    input: &Path,
    output: Option<&Path>,
    overwrite: bool,
    config: &Config,
) -> Result<Report> {
    let input = normalize_path(input);
    require_extension(&input, &["pdf"])?;
    let output = resolve_output(&input, output, "", Some("docx"), &config.output, overwrite)?;

    let text = extract_text(&input)?;
    let blocks = classify(&text);
    write_atomic_with(&output, |file| write_docx(file, &blocks))?;

    let headings = blocks
        .iter()
        .filter(|b| matches!(b, Block::Heading(_)))
        .count();
    tracing::info!(
        headings,
        paragraphs = blocks.len() - headings,
        "converted to word"
    );
    Ok(Report::new(
        &output,
        None,
        format!(
            "Converted to Word ({} headings, {} paragraphs): {}",
            headings,
            blocks.len() - headings,
            output.display()
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("notes.txt");
        std::fs::write(&input, "hello").unwrap();
        assert!(run(&input, None, false, &Config::default()).is_err());
        assert!(!dir.path().join("PDFile").exists());
    }

    #[test]
    fn test_unreadable_pdf_leaves_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("broken.pdf");
        std::fs::write(&input, b"%PDF-1.4 garbage").unwrap();

        assert!(run(&input, None, false, &Config::default()).is_err());
        assert!(!dir.path().join("PDFile").join("broken.docx").exists());
    }
}
