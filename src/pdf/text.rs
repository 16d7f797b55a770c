use anyhow::{Context, Result};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

const MAX_HEADING_CHARS: usize = 60;
const MAX_LABEL_WORDS: usize = 8;

/// Extract text from all pages of a PDF
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read PDF: {}", path.display()))?;

    pdf_extract::extract_text_from_mem(&bytes)
        .with_context(|| format!("Failed to extract text from PDF: {}", path.display()))
}

/// A unit of the converted document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading(String),
    Paragraph(String),
}

fn section_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^(chapter|section|part|article|appendix)\s+[\w.]+").unwrap()
    })
}

/// Guess whether a line of extracted text is a heading.
///
/// Short lines qualify when they are all caps, end in a colon (a label), or
/// start like "Chapter 3". Sentences ending in a period never do.
pub fn is_heading(line: &str) -> bool {
    let line = line.trim();
    if line.is_empty() || line.chars().count() > MAX_HEADING_CHARS || line.ends_with('.') {
        return false;
    }

    let letters: Vec<char> = line.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.len() < 2 {
        return false;
    }

    let all_caps = letters.iter().all(|c| !c.is_lowercase());
    let label = line.ends_with(':') && line.split_whitespace().count() <= MAX_LABEL_WORDS;

    all_caps || label || section_pattern().is_match(line)
}

/// Split extracted text into headings and body paragraphs.
///
/// Consecutive body lines join into one paragraph; blank lines and page breaks
/// end a paragraph. A trailing hyphen joins a word split across lines.
pub fn classify(text: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut paragraph = String::new();

    let flush = |paragraph: &mut String, blocks: &mut Vec<Block>| {
        if !paragraph.is_empty() {
            blocks.push(Block::Paragraph(std::mem::take(paragraph)));
        }
    };

    // A form feed separates pages; no paragraph runs across one.
    for page in text.split('\x0C') {
        for raw in page.lines() {
            let line = raw.trim();

            if line.is_empty() {
                flush(&mut paragraph, &mut blocks);
                continue;
            }

            if is_heading(line) {
                flush(&mut paragraph, &mut blocks);
                blocks.push(Block::Heading(line.to_string()));
                continue;
            }

            if paragraph.ends_with('-') {
                paragraph.pop();
            } else if !paragraph.is_empty() {
                paragraph.push(' ');
            }
            paragraph.push_str(line);
        }
        flush(&mut paragraph, &mut blocks);
    }

    blocks
}
