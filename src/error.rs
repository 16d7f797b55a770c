use std::path::PathBuf;
use thiserror::Error;

/// Validation and operation failures that callers may want to match on.
///
/// Everything else (I/O, lopdf, zip) travels as `anyhow::Error` with context.
#[derive(Error, Debug)]
pub enum PdfileError {
    #[error("{} is not a {} file", .path.display(), .expected.join("/"))]
    InvalidExtension {
        path: PathBuf,
        expected: Vec<&'static str>,
    },

    #[error("At least {required} input files are required, got {given}")]
    TooFewInputs { required: usize, given: usize },

    #[error("No pages selected")]
    EmptySelection,

    #[error("Invalid page number: {0:?}")]
    InvalidPageNumber(String),

    #[error("Page {page} is out of range (1-{total})")]
    PageOutOfRange { page: u32, total: u32 },

    #[error("Cannot remove all {0} pages of the document")]
    WouldRemoveAllPages(u32),

    #[error("Page order must list every page 1-{total} exactly once: {reason}")]
    NotAPermutation { total: u32, reason: String },

    #[error("Output file {} already exists (pass --yes to overwrite)", .0.display())]
    OutputExists(PathBuf),

    #[error("Opacity must be between 0 and 1, got {0}")]
    InvalidOpacity(f32),

    #[error("Unknown date format {0:?} (expected us, eu, iso or long)")]
    UnknownDateFormat(String),

    #[error("Unknown filter {0:?}")]
    UnknownFilter(String),

    #[error("{program} failed: {message}")]
    ExternalProcess { program: String, message: String },
}
