pub mod document;
pub mod merge;
pub mod stamp;
pub mod text;

#[cfg(test)]
pub mod test_support;

pub use document::PdfDocument;
