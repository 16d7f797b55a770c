use crate::error::PdfileError;

/// An ordered list of 0-based page indices parsed from 1-based user input.
///
/// Order is kept as given (it matters for reordering) and duplicates are not
/// collapsed here; callers that care do that themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSelection(Vec<u32>);

impl PageSelection {
    #[cfg(test)]
    pub fn from_indices(indices: Vec<u32>) -> Self {
        PageSelection(indices)
    }

    pub fn indices(&self) -> &[u32] {
        &self.0
    }

    /// Check every index against a loaded document's page count.
    pub fn validate(&self, page_count: u32) -> Result<(), PdfileError> {
        match self.0.iter().find(|&&index| index >= page_count) {
            Some(&index) => Err(PdfileError::PageOutOfRange {
                page: index + 1,
                total: page_count,
            }),
            None => Ok(()),
        }
    }
}

/// Which pages an annotation (date, signature) lands on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageTarget {
    Last,
    All,
    Pages(PageSelection),
}

impl PageTarget {
    /// Parse a `--pages` value: absent means the last page, `all` means every page.
    pub fn parse(s: Option<&str>) -> Result<Self, PdfileError> {
        match s {
            None => Ok(PageTarget::Last),
            Some(s) if s.trim().eq_ignore_ascii_case("all") => Ok(PageTarget::All),
            Some(s) => parse_page_list(s).map(PageTarget::Pages),
        }
    }

    /// Expand into validated 0-based indices for a document with `page_count` pages.
    pub fn resolve(&self, page_count: u32) -> Result<Vec<u32>, PdfileError> {
        if page_count == 0 {
            return Err(PdfileError::EmptySelection);
        }
        match self {
            PageTarget::Last => Ok(vec![page_count - 1]),
            PageTarget::All => Ok((0..page_count).collect()),
            PageTarget::Pages(selection) => {
                selection.validate(page_count)?;
                Ok(selection.indices().to_vec())
            }
        }
    }
}

fn parse_page_number(s: &str) -> Result<u32, PdfileError> {
    let s = s.trim();
    match s.parse::<u32>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(PdfileError::InvalidPageNumber(s.to_string())),
    }
}

/// Parse a comma-separated list of 1-based page numbers like "3, 1,2".
///
/// Blank input means the user gave no pages and the operation is cancelled.
pub fn parse_page_list(s: &str) -> Result<PageSelection, PdfileError> {
    if s.trim().is_empty() {
        return Err(PdfileError::EmptySelection);
    }
    s.split(',')
        .map(parse_page_number)
        .collect::<Result<Vec<_>, _>>()
        .map(PageSelection)
}
