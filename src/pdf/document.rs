use crate::config::{CompressionConfig, Quality};
use crate::error::PdfileError;
use crate::page_range::PageSelection;
use crate::paths::write_atomic_with;
use anyhow::{anyhow, Context, Result};
use lopdf::{Document, Object, ObjectId};
use std::path::Path;

/// Attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

pub struct PdfDocument {
    pub doc: Document,
}

impl PdfDocument {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let doc = Document::load(path)
            .with_context(|| format!("Failed to open PDF: {}", path.display()))?;
        Ok(PdfDocument { doc })
    }

    #[cfg(test)]
    pub fn from_document(doc: Document) -> Self {
        PdfDocument { doc }
    }

    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// Page object IDs in page order, indexable by 0-based page index.
    pub fn page_ids(&self) -> Vec<ObjectId> {
        self.doc.get_pages().into_values().collect()
    }

    /// Delete the selected pages, returning how many distinct pages went away.
    pub fn remove_pages(&mut self, selection: &PageSelection) -> Result<u32> {
        let total = self.page_count();
        selection.validate(total)?;

        let mut numbers: Vec<u32> = selection.indices().iter().map(|i| i + 1).collect();
        numbers.sort_unstable_by(|a, b| b.cmp(a));
        numbers.dedup();

        if numbers.len() as u32 >= total {
            return Err(PdfileError::WouldRemoveAllPages(total).into());
        }

        self.doc.delete_pages(&numbers);
        tracing::debug!(removed = ?numbers, "deleted pages");
        Ok(numbers.len() as u32)
    }

    /// Rearrange pages so that new page `i` is old page `order[i]`.
    pub fn reorder_pages(&mut self, order: &PageSelection) -> Result<()> {
        let total = self.page_count();
        check_permutation(order.indices(), total)?;

        let ids = self.page_ids();
        let reordered: Vec<ObjectId> = order
            .indices()
            .iter()
            .map(|&index| ids[index as usize])
            .collect();

        rebuild_page_tree(&mut self.doc, &reordered)
    }

    /// Compress according to config and write atomically.
    pub fn save<P: AsRef<Path>>(&mut self, path: P, compression: &CompressionConfig) -> Result<()> {
        save_document(&mut self.doc, path, compression)
    }
}

pub fn save_document<P: AsRef<Path>>(
    doc: &mut Document,
    path: P,
    compression: &CompressionConfig,
) -> Result<()> {
    if compression.enabled {
        match compression.quality {
            Quality::High => {}
            Quality::Medium => {
                doc.prune_objects();
            }
            Quality::Low => {
                doc.prune_objects();
                doc.delete_zero_length_streams();
                doc.renumber_objects();
            }
        }
        doc.compress();
    }

    let path = path.as_ref();
    write_atomic_with(path, |file| {
        doc.save_to(file)
            .with_context(|| format!("Failed to save PDF: {}", path.display()))
    })
}

fn check_permutation(order: &[u32], total: u32) -> Result<(), PdfileError> {
    let not_permutation = |reason: String| PdfileError::NotAPermutation { total, reason };

    if order.len() as u32 != total {
        return Err(not_permutation(format!(
            "got {} entries for {} pages",
            order.len(),
            total
        )));
    }

    let mut seen = vec![false; total as usize];
    for &index in order {
        match seen.get_mut(index as usize) {
            None => {
                return Err(PdfileError::PageOutOfRange {
                    page: index + 1,
                    total,
                })
            }
            Some(true) => return Err(not_permutation(format!("page {} repeated", index + 1))),
            Some(slot) => *slot = true,
        }
    }
    Ok(())
}

fn root_pages_id(doc: &Document) -> Result<ObjectId> {
    doc.catalog()?
        .get(b"Pages")?
        .as_reference()
        .map_err(|_| anyhow!("Pages is not a reference"))
}

/// Inheritable attributes a page lacks but one of its ancestors provides.
fn inherited_attributes(doc: &Document, page_id: ObjectId) -> Result<Vec<(&'static [u8], Object)>> {
    let page = doc.get_dictionary(page_id)?;
    let mut missing: Vec<&'static [u8]> = INHERITABLE
        .iter()
        .copied()
        .filter(|key| !page.has(key))
        .collect();

    let mut found = Vec::new();
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;

    while let Some(node_id) = parent {
        if missing.is_empty() || depth > 64 {
            break;
        }
        let node = doc.get_dictionary(node_id)?;
        missing.retain(|key| match node.get(key) {
            Ok(value) => {
                found.push((*key, value.clone()));
                false
            }
            Err(_) => true,
        });
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        depth += 1;
    }

    Ok(found)
}

/// Replace the page tree with a single flat node listing `pages` in order.
///
/// Inherited attributes are pushed down onto each page first so nothing is lost
/// when intermediate nodes drop out of the tree, then cleared from the root.
pub(crate) fn rebuild_page_tree(doc: &mut Document, pages: &[ObjectId]) -> Result<()> {
    let pages_id = root_pages_id(doc)?;

    for &page_id in pages {
        let inherited = inherited_attributes(doc, page_id)?;
        let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
        for (key, value) in inherited {
            page.set(key, value);
        }
        page.set("Parent", Object::Reference(pages_id));
    }

    let root = doc.get_object_mut(pages_id)?.as_dict_mut()?;
    // Every page now carries its own copy; left on the root they would leak
    // onto pages that never had them.
    for key in INHERITABLE {
        root.remove(key);
    }
    let kids: Vec<Object> = pages.iter().map(|&id| Object::Reference(id)).collect();
    root.set("Kids", kids);
    root.set("Count", pages.len() as i64);
    Ok(())
}
