//! Combine several documents into one, pages in input order.

use crate::error::PdfileError;
use crate::pdf::document::rebuild_page_tree;
use anyhow::{Context, Result};
use lopdf::{Document, Object, ObjectId};
use std::path::Path;

pub const MIN_INPUTS: usize = 2;

/// Merge loaded documents.
///
/// The first document is the base. Every later document has its object IDs
/// shifted past the current maximum, is copied in wholesale, and contributes its
/// pages to a single flat page tree. Objects left unreachable (the other
/// catalogs and page tree nodes) are pruned.
pub fn merge_documents(documents: Vec<Document>) -> Result<Document> {
    let too_few = PdfileError::TooFewInputs {
        required: MIN_INPUTS,
        given: documents.len(),
    };
    if documents.len() < MIN_INPUTS {
        return Err(too_few.into());
    }

    let mut documents = documents.into_iter();
    let mut merged = documents.next().ok_or(too_few)?;
    let mut page_ids: Vec<ObjectId> = merged.get_pages().into_values().collect();

    for source in documents {
        let offset = merged.max_id;

        page_ids.extend(
            source
                .get_pages()
                .into_values()
                .map(|(num, gen)| (num + offset, gen)),
        );

        for ((num, gen), mut object) in source.objects {
            offset_references(&mut object, offset);
            merged.objects.insert((num + offset, gen), object);
        }

        merged.max_id = merged.max_id.max(source.max_id + offset);
    }

    rebuild_page_tree(&mut merged, &page_ids)?;
    merged.prune_objects();
    Ok(merged)
}

/// Load and merge PDF files.
pub fn merge_files<P: AsRef<Path>>(inputs: &[P]) -> Result<Document> {
    let documents = inputs
        .iter()
        .map(|input| {
            let input = input.as_ref();
            Document::load(input)
                .with_context(|| format!("Failed to load PDF: {}", input.display()))
        })
        .collect::<Result<Vec<_>>>()?;
    merge_documents(documents)
}

fn offset_references(object: &mut Object, offset: u32) {
    match object {
        Object::Reference(id) => id.0 += offset,
        Object::Array(items) => items
            .iter_mut()
            .for_each(|item| offset_references(item, offset)),
        Object::Dictionary(dict) => dict
            .iter_mut()
            .for_each(|(_, value)| offset_references(value, offset)),
        Object::Stream(stream) => stream
            .dict
            .iter_mut()
            .for_each(|(_, value)| offset_references(value, offset)),
        _ => {}
    }
}
