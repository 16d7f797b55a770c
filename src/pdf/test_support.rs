//! In-memory PDFs for tests.

use lopdf::content::Content;
use lopdf::{dictionary, Document, Object, Stream};

/// Build a document with `num_pages` pages, each drawing "<prefix>-Page-<n>".
///
/// MediaBox and Resources live on the Pages node so pages inherit them.
pub fn create_test_doc(num_pages: u32, prefix: &str) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids = Vec::new();
    for page_num in 1..=num_pages {
        let content = format!(
            "BT /F1 12 Tf 50 700 Td ({}-Page-{}) Tj ET",
            prefix, page_num
        );
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => num_pages as i64,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

pub fn create_test_pdf(num_pages: u32, prefix: &str) -> Vec<u8> {
    let mut doc = create_test_doc(num_pages, prefix);
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// The full decoded content of each page, in page order.
pub fn page_contents(doc: &Document) -> Vec<String> {
    let mut doc = doc.clone();
    doc.decompress();
    doc.get_pages()
        .into_values()
        .map(|page_id| String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).into_owned())
        .collect()
}

/// The first string literal drawn on each page, which identifies it.
pub fn page_labels(doc: &Document) -> Vec<String> {
    page_contents(doc)
        .into_iter()
        .map(|content| {
            let start = content.find('(').map(|i| i + 1).unwrap_or(0);
            let end = content[start..]
                .find(')')
                .map(|i| start + i)
                .unwrap_or(content.len());
            content[start..end].to_string()
        })
        .collect()
}

/// Operands of the first `operator` on page `index` (0-based), as numbers.
pub fn page_operands(doc: &Document, index: usize, operator: &str) -> Option<Vec<f32>> {
    let mut doc = doc.clone();
    doc.decompress();
    let page_id = doc.get_pages().into_values().nth(index)?;
    let content = Content::decode(&doc.get_page_content(page_id).ok()?).ok()?;
    content
        .operations
        .into_iter()
        .find(|op| op.operator == operator)
        .map(|op| op.operands.iter().filter_map(|o| o.as_float().ok()).collect())
}
