//! Drawing on top of existing pages: date text and raster images.

use crate::error::PdfileError;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::io::Write;
use std::path::Path;

const FONT_NAME: &[u8] = b"FPdfileDate";
const IMAGE_NAME: &[u8] = b"ImPdfileSig";
const GSTATE_NAME: &[u8] = b"GSPdfileSig";

/// US Letter, used when a page has no usable MediaBox.
const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

const SIGNATURE_MAX_WIDTH: f32 = 150.0;
const SIGNATURE_MARGIN: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// MM/DD/YYYY
    Us,
    /// DD/MM/YYYY
    Eu,
    /// YYYY-MM-DD
    Iso,
    /// Month D, YYYY
    Long,
}

impl DateFormat {
    pub fn parse(s: &str) -> Result<Self, PdfileError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "us" | "mm/dd/yyyy" => Ok(DateFormat::Us),
            "eu" | "dd/mm/yyyy" => Ok(DateFormat::Eu),
            "iso" | "yyyy-mm-dd" => Ok(DateFormat::Iso),
            "long" => Ok(DateFormat::Long),
            _ => Err(PdfileError::UnknownDateFormat(s.to_string())),
        }
    }

    pub fn render(self, date: NaiveDate) -> String {
        let pattern = match self {
            DateFormat::Us => "%m/%d/%Y",
            DateFormat::Eu => "%d/%m/%Y",
            DateFormat::Iso => "%Y-%m-%d",
            DateFormat::Long => "%B %-d, %Y",
        };
        date.format(pattern).to_string()
    }
}

#[derive(Debug, Clone)]
pub struct TextStamp {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub size: f32,
}

/// Draw `stamp` in Helvetica on each 0-based page index in `pages`.
///
/// The position is measured from the bottom-left corner of the page as displayed,
/// and the text is drawn upright on rotated pages.
pub fn insert_text(doc: &mut Document, pages: &[u32], stamp: &TextStamp) -> Result<()> {
    let page_ids = page_ids_for(doc, pages)?;
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });

    for page_id in page_ids {
        let frame = PageFrame::of(doc, page_id);
        add_resource(doc, page_id, b"Font", FONT_NAME, font_id)?;
        append_content(
            doc,
            page_id,
            vec![
                Operation::new("BT", vec![]),
                Operation::new(
                    "Tf",
                    vec![Object::Name(FONT_NAME.to_vec()), stamp.size.into()],
                ),
                Operation::new("Tm", operands(frame.matrix(stamp.x, stamp.y, 1.0, 1.0))),
                Operation::new("Tj", vec![Object::string_literal(stamp.text.as_str())]),
                Operation::new("ET", vec![]),
            ],
        )?;
    }
    Ok(())
}

fn operands(matrix: [f32; 6]) -> Vec<Object> {
    matrix.into_iter().map(Object::from).collect()
}

/// A decoded raster image split into an RGB plane and an optional alpha plane.
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    rgb: Vec<u8>,
    alpha: Option<Vec<u8>>,
}

impl RasterImage {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let image = image::open(path)
            .with_context(|| format!("Failed to read image: {}", path.display()))?;
        Ok(Self::from_rgba(image.to_rgba8()))
    }

    pub fn from_rgba(image: image::RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        let pixels = image.into_raw();

        let mut rgb = Vec::with_capacity(pixels.len() / 4 * 3);
        let mut alpha = Vec::with_capacity(pixels.len() / 4);
        for px in pixels.chunks_exact(4) {
            rgb.extend_from_slice(&px[..3]);
            alpha.push(px[3]);
        }
        let opaque = alpha.iter().all(|&a| a == u8::MAX);

        RasterImage {
            width,
            height,
            rgb,
            alpha: if opaque { None } else { Some(alpha) },
        }
    }

    #[cfg(test)]
    pub fn has_alpha(&self) -> bool {
        self.alpha.is_some()
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    fn to_xobject(&self, doc: &mut Document) -> Result<ObjectId> {
        let mut dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(self.width),
            "Height" => i64::from(self.height),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        };

        if let Some(alpha) = &self.alpha {
            let smask = dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(self.width),
                "Height" => i64::from(self.height),
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
                "Filter" => "FlateDecode",
            };
            let smask_id =
                doc.add_object(Stream::new(smask, deflate(alpha)?).with_compression(false));
            dict.set("SMask", Object::Reference(smask_id));
        }

        Ok(doc.add_object(Stream::new(dict, deflate(&self.rgb)?).with_compression(false)))
    }
}

fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Where and how an image goes on a page; unset fields are computed per page.
#[derive(Debug, Clone, Default)]
pub struct ImagePlacement {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub opacity: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ImagePlacement {
    pub fn opacity(&self) -> Result<f32, PdfileError> {
        match self.opacity {
            None => Ok(1.0),
            Some(o) if (0.0..=1.0).contains(&o) => Ok(o),
            Some(o) => Err(PdfileError::InvalidOpacity(o)),
        }
    }

    /// Resolve against the visible page size for an image of the given aspect ratio.
    ///
    /// Defaults: at most 150pt (or 30% of the page) wide, bottom-right corner, 50pt margin.
    pub fn resolve(&self, (page_width, _): (f32, f32), aspect: f32) -> Rect {
        let width = match (self.width, self.height) {
            (Some(w), _) => w,
            (None, Some(h)) => h * aspect,
            (None, None) => SIGNATURE_MAX_WIDTH.min(page_width * 0.3),
        };
        let height = self.height.unwrap_or(width / aspect);

        Rect {
            x: self
                .x
                .unwrap_or_else(|| (page_width - width - SIGNATURE_MARGIN).max(0.0)),
            y: self.y.unwrap_or(SIGNATURE_MARGIN),
            width,
            height,
        }
    }
}

/// A page as it is displayed: its MediaBox turned by `/Rotate`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFrame {
    pub media_box: [f32; 4],
    /// Clockwise display rotation: 0, 90, 180 or 270.
    pub rotation: u16,
}

impl PageFrame {
    pub fn of(doc: &Document, page_id: ObjectId) -> Self {
        PageFrame {
            media_box: media_box(doc, page_id),
            rotation: rotation(doc, page_id),
        }
    }

    /// Visible width and height.
    pub fn size(&self) -> (f32, f32) {
        let [x0, y0, x1, y1] = self.media_box;
        let (width, height) = (x1 - x0, y1 - y0);
        if self.rotation % 180 == 0 {
            (width, height)
        } else {
            (height, width)
        }
    }

    /// Matrix mapping the unit square onto an upright `width` x `height` box whose
    /// visible bottom-left corner is `(u, v)` from the visible bottom-left of the page.
    pub fn matrix(&self, u: f32, v: f32, width: f32, height: f32) -> [f32; 6] {
        let [x0, y0, x1, y1] = self.media_box;
        match self.rotation {
            90 => [0.0, width, -height, 0.0, x1 - v, y0 + u],
            180 => [-width, 0.0, 0.0, -height, x1 - u, y1 - v],
            270 => [0.0, -width, height, 0.0, x0 + v, y1 - u],
            _ => [width, 0.0, 0.0, height, x0 + u, y0 + v],
        }
    }
}

/// Place `image` on each 0-based page index in `pages`.
pub fn add_image(
    doc: &mut Document,
    pages: &[u32],
    image: &RasterImage,
    placement: &ImagePlacement,
) -> Result<Vec<Rect>> {
    let opacity = placement.opacity()?;
    let page_ids = page_ids_for(doc, pages)?;

    let image_id = image.to_xobject(doc)?;
    let gstate_id = doc.add_object(dictionary! {
        "Type" => "ExtGState",
        "CA" => opacity,
        "ca" => opacity,
    });

    let mut placed = Vec::with_capacity(page_ids.len());
    for page_id in page_ids {
        let frame = PageFrame::of(doc, page_id);
        let rect = placement.resolve(frame.size(), image.aspect_ratio());
        add_resource(doc, page_id, b"XObject", IMAGE_NAME, image_id)?;
        add_resource(doc, page_id, b"ExtGState", GSTATE_NAME, gstate_id)?;
        append_content(
            doc,
            page_id,
            vec![
                Operation::new("q", vec![]),
                Operation::new("gs", vec![Object::Name(GSTATE_NAME.to_vec())]),
                Operation::new(
                    "cm",
                    operands(frame.matrix(rect.x, rect.y, rect.width, rect.height)),
                ),
                Operation::new("Do", vec![Object::Name(IMAGE_NAME.to_vec())]),
                Operation::new("Q", vec![]),
            ],
        )?;
        placed.push(rect);
    }
    Ok(placed)
}

fn page_ids_for(doc: &Document, pages: &[u32]) -> Result<Vec<ObjectId>> {
    let all: Vec<ObjectId> = doc.get_pages().into_values().collect();
    pages
        .iter()
        .map(|&index| {
            all.get(index as usize).copied().ok_or_else(|| {
                PdfileError::PageOutOfRange {
                    page: index + 1,
                    total: all.len() as u32,
                }
                .into()
            })
        })
        .collect()
}

fn number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

/// A page attribute, looked up through the page tree if the page lacks it.
fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut node = doc.get_dictionary(page_id).ok();

    for _ in 0..64 {
        let dict = node?;
        if let Ok(value) = dict.get(key) {
            return match value {
                Object::Reference(id) => doc.get_object(*id).ok(),
                other => Some(other),
            };
        }
        node = dict
            .get(b"Parent")
            .and_then(Object::as_reference)
            .and_then(|id| doc.get_dictionary(id))
            .ok();
    }
    None
}

/// The page's MediaBox, following references and inheritance.
pub fn media_box(doc: &Document, page_id: ObjectId) -> [f32; 4] {
    let numbers: Vec<f32> = inherited(doc, page_id, b"MediaBox")
        .and_then(|value| value.as_array().ok())
        .map(|items| items.iter().filter_map(number).collect())
        .unwrap_or_default();

    match numbers[..] {
        [x0, y0, x1, y1] => [x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1)],
        _ => DEFAULT_MEDIA_BOX,
    }
}

/// The page's `/Rotate`, normalized to 0, 90, 180 or 270.
pub fn rotation(doc: &Document, page_id: ObjectId) -> u16 {
    let degrees = inherited(doc, page_id, b"Rotate")
        .and_then(|value| value.as_i64().ok())
        .unwrap_or(0)
        .rem_euclid(360);
    if degrees % 90 == 0 {
        degrees as u16
    } else {
        0
    }
}

#[derive(Clone, Copy)]
enum Slot {
    Inline,
    Indirect(ObjectId),
    Missing,
}

/// The page's own resource dictionary, copying inherited resources down if needed.
fn page_resources_mut(doc: &mut Document, page_id: ObjectId) -> Result<&mut Dictionary> {
    let slot = match doc.get_dictionary(page_id)?.get(b"Resources") {
        Ok(Object::Reference(id)) => Slot::Indirect(*id),
        Ok(Object::Dictionary(_)) => Slot::Inline,
        _ => Slot::Missing,
    };

    let target = match slot {
        Slot::Indirect(id) => id,
        Slot::Inline => page_id,
        Slot::Missing => {
            let inherited = inherited_resources(doc, page_id).unwrap_or_default();
            doc.get_object_mut(page_id)?
                .as_dict_mut()?
                .set("Resources", inherited);
            page_id
        }
    };

    let dict = doc.get_object_mut(target)?.as_dict_mut()?;
    if target == page_id {
        Ok(dict.get_mut(b"Resources")?.as_dict_mut()?)
    } else {
        Ok(dict)
    }
}

fn inherited_resources(doc: &Document, page_id: ObjectId) -> Option<Dictionary> {
    let mut parent = doc
        .get_dictionary(page_id)
        .ok()?
        .get(b"Parent")
        .and_then(Object::as_reference)
        .ok();

    for _ in 0..64 {
        let node = doc.get_dictionary(parent?).ok()?;
        match node.get(b"Resources") {
            Ok(Object::Dictionary(dict)) => return Some(dict.clone()),
            Ok(Object::Reference(id)) => return doc.get_dictionary(*id).ok().cloned(),
            _ => parent = node.get(b"Parent").and_then(Object::as_reference).ok(),
        }
    }
    None
}

/// Register `object_id` as `/category/name` in the page's resources.
fn add_resource(
    doc: &mut Document,
    page_id: ObjectId,
    category: &[u8],
    name: &[u8],
    object_id: ObjectId,
) -> Result<()> {
    let slot = match page_resources_mut(doc, page_id)?.get(category) {
        Ok(Object::Reference(id)) => Slot::Indirect(*id),
        Ok(Object::Dictionary(_)) => Slot::Inline,
        _ => Slot::Missing,
    };

    let dict = match slot {
        Slot::Indirect(id) => doc.get_object_mut(id)?.as_dict_mut()?,
        Slot::Inline | Slot::Missing => {
            let resources = page_resources_mut(doc, page_id)?;
            if matches!(slot, Slot::Missing) {
                resources.set(category, Dictionary::new());
            }
            resources.get_mut(category)?.as_dict_mut()?
        }
    };
    dict.set(name, Object::Reference(object_id));
    Ok(())
}

/// Draw `operations` after the page's existing content, isolated from its graphics state.
fn append_content(doc: &mut Document, page_id: ObjectId, operations: Vec<Operation>) -> Result<()> {
    let mut stamp = b"Q\n".to_vec();
    stamp.extend(Content { operations }.encode()?);

    let save_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let stamp_id = doc.add_object(Stream::new(Dictionary::new(), stamp));

    let existing = match doc.get_dictionary(page_id)?.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id) {
            Ok(Object::Array(items)) => items.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Ok(Object::Array(items)) => items.clone(),
        _ => vec![],
    };

    let mut contents = vec![Object::Reference(save_id)];
    contents.extend(existing);
    contents.push(Object::Reference(stamp_id));
    doc.get_object_mut(page_id)?
        .as_dict_mut()?
        .set("Contents", contents);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::test_support::{create_test_doc, page_contents};

    fn date_stamp() -> TextStamp {
        TextStamp {
            text: "01/02/2026".to_string(),
            x: 50.0,
            y: 50.0,
            size: 12.0,
        }
    }

    #[test]
    fn test_date_formats() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(DateFormat::Us.render(date), "03/07/2026");
        assert_eq!(DateFormat::Eu.render(date), "07/03/2026");
        assert_eq!(DateFormat::Iso.render(date), "2026-03-07");
        assert_eq!(DateFormat::Long.render(date), "March 7, 2026");
    }

    #[test]
    fn test_parse_date_format() {
        assert_eq!(DateFormat::parse("ISO").unwrap(), DateFormat::Iso);
        assert_eq!(DateFormat::parse("dd/mm/yyyy").unwrap(), DateFormat::Eu);
        assert!(DateFormat::parse("julian").is_err());
    }

    #[test]
    fn test_text_on_selected_page_only() {
        let mut doc = create_test_doc(3, "Doc");
        insert_text(&mut doc, &[2], &date_stamp()).unwrap();

        let contents = page_contents(&doc);
        assert!(!contents[0].contains("01/02/2026"));
        assert!(!contents[1].contains("01/02/2026"));
        assert!(contents[2].contains("01/02/2026"));
        assert!(contents[2].contains("Doc-Page-3"));
    }

    #[test]
    fn test_text_registers_font() {
        let mut doc = create_test_doc(1, "Doc");
        insert_text(&mut doc, &[0], &date_stamp()).unwrap();

        let page_id = doc.get_pages()[&1];
        let resources = doc
            .get_dictionary(page_id)
            .unwrap()
            .get(b"Resources")
            .unwrap()
            .as_dict()
            .unwrap();
        let fonts = resources.get(b"Font").unwrap().as_dict().unwrap();
        assert!(fonts.has(b"F1"), "inherited font kept");
        assert!(fonts.has(FONT_NAME));
    }

    #[test]
    fn test_text_out_of_range() {
        let mut doc = create_test_doc(2, "Doc");
        assert!(insert_text(&mut doc, &[5], &date_stamp()).is_err());
    }

    #[test]
    fn test_placement_defaults() {
        let rect = ImagePlacement::default().resolve((612.0, 792.0), 2.0);
        assert_eq!(rect.width, 150.0);
        assert_eq!(rect.height, 75.0);
        assert_eq!(rect.x, 612.0 - 150.0 - 50.0);
        assert_eq!(rect.y, 50.0);
    }

    #[test]
    fn test_placement_height_only_keeps_aspect() {
        let placement = ImagePlacement {
            height: Some(40.0),
            x: Some(10.0),
            ..Default::default()
        };
        let rect = placement.resolve((612.0, 792.0), 3.0);
        assert_eq!(rect.width, 120.0);
        assert_eq!(rect.x, 10.0);
    }

    #[test]
    fn test_opacity_range() {
        let placement = ImagePlacement {
            opacity: Some(1.5),
            ..Default::default()
        };
        assert!(placement.opacity().is_err());
        assert_eq!(ImagePlacement::default().opacity().unwrap(), 1.0);
    }

    #[test]
    fn test_image_with_alpha_gets_smask() {
        let mut pixels = image::RgbaImage::from_pixel(4, 2, image::Rgba([10, 20, 30, 255]));
        pixels.put_pixel(0, 0, image::Rgba([255, 255, 255, 0]));
        let raster = RasterImage::from_rgba(pixels);
        assert!(raster.has_alpha());

        let mut doc = create_test_doc(2, "Doc");
        let placed = add_image(&mut doc, &[1], &raster, &ImagePlacement::default()).unwrap();
        assert_eq!(placed.len(), 1);

        let contents = page_contents(&doc);
        assert!(contents[1].contains("/ImPdfileSig Do"));
        assert!(!contents[0].contains("/ImPdfileSig Do"));

        let smasks = doc
            .objects
            .values()
            .filter_map(|o| o.as_stream().ok())
            .filter(|s| s.dict.has(b"SMask"))
            .count();
        assert_eq!(smasks, 1);
    }

    #[test]
    fn test_opaque_image_has_no_smask() {
        let pixels = image::RgbaImage::from_pixel(2, 2, image::Rgba([0, 0, 0, 255]));
        assert!(!RasterImage::from_rgba(pixels).has_alpha());
    }

    #[test]
    fn test_gif_and_webp_signatures_decode() {
        let dir = tempfile::tempdir().unwrap();
        let pixels = image::RgbaImage::from_pixel(3, 2, image::Rgba([0, 0, 0, 255]));
        for name in ["sig.gif", "sig.webp"] {
            let path = dir.path().join(name);
            pixels.save(&path).unwrap();
            let raster = RasterImage::open(&path).unwrap();
            assert_eq!((raster.width, raster.height), (3, 2), "{}", name);
        }
    }

    fn set_on_pages_root(doc: &mut Document, key: &str, value: Object) {
        let pages_id = doc
            .catalog()
            .unwrap()
            .get(b"Pages")
            .unwrap()
            .as_reference()
            .unwrap();
        doc.get_object_mut(pages_id)
            .unwrap()
            .as_dict_mut()
            .unwrap()
            .set(key, value);
    }

    #[test]
    fn test_text_keeps_contents_behind_array_reference() {
        let mut doc = create_test_doc(1, "Doc");
        let page_id = doc.get_pages()[&1];
        let content_id = doc
            .get_dictionary(page_id)
            .unwrap()
            .get(b"Contents")
            .unwrap()
            .as_reference()
            .unwrap();
        let array_id = doc.add_object(vec![Object::Reference(content_id)]);
        doc.get_object_mut(page_id)
            .unwrap()
            .as_dict_mut()
            .unwrap()
            .set("Contents", array_id);

        insert_text(&mut doc, &[0], &date_stamp()).unwrap();

        let contents = doc
            .get_dictionary(page_id)
            .unwrap()
            .get(b"Contents")
            .unwrap()
            .as_array()
            .unwrap()
            .clone();
        assert_eq!(contents.len(), 3);
        assert!(contents.iter().all(|c| c.as_reference().is_ok()));
        assert!(!contents
            .iter()
            .any(|c| c.as_reference().ok() == Some(array_id)));

        let text = &page_contents(&doc)[0];
        assert!(text.contains("Doc-Page-1"));
        assert!(text.contains("01/02/2026"));
    }

    #[test]
    fn test_frame_with_offset_origin() {
        let frame = PageFrame {
            media_box: [100.0, 200.0, 712.0, 992.0],
            rotation: 0,
        };
        assert_eq!(frame.size(), (612.0, 792.0));
        assert_eq!(
            frame.matrix(50.0, 50.0, 1.0, 1.0),
            [1.0, 0.0, 0.0, 1.0, 150.0, 250.0]
        );
    }

    #[test]
    fn test_frame_rotations() {
        let frame = |rotation| PageFrame {
            media_box: DEFAULT_MEDIA_BOX,
            rotation,
        };
        assert_eq!(frame(90).size(), (792.0, 612.0));
        assert_eq!(
            frame(90).matrix(10.0, 20.0, 30.0, 40.0),
            [0.0, 30.0, -40.0, 0.0, 592.0, 10.0]
        );
        assert_eq!(
            frame(180).matrix(10.0, 20.0, 30.0, 40.0),
            [-30.0, 0.0, 0.0, -40.0, 602.0, 772.0]
        );
        assert_eq!(
            frame(270).matrix(10.0, 20.0, 30.0, 40.0),
            [0.0, -30.0, 40.0, 0.0, 20.0, 782.0]
        );
    }

    #[test]
    fn test_rotation_is_inherited_and_normalized() {
        let mut doc = create_test_doc(1, "Doc");
        let page_id = doc.get_pages()[&1];
        assert_eq!(rotation(&doc, page_id), 0);

        set_on_pages_root(&mut doc, "Rotate", Object::Integer(-90));
        assert_eq!(rotation(&doc, page_id), 270);

        set_on_pages_root(&mut doc, "Rotate", Object::Integer(45));
        assert_eq!(rotation(&doc, page_id), 0);
    }

    #[test]
    fn test_text_upright_on_rotated_page() {
        let mut doc = create_test_doc(1, "Doc");
        set_on_pages_root(&mut doc, "Rotate", Object::Integer(90));
        insert_text(&mut doc, &[0], &date_stamp()).unwrap();

        let mut doc = doc.clone();
        doc.decompress();
        let page_id = doc.get_pages()[&1];
        let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
        let tm = content
            .operations
            .iter()
            .find(|op| op.operator == "Tm")
            .unwrap();
        let matrix: Vec<f32> = tm.operands.iter().filter_map(number).collect();

        // Visible (50, 50) on a 90-degree page sits at user-space (562, 50).
        assert_eq!(matrix, vec![0.0, 1.0, -1.0, 0.0, 562.0, 50.0]);
    }

    #[test]
    fn test_default_signature_on_rotated_page() {
        let mut doc = create_test_doc(1, "Doc");
        set_on_pages_root(&mut doc, "Rotate", Object::Integer(90));
        let raster = RasterImage::from_rgba(image::RgbaImage::from_pixel(
            2,
            1,
            image::Rgba([0, 0, 0, 255]),
        ));

        let placed = add_image(&mut doc, &[0], &raster, &ImagePlacement::default()).unwrap();
        // Landscape as displayed: 792 wide, so the default width is capped at 150.
        assert_eq!(
            placed[0],
            Rect {
                x: 792.0 - 150.0 - 50.0,
                y: 50.0,
                width: 150.0,
                height: 75.0,
            }
        );
    }
}
