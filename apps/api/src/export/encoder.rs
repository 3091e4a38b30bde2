//! Output encoders: a paged PDF encoder driven by placement commands, and
//! single-image PNG/JPEG encoders for the raster export kinds.

use chrono::{DateTime, Utc};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::RgbImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Object, ObjectId, Stream};
use thiserror::Error;
use tracing::trace;

use crate::export::paginator::{Document, PlacementCommand};

const MM_PER_INCH: f64 = 25.4;
const PT_PER_INCH: f64 = 72.0;
pub const JPEG_QUALITY: u8 = 92;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("PDF encoding failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error while encoding: {0}")]
    Io(#[from] std::io::Error),

    #[error("placement refers to missing page {0}")]
    MissingPage(usize),
}

pub fn mm_to_pt(mm: f64) -> f64 {
    mm * PT_PER_INCH / MM_PER_INCH
}

// ────────────────────────────────────────────────────────────────────────────
// Encoder trait
// ────────────────────────────────────────────────────────────────────────────

/// A paged output format. Encoders start with one blank page already open.
pub trait DocumentEncoder {
    fn new_page(&mut self) -> Result<(), EncodeError>;

    /// Draws `pixels` with its top-left corner at (`x`, `y`) measured from the
    /// page's top-left corner, stretched to `width` x `height` page units.
    fn place_image(
        &mut self,
        pixels: &RgbImage,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<(), EncodeError>;

    fn finish(self) -> Result<Vec<u8>, EncodeError>;
}

/// Replays the document's command sequence into `encoder`.
pub fn encode_document<E: DocumentEncoder>(
    document: &Document,
    mut encoder: E,
) -> Result<Vec<u8>, EncodeError> {
    for command in document.commands() {
        match command {
            PlacementCommand::NewPage => encoder.new_page()?,
            PlacementCommand::PlaceImage {
                page,
                x_units,
                y_units,
                width_units,
                height_units,
            } => {
                let page = document
                    .pages
                    .get(page)
                    .ok_or(EncodeError::MissingPage(page))?;
                trace!(
                    "Placing rows {}..{} ({}x{} px)",
                    page.offset_px,
                    page.offset_px + page.height_px,
                    page.width_px,
                    page.height_px
                );
                encoder.place_image(&page.pixels, x_units, y_units, width_units, height_units)?;
            }
        }
    }
    encoder.finish()
}

// ────────────────────────────────────────────────────────────────────────────
// PDF
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct PendingPage {
    images: Vec<(String, ObjectId)>,
    operations: Vec<Operation>,
}

/// PDF encoder with a fixed page size in millimeters.
pub struct PdfEncoder {
    doc: lopdf::Document,
    pages_id: ObjectId,
    width_pt: f64,
    height_pt: f64,
    pages: Vec<PendingPage>,
    title: String,
    created_at: DateTime<Utc>,
}

impl PdfEncoder {
    pub fn new(page_width_mm: f64, page_height_mm: f64) -> Self {
        let mut doc = lopdf::Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            width_pt: mm_to_pt(page_width_mm),
            height_pt: mm_to_pt(page_height_mm),
            pages: vec![PendingPage::default()],
            title: "Resume".to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_creation_time(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}

impl DocumentEncoder for PdfEncoder {
    fn new_page(&mut self) -> Result<(), EncodeError> {
        self.pages.push(PendingPage::default());
        Ok(())
    }

    fn place_image(
        &mut self,
        pixels: &RgbImage,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<(), EncodeError> {
        let image_id = self.doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(pixels.width()),
                "Height" => i64::from(pixels.height()),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
            },
            pixels.as_raw().clone(),
        ));

        let width_pt = mm_to_pt(width);
        let height_pt = mm_to_pt(height);
        let left_pt = mm_to_pt(x);
        // PDF user space grows upwards from the bottom-left corner.
        let bottom_pt = self.height_pt - mm_to_pt(y) - height_pt;

        let page = self.pages.last_mut().ok_or(EncodeError::MissingPage(0))?;
        let name = format!("Im{}", page.images.len());
        page.operations.extend([
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    real(width_pt),
                    real(0.0),
                    real(0.0),
                    real(height_pt),
                    real(left_pt),
                    real(bottom_pt),
                ],
            ),
            Operation::new("Do", vec![Object::Name(name.clone().into_bytes())]),
            Operation::new("Q", vec![]),
        ]);
        page.images.push((name, image_id));
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<u8>, EncodeError> {
        let media_box = vec![real(0.0), real(0.0), real(self.width_pt), real(self.height_pt)];
        let mut kids = Vec::with_capacity(self.pages.len());

        for page in std::mem::take(&mut self.pages) {
            let content = Content {
                operations: page.operations,
            };
            let content_id = self.doc.add_object(Stream::new(dictionary! {}, content.encode()?));

            let mut xobjects = lopdf::Dictionary::new();
            for (name, id) in page.images {
                xobjects.set(name, id);
            }

            let page_id = self.doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => self.pages_id,
                "MediaBox" => media_box.clone(),
                "Contents" => content_id,
                "Resources" => dictionary! { "XObject" => xobjects },
            });
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        let stamp = self.created_at.format("D:%Y%m%d%H%M%SZ").to_string();
        let info_id = self.doc.add_object(dictionary! {
            "Title" => Object::string_literal(self.title.as_str()),
            "Producer" => Object::string_literal(concat!("resume-api ", env!("CARGO_PKG_VERSION"))),
            "CreationDate" => Object::string_literal(stamp),
        });
        self.doc.trailer.set("Info", info_id);

        self.doc.compress();
        let mut buffer = Vec::new();
        self.doc.save_to(&mut buffer)?;
        Ok(buffer)
    }
}

fn real(v: f64) -> Object {
    Object::from(v as f32)
}

// ────────────────────────────────────────────────────────────────────────────
// Single images
// ────────────────────────────────────────────────────────────────────────────

pub fn encode_png(pixels: &RgbImage) -> Result<Vec<u8>, EncodeError> {
    let mut buffer = Vec::new();
    pixels.write_with_encoder(PngEncoder::new(&mut buffer))?;
    Ok(buffer)
}

pub fn encode_jpeg(pixels: &RgbImage, quality: u8) -> Result<Vec<u8>, EncodeError> {
    let mut buffer = Vec::new();
    pixels.write_with_encoder(JpegEncoder::new_with_quality(&mut buffer, quality))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::paginator::{paginate, PageSpec, SourceImage};
    use image::Rgb;

    /// Records every call so the command stream can be inspected.
    #[derive(Default)]
    struct RecordingEncoder {
        calls: Vec<String>,
    }

    impl DocumentEncoder for RecordingEncoder {
        fn new_page(&mut self) -> Result<(), EncodeError> {
            self.calls.push("new_page".to_string());
            Ok(())
        }

        fn place_image(
            &mut self,
            pixels: &RgbImage,
            x: f64,
            y: f64,
            width: f64,
            height: f64,
        ) -> Result<(), EncodeError> {
            self.calls.push(format!(
                "place {}x{} at {x},{y} size {width}x{height:.2}",
                pixels.width(),
                pixels.height()
            ));
            Ok(())
        }

        fn finish(self) -> Result<Vec<u8>, EncodeError> {
            Ok(self.calls.join("\n").into_bytes())
        }
    }

    fn white(width: u32, height: u32) -> SourceImage {
        SourceImage::new(RgbImage::from_pixel(width, height, Rgb([255, 255, 255])))
    }

    #[test]
    fn test_mm_to_pt() {
        assert!((mm_to_pt(25.4) - 72.0).abs() < 1e-9);
        assert!((mm_to_pt(210.0) - 595.2756).abs() < 1e-3);
    }

    #[test]
    fn test_encode_document_replays_commands() {
        let doc = paginate(&white(1000, 5000), &PageSpec::new(210.0, 297.0)).unwrap();
        let out = encode_document(&doc, RecordingEncoder::default()).unwrap();
        let calls = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = calls.lines().collect();

        assert_eq!(
            lines,
            vec![
                "place 1000x1414 at 0,0 size 210x296.94",
                "new_page",
                "place 1000x1414 at 0,0 size 210x296.94",
                "new_page",
                "place 1000x1414 at 0,0 size 210x296.94",
                "new_page",
                "place 1000x758 at 0,0 size 210x159.18",
            ]
        );
    }

    #[test]
    fn test_pdf_has_one_page_per_slice() {
        let doc = paginate(&white(100, 500), &PageSpec::new(210.0, 297.0)).unwrap();
        let bytes = encode_document(&doc, PdfEncoder::new(210.0, 297.0)).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let parsed = lopdf::Document::load_mem(&bytes).unwrap();
        assert_eq!(parsed.get_pages().len(), doc.page_count());
    }

    fn floats(objects: &[Object]) -> Vec<f64> {
        objects
            .iter()
            .map(|o| f64::from(o.as_float().unwrap()))
            .collect()
    }

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len(), "{actual:?} vs {expected:?}");
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 0.01, "{actual:?} vs {expected:?}");
        }
    }

    #[test]
    fn test_short_last_page_is_anchored_to_top() {
        let doc = paginate(&white(1000, 5000), &PageSpec::new(210.0, 297.0)).unwrap();
        let bytes = encode_document(&doc, PdfEncoder::new(210.0, 297.0)).unwrap();
        let parsed = lopdf::Document::load_mem(&bytes).unwrap();
        let pages = parsed.get_pages();
        assert_eq!(pages.len(), 4);
        let last_id = pages[&4];

        let page_width_pt = mm_to_pt(210.0);
        let page_height_pt = mm_to_pt(297.0);
        let media_box = parsed
            .get_dictionary(last_id)
            .unwrap()
            .get(b"MediaBox")
            .unwrap()
            .as_array()
            .unwrap()
            .clone();
        assert_close(&floats(&media_box), &[0.0, 0.0, page_width_pt, page_height_pt]);

        let content = Content::decode(&parsed.get_page_content(last_id).unwrap()).unwrap();
        let cm = content
            .operations
            .iter()
            .find(|op| op.operator == "cm")
            .unwrap();
        let slice_height_pt = mm_to_pt(159.18);
        assert_close(
            &floats(&cm.operands),
            &[
                page_width_pt,
                0.0,
                0.0,
                slice_height_pt,
                0.0,
                page_height_pt - slice_height_pt,
            ],
        );
    }

    #[test]
    fn test_pdf_single_page() {
        let doc = paginate(&white(50, 20), &PageSpec::new(215.9, 279.4)).unwrap();
        let bytes = encode_document(&doc, PdfEncoder::new(215.9, 279.4).with_title("Jane Doe"))
            .unwrap();
        let parsed = lopdf::Document::load_mem(&bytes).unwrap();
        assert_eq!(parsed.get_pages().len(), 1);
    }

    #[test]
    fn test_png_and_jpeg_signatures() {
        let pixels = RgbImage::from_pixel(8, 8, Rgb([1, 2, 3]));
        let png = encode_png(&pixels).unwrap();
        assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));
        let jpeg = encode_jpeg(&pixels, JPEG_QUALITY).unwrap();
        assert!(jpeg.starts_with(&[0xFF, 0xD8]));
    }
}
