//! Export entry point: a captured preview becomes either a single image file
//! or a paginated PDF.
//!
//! Pagination and encoding are CPU-bound; HTTP handlers must run `export_capture`
//! inside `tokio::task::spawn_blocking`.

pub mod encoder;
pub mod handlers;
pub mod paginator;
pub mod raster;

use std::str::FromStr;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::export::encoder::{
    encode_document, encode_jpeg, encode_png, EncodeError, PdfEncoder, JPEG_QUALITY,
};
use crate::export::paginator::{paginate, PageSpec, PaginateError, SourceImage};
use crate::export::raster::RasterError;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Paginate(#[from] PaginateError),

    #[error(transparent)]
    Raster(#[from] RasterError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("unsupported export format '{0}' (expected png, jpeg, jpg or pdf)")]
    UnsupportedFormat(String),
}

// ────────────────────────────────────────────────────────────────────────────
// Formats and page sizes
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Jpeg,
    Pdf,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
            ExportFormat::Pdf => "application/pdf",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "jpeg" | "jpg" => Ok(ExportFormat::Jpeg),
            "pdf" => Ok(ExportFormat::Pdf),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Named paper sizes, portrait, in millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    A4,
    Letter,
}

impl PageSize {
    pub fn spec(self) -> PageSpec {
        match self {
            PageSize::A4 => PageSpec::new(210.0, 297.0),
            PageSize::Letter => PageSpec::new(215.9, 279.4),
        }
    }
}

impl FromStr for PageSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a4" => Ok(PageSize::A4),
            "letter" => Ok(PageSize::Letter),
            other => Err(format!("unknown page size '{other}' (expected a4 or letter)")),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Export
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
    /// Number of document pages; 1 for image formats.
    pub page_count: usize,
}

/// `{base}_{timestamp}.{ext}` with whitespace in the name replaced by `_`.
///
/// The timestamp is the ISO-8601 UTC instant with `:` and `.` replaced by `-`,
/// e.g. `2025-03-09T14-05-07-123Z`.
pub fn export_filename(name: &str, format: ExportFormat, now: DateTime<Utc>) -> String {
    let name = name.trim();
    let base = if name.is_empty() {
        "resume".to_string()
    } else {
        WHITESPACE_RUN.replace_all(name, "_").into_owned()
    };
    let timestamp = now.format("%Y-%m-%dT%H-%M-%S-%3fZ");
    format!("{base}_{timestamp}.{}", format.extension())
}

/// Encodes `image` as `format`. The PDF kind is paginated onto `page` first.
pub fn export_capture(
    image: &SourceImage,
    format: ExportFormat,
    page: PageSize,
    name: &str,
    now: DateTime<Utc>,
) -> Result<ExportedFile, ExportError> {
    let filename = export_filename(name, format, now);

    let (bytes, page_count) = match format {
        ExportFormat::Png => (encode_png(image.pixels())?, 1),
        ExportFormat::Jpeg => (encode_jpeg(image.pixels(), JPEG_QUALITY)?, 1),
        ExportFormat::Pdf => {
            let spec = page.spec();
            let document = paginate(image, &spec)?;
            debug!(
                "Paginated {}x{} px capture into {} page(s): {:?}",
                image.width_px(),
                image.height_px(),
                document.page_count(),
                document.bounds()
            );
            let title = if name.trim().is_empty() { "Resume" } else { name.trim() };
            let encoder = PdfEncoder::new(document.page_width_units, document.page_height_units)
                .with_title(title)
                .with_creation_time(now);
            (encode_document(&document, encoder)?, document.page_count())
        }
    };

    Ok(ExportedFile {
        filename,
        content_type: format.content_type(),
        bytes,
        page_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use image::{Rgb, RgbImage};

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 9, 14, 5, 7).unwrap() + chrono::Duration::milliseconds(123)
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("PNG".parse::<ExportFormat>().unwrap(), ExportFormat::Png);
        assert_eq!("jpg".parse::<ExportFormat>().unwrap(), ExportFormat::Jpeg);
        assert_eq!(" Jpeg ".parse::<ExportFormat>().unwrap(), ExportFormat::Jpeg);
        assert_eq!("pdf".parse::<ExportFormat>().unwrap(), ExportFormat::Pdf);
        assert!(matches!(
            "docx".parse::<ExportFormat>(),
            Err(ExportError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_page_size_parsing() {
        assert_eq!("A4".parse::<PageSize>().unwrap(), PageSize::A4);
        assert_eq!("letter".parse::<PageSize>().unwrap(), PageSize::Letter);
        assert!("a5".parse::<PageSize>().is_err());
    }

    #[test]
    fn test_filename_convention() {
        assert_eq!(
            export_filename("Jane  Q Doe", ExportFormat::Pdf, fixed_now()),
            "Jane_Q_Doe_2025-03-09T14-05-07-123Z.pdf"
        );
        assert_eq!(
            export_filename("   ", ExportFormat::Jpeg, fixed_now()),
            "resume_2025-03-09T14-05-07-123Z.jpg"
        );
    }

    #[test]
    fn test_pdf_export_paginates() {
        let image = SourceImage::new(RgbImage::from_pixel(100, 500, Rgb([255, 255, 255])));
        let file = export_capture(&image, ExportFormat::Pdf, PageSize::A4, "Jane", fixed_now())
            .unwrap();
        assert_eq!(file.page_count, 4);
        assert_eq!(file.content_type, "application/pdf");
        assert!(file.filename.ends_with(".pdf"));
        assert!(file.bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_pdf_export_uses_document_page_size() {
        let image = SourceImage::new(RgbImage::from_pixel(100, 100, Rgb([255, 255, 255])));
        let file = export_capture(&image, ExportFormat::Pdf, PageSize::Letter, "Jane", fixed_now())
            .unwrap();
        let parsed = lopdf::Document::load_mem(&file.bytes).unwrap();
        let (_, page_id) = parsed.get_pages().into_iter().next().unwrap();
        let media_box = parsed
            .get_dictionary(page_id)
            .unwrap()
            .get(b"MediaBox")
            .unwrap()
            .as_array()
            .unwrap()
            .clone();
        let width = f64::from(media_box[2].as_float().unwrap());
        let height = f64::from(media_box[3].as_float().unwrap());
        assert!((width - 612.0).abs() < 0.01, "{width}");
        assert!((height - 792.0).abs() < 0.01, "{height}");
    }

    #[test]
    fn test_image_export_skips_pagination() {
        // A capture far too tall for one page still exports as one image.
        let image = SourceImage::new(RgbImage::from_pixel(10, 5000, Rgb([0, 0, 0])));
        let file = export_capture(&image, ExportFormat::Png, PageSize::A4, "", fixed_now())
            .unwrap();
        assert_eq!(file.page_count, 1);
        assert_eq!(file.content_type, "image/png");
    }

    #[test]
    fn test_pdf_export_surfaces_paginate_errors() {
        let image = SourceImage::new(RgbImage::new(0, 10));
        let err = export_capture(&image, ExportFormat::Pdf, PageSize::A4, "", fixed_now())
            .unwrap_err();
        assert!(matches!(
            err,
            ExportError::Paginate(PaginateError::InvalidInput { .. })
        ));
    }
}
