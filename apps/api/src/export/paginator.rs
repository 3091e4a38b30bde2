//! Paginator: slices one tall raster capture into fixed-size document pages.
//!
//! The capture is always scaled to exactly fill the page width. The page height
//! then decides how many source rows fit on one page (`max_slice_px`), and the
//! image is cut into consecutive full-width bands of at most that many rows.
//! Stacking the bands in order reproduces the source image row for row.
//!
//! Pixel counts use integer arithmetic; floating point is only used for the
//! unit conversion factor so that row budgets never drift across pages.

use image::{imageops, RgbImage};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PaginateError {
    /// The source image has a zero dimension. Fix the capture, do not retry.
    #[error("invalid source image: {width_px}x{height_px} px (both dimensions must be positive)")]
    InvalidInput { width_px: u32, height_px: u32 },

    /// The page geometry cannot hold a single pixel row, or is not a usable size.
    #[error("page configuration error: {0}")]
    Configuration(String),
}

// ────────────────────────────────────────────────────────────────────────────
// Inputs
// ────────────────────────────────────────────────────────────────────────────

/// Immutable 8-bit RGB raster produced by the rasterizer for one export request.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pixels: RgbImage,
}

impl SourceImage {
    pub fn new(pixels: RgbImage) -> Self {
        Self { pixels }
    }

    pub fn width_px(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height_px(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }
}

/// Physical page size in millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSpec {
    pub page_width_units: f64,
    pub page_height_units: f64,
}

impl PageSpec {
    pub const fn new(page_width_units: f64, page_height_units: f64) -> Self {
        Self {
            page_width_units,
            page_height_units,
        }
    }

    fn check(&self) -> Result<(), PaginateError> {
        let usable = |v: f64| v.is_finite() && v > 0.0;
        if usable(self.page_width_units) && usable(self.page_height_units) {
            Ok(())
        } else {
            Err(PaginateError::Configuration(format!(
                "page size must be positive, got {} x {}",
                self.page_width_units, self.page_height_units
            )))
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Outputs
// ────────────────────────────────────────────────────────────────────────────

/// Row range of one page inside the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceBounds {
    pub offset_px: u32,
    pub height_px: u32,
}

/// One page of the output: a full-width band of the source image.
#[derive(Debug, Clone)]
pub struct Page {
    pub offset_px: u32,
    pub width_px: u32,
    pub height_px: u32,
    /// Placement height on the page. Derived from this page's own rows, so a
    /// short final page is never stretched to the full page height.
    pub height_units: f64,
    pub pixels: RgbImage,
}

impl Page {
    pub fn bounds(&self) -> SliceBounds {
        SliceBounds {
            offset_px: self.offset_px,
            height_px: self.height_px,
        }
    }
}

/// What the encoder is asked to do, in order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlacementCommand {
    /// Start a fresh blank page. Never emitted before the first page.
    NewPage,
    /// Draw page `page` with its top-left corner at (`x_units`, `y_units`).
    PlaceImage {
        page: usize,
        x_units: f64,
        y_units: f64,
        width_units: f64,
        height_units: f64,
    },
}

/// The paginated document: pages in source row order plus the page size.
#[derive(Debug, Clone)]
pub struct Document {
    pub page_width_units: f64,
    pub page_height_units: f64,
    pub pages: Vec<Page>,
}

impl Document {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn bounds(&self) -> Vec<SliceBounds> {
        self.pages.iter().map(Page::bounds).collect()
    }

    /// The encoder command sequence for this document.
    pub fn commands(&self) -> Vec<PlacementCommand> {
        let mut commands = Vec::with_capacity(self.pages.len() * 2);
        for (index, page) in self.pages.iter().enumerate() {
            if index > 0 {
                commands.push(PlacementCommand::NewPage);
            }
            commands.push(PlacementCommand::PlaceImage {
                page: index,
                x_units: 0.0,
                y_units: 0.0,
                width_units: self.page_width_units,
                height_units: page.height_units,
            });
        }
        commands
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Core functions
// ────────────────────────────────────────────────────────────────────────────

/// Computes the page row ranges for an image of the given pixel size.
///
/// Pure arithmetic, no pixel access. `paginate` is built on top of this.
pub fn plan_slices(
    width_px: u32,
    height_px: u32,
    spec: &PageSpec,
) -> Result<Vec<SliceBounds>, PaginateError> {
    if width_px == 0 || height_px == 0 {
        return Err(PaginateError::InvalidInput {
            width_px,
            height_px,
        });
    }
    spec.check()?;

    let units_per_pixel = spec.page_width_units / f64::from(width_px);
    let max_slice_px = (spec.page_height_units / units_per_pixel).floor();
    if max_slice_px < 1.0 {
        return Err(PaginateError::Configuration(format!(
            "a {} x {} page holds less than one pixel row of a {width_px} px wide image",
            spec.page_width_units, spec.page_height_units
        )));
    }

    // Whole image fits on one page: no slicing at all.
    if f64::from(height_px) * units_per_pixel <= spec.page_height_units {
        return Ok(vec![SliceBounds {
            offset_px: 0,
            height_px,
        }]);
    }

    // `max_slice_px` is at most `height_px` here, so the cast cannot truncate.
    let max_slice_px = max_slice_px.min(f64::from(height_px)) as u32;

    let mut slices = Vec::with_capacity(height_px.div_ceil(max_slice_px) as usize);
    let mut offset_px = 0u32;
    while offset_px < height_px {
        let slice_px = (height_px - offset_px).min(max_slice_px);
        slices.push(SliceBounds {
            offset_px,
            height_px: slice_px,
        });
        offset_px += slice_px;
    }
    Ok(slices)
}

/// Splits `image` into pages of `spec`, each scaled to the full page width.
///
/// Fails with `InvalidInput` for a zero-sized image (checked before anything
/// else) and with `Configuration` when a page cannot hold one pixel row.
pub fn paginate(image: &SourceImage, spec: &PageSpec) -> Result<Document, PaginateError> {
    let width_px = image.width_px();
    let slices = plan_slices(width_px, image.height_px(), spec)?;

    let pages = slices
        .into_iter()
        .map(|slice| {
            let pixels = if slice.offset_px == 0 && slice.height_px == image.height_px() {
                image.pixels().clone()
            } else {
                imageops::crop_imm(image.pixels(), 0, slice.offset_px, width_px, slice.height_px)
                    .to_image()
            };
            Page {
                offset_px: slice.offset_px,
                width_px,
                height_px: slice.height_px,
                height_units: placement_height(slice.height_px, width_px, spec),
                pixels,
            }
        })
        .collect();

    Ok(Document {
        page_width_units: spec.page_width_units,
        page_height_units: spec.page_height_units,
        pages,
    })
}

/// `height_px * page_width / width_px`, the height a band occupies once scaled
/// to the page width.
pub fn placement_height(height_px: u32, width_px: u32, spec: &PageSpec) -> f64 {
    f64::from(height_px) * spec.page_width_units / f64::from(width_px)
}
