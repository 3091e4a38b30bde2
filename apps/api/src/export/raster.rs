//! Rasterizer boundary. Turns a captured preview into a `SourceImage`.
//!
//! The preview markup is rendered to pixels by the browser (or a headless
//! renderer); the service only receives the encoded capture. Decoding applies
//! the same options a renderer would: a background color behind transparent
//! pixels and an output scale.

use image::{imageops, imageops::FilterType, Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::export::paginator::SourceImage;

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("capture could not be decoded: {0}")]
    Decode(#[from] image::ImageError),

    #[error("invalid background color '{0}' (expected #rrggbb)")]
    Background(String),

    #[error("invalid raster scale {0}")]
    Scale(f32),
}

/// Options mirroring the renderer's `{scale, backgroundColor}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterOptions {
    pub scale: f32,
    pub background: String,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            background: "#ffffff".to_string(),
        }
    }
}

pub trait Rasterizer: Send + Sync {
    fn rasterize(&self, capture: &[u8], options: &RasterOptions) -> Result<SourceImage, RasterError>;
}

/// Decodes PNG/JPEG/GIF captures uploaded by the client.
pub struct CaptureDecoder;

impl Rasterizer for CaptureDecoder {
    fn rasterize(&self, capture: &[u8], options: &RasterOptions) -> Result<SourceImage, RasterError> {
        if !(options.scale.is_finite() && options.scale > 0.0) {
            return Err(RasterError::Scale(options.scale));
        }
        let background = parse_hex_color(&options.background)?;

        let decoded = image::load_from_memory(capture)?.to_rgba8();
        let flat = RgbImage::from_fn(decoded.width(), decoded.height(), |x, y| {
            let [r, g, b, a] = decoded.get_pixel(x, y).0;
            Rgb([
                blend(r, background[0], a),
                blend(g, background[1], a),
                blend(b, background[2], a),
            ])
        });

        if (options.scale - 1.0).abs() < f32::EPSILON {
            return Ok(SourceImage::new(flat));
        }

        let width = (flat.width() as f32 * options.scale).round() as u32;
        let height = (flat.height() as f32 * options.scale).round() as u32;
        if width == 0 || height == 0 {
            return Err(RasterError::Scale(options.scale));
        }
        Ok(SourceImage::new(imageops::resize(
            &flat,
            width,
            height,
            FilterType::Triangle,
        )))
    }
}

fn blend(fg: u8, bg: u8, alpha: u8) -> u8 {
    let a = u16::from(alpha);
    ((u16::from(fg) * a + u16::from(bg) * (255 - a) + 127) / 255) as u8
}

/// Parses `#rrggbb` (or `#rgb`) into RGB components.
pub fn parse_hex_color(s: &str) -> Result<[u8; 3], RasterError> {
    let bad = || RasterError::Background(s.to_string());
    let hex = s.trim().strip_prefix('#').ok_or_else(bad)?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(bad());
    }
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => return Err(bad()),
    };
    let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).map_err(|_| bad());
    Ok([channel(0)?, channel(2)?, channel(4)?])
}
