//! Bitmap rendering of one invitation document.
//!
//! The document is drawn onto a fixed 800x1000 canvas (times an
//! oversampling factor for print quality): a colored header band, the body
//! text, an optional call-to-action pill and a footer line, all styled from
//! the selected design's palette. The `Rasterizer` trait is the seam the
//! batch worker goes through, so tests can swap in a mock and never touch
//! font files.

use ab_glyph::{FontVec, PxScale};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use std::fs;
use std::io::Cursor;
use std::path::Path;

use common::model::design::DesignTemplate;

/// Base canvas size before oversampling.
pub const BASE_WIDTH: u32 = 800;
pub const BASE_HEIGHT: u32 = 1000;

/// Font files probed inside the configured fonts directory, in order.
const FONT_CANDIDATES: [&str; 4] = [
    "NotoSansKR-Regular.ttf",
    "Arial-Regular.ttf",
    "Arial.ttf",
    "LiberationSans-Regular.ttf",
];

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("폰트를 불러오지 못했습니다: {0}")]
    Font(String),
    #[error("렌더링 실패: {0}")]
    Render(String),
    #[error("인코딩 실패: {0}")]
    Encode(String),
}

/// A fully substituted document ready to draw. All placeholder tokens have
/// already been replaced with recipient values.
#[derive(Debug, Clone)]
pub struct RenderDoc {
    pub header: String,
    pub body: String,
    pub footer: String,
    pub cta: String,
    pub design: DesignTemplate,
}

pub trait Rasterizer: Send + Sync {
    fn render(&self, doc: &RenderDoc) -> Result<RgbaImage, RenderError>;
}

/// Parse a `#rrggbb` hex string, falling back to `fallback` on anything else.
pub fn parse_hex(color: &str, fallback: Rgba<u8>) -> Rgba<u8> {
    let hex = color.strip_prefix('#').unwrap_or(color);
    if hex.len() != 6 {
        return fallback;
    }
    match (
        u8::from_str_radix(&hex[0..2], 16),
        u8::from_str_radix(&hex[2..4], 16),
        u8::from_str_radix(&hex[4..6], 16),
    ) {
        (Ok(r), Ok(g), Ok(b)) => Rgba([r, g, b, 255]),
        _ => fallback,
    }
}

pub struct BitmapRasterizer {
    font: FontVec,
    scale: u32,
}

impl BitmapRasterizer {
    /// Load the first available TTF from `fonts_dir`. Korean text needs a
    /// font with Hangul coverage, so NotoSansKR is probed first.
    pub fn from_fonts_dir(fonts_dir: &str, scale: u32) -> Result<Self, RenderError> {
        for candidate in FONT_CANDIDATES {
            let path = Path::new(fonts_dir).join(candidate);
            if !path.exists() {
                continue;
            }
            let bytes = fs::read(&path).map_err(|e| RenderError::Font(e.to_string()))?;
            let font =
                FontVec::try_from_vec(bytes).map_err(|e| RenderError::Font(e.to_string()))?;
            return Ok(BitmapRasterizer { font, scale });
        }
        Err(RenderError::Font(format!(
            "{fonts_dir} 안에서 사용할 수 있는 TTF를 찾지 못했습니다"
        )))
    }

    fn px(&self, base: u32) -> u32 {
        base * self.scale
    }

    /// Character-based wrapping; Korean text has no reliable word breaks.
    fn wrap(&self, text: &str, size: f32, max_width: u32) -> Vec<String> {
        let scale = PxScale::from(size);
        let mut lines = Vec::new();
        for paragraph in text.split('\n') {
            if paragraph.is_empty() {
                lines.push(String::new());
                continue;
            }
            let mut line = String::new();
            for c in paragraph.chars() {
                let mut candidate = line.clone();
                candidate.push(c);
                let (w, _) = text_size(scale, &self.font, &candidate);
                if w > max_width && !line.is_empty() {
                    lines.push(line);
                    line = c.to_string();
                } else {
                    line = candidate;
                }
            }
            lines.push(line);
        }
        lines
    }

    fn draw_centered(
        &self,
        canvas: &mut RgbaImage,
        color: Rgba<u8>,
        y: i32,
        size: f32,
        text: &str,
    ) {
        let scale = PxScale::from(size);
        let (w, _) = text_size(scale, &self.font, text);
        let x = (canvas.width().saturating_sub(w) / 2) as i32;
        draw_text_mut(canvas, color, x, y, scale, &self.font, text);
    }
}

impl Rasterizer for BitmapRasterizer {
    fn render(&self, doc: &RenderDoc) -> Result<RgbaImage, RenderError> {
        let width = self.px(BASE_WIDTH);
        let height = self.px(BASE_HEIGHT);
        let colors = &doc.design.colors;

        let background = parse_hex(&colors.background, Rgba([255, 255, 255, 255]));
        let primary = parse_hex(&colors.primary, Rgba([30, 64, 175, 255]));
        let accent = parse_hex(&colors.accent, Rgba([96, 165, 250, 255]));
        let text_color = parse_hex(&colors.text, Rgba([31, 41, 55, 255]));
        let secondary = parse_hex(&colors.secondary, Rgba([107, 114, 128, 255]));
        let white = Rgba([255, 255, 255, 255]);

        let mut canvas = RgbaImage::from_pixel(width, height, background);

        // Header band across the full width.
        let band_height = self.px(200);
        draw_filled_rect_mut(
            &mut canvas,
            Rect::at(0, 0).of_size(width, band_height),
            primary,
        );
        let heading_size = self.px(34) as f32;
        let heading_lines = self.wrap(&doc.header, heading_size, self.px(680));
        let mut y = self.px(64) as i32;
        for line in &heading_lines {
            self.draw_centered(&mut canvas, white, y, heading_size, line);
            y += self.px(46) as i32;
        }

        // Body flows below the band.
        let body_size = self.px(20) as f32;
        let line_height = self.px(32) as i32;
        let margin_x = self.px(60) as i32;
        let mut y = self.px(250) as i32;
        for line in self.wrap(&doc.body, body_size, self.px(680)) {
            if !line.is_empty() {
                draw_text_mut(
                    &mut canvas,
                    text_color,
                    margin_x,
                    y,
                    PxScale::from(body_size),
                    &self.font,
                    &line,
                );
            }
            y += line_height;
        }

        // Call-to-action pill, when present, sits between body and footer.
        if !doc.cta.trim().is_empty() {
            let cta_size = self.px(22) as f32;
            let (text_w, _) = text_size(PxScale::from(cta_size), &self.font, &doc.cta);
            let pill_w = (text_w + self.px(64)).min(width - self.px(40));
            let pill_h = self.px(60);
            let pill_x = ((width - pill_w) / 2) as i32;
            let pill_y = (y + self.px(40) as i32).min((height - self.px(200)) as i32);
            draw_filled_rect_mut(
                &mut canvas,
                Rect::at(pill_x, pill_y).of_size(pill_w, pill_h),
                accent,
            );
            self.draw_centered(
                &mut canvas,
                white,
                pill_y + self.px(16) as i32,
                cta_size,
                &doc.cta,
            );
        }

        // Footer anchored near the bottom edge.
        let footer_size = self.px(15) as f32;
        let mut y = (height - self.px(90)) as i32;
        for line in self.wrap(&doc.footer, footer_size, self.px(700)) {
            self.draw_centered(&mut canvas, secondary, y, footer_size, &line);
            y += self.px(22) as i32;
        }

        Ok(canvas)
    }
}

pub fn encode_png(bitmap: &RgbaImage) -> Result<Vec<u8>, RenderError> {
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(bitmap.clone())
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|e| RenderError::Encode(e.to_string()))?;
    Ok(out.into_inner())
}

pub fn encode_jpeg(bitmap: &RgbaImage, quality: u8) -> Result<Vec<u8>, RenderError> {
    // JPEG has no alpha channel; flatten to RGB first.
    let rgb = DynamicImage::ImageRgba8(bitmap.clone()).to_rgb8();
    let mut out = Cursor::new(Vec::new());
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality);
    rgb.write_with_encoder(encoder)
        .map_err(|e| RenderError::Encode(e.to_string()))?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_parsing_with_fallback() {
        let fallback = Rgba([1, 2, 3, 255]);
        assert_eq!(parse_hex("#1e40af", fallback), Rgba([0x1e, 0x40, 0xaf, 255]));
        assert_eq!(parse_hex("1e40af", fallback), Rgba([0x1e, 0x40, 0xaf, 255]));
        assert_eq!(parse_hex("#zzz", fallback), fallback);
        assert_eq!(parse_hex("", fallback), fallback);
    }

    #[test]
    fn png_encoding_produces_a_png_signature() {
        let img = RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 255]));
        let bytes = encode_png(&img).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn jpeg_encoding_produces_a_jfif_marker() {
        let img = RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 255]));
        let bytes = encode_jpeg(&img, 90).unwrap();
        assert_eq!(&bytes[..2], b"\xff\xd8");
    }
}
