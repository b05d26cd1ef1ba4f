//! PDF packaging of a rendered bitmap.
//!
//! The invitation is rasterized once and embedded as a full-width image on
//! an A4 page, so the PDF is pixel-identical to the PNG/JPG outputs. The
//! image DPI is chosen so the bitmap exactly fills the printable width.

use genpdf::elements::Image as PdfImage;
use genpdf::Document;
use image::{DynamicImage, RgbaImage};
use tempfile::NamedTempFile;

use super::render::RenderError;

const PAGE_WIDTH_INCH: f64 = 8.27; // A4
const MARGIN_MM: f64 = 10.0;

/// Load a font family with Hangul coverage from the configured directory,
/// with western fallbacks for installs that only ship Latin fonts.
fn load_font(
    fonts_dir: &str,
) -> Result<genpdf::fonts::FontFamily<genpdf::fonts::FontData>, RenderError> {
    for family in ["NotoSansKR", "Arial", "LiberationSans"] {
        if let Ok(loaded) = genpdf::fonts::from_files(fonts_dir, family, None) {
            return Ok(loaded);
        }
    }
    Err(RenderError::Font(format!(
        "{fonts_dir} 안에서 사용할 수 있는 폰트 패밀리를 찾지 못했습니다"
    )))
}

fn configure_document(fonts_dir: &str) -> Result<Document, RenderError> {
    let font_family = load_font(fonts_dir)?;
    let mut doc = Document::new(font_family);
    doc.set_title("초청장");

    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(10);
    doc.set_page_decorator(decorator);
    Ok(doc)
}

/// Embed `bitmap` on a single A4 page and return the PDF bytes.
pub fn bitmap_to_pdf(bitmap: &RgbaImage, fonts_dir: &str) -> Result<Vec<u8>, RenderError> {
    let mut doc = configure_document(fonts_dir)?;

    // Flatten alpha over white; PDF image streams are RGB.
    let (w, h) = bitmap.dimensions();
    let mut background = RgbaImage::from_pixel(w, h, image::Rgba([255, 255, 255, 255]));
    image::imageops::overlay(&mut background, bitmap, 0, 0);
    let rgb = DynamicImage::ImageRgba8(background).to_rgb8();

    // The image element reads from a file path, so stage a temporary PNG.
    // Keep the handle alive until rendering finishes.
    let tmp = NamedTempFile::new().map_err(|e| RenderError::Render(e.to_string()))?;
    rgb.save_with_format(tmp.path(), image::ImageFormat::Png)
        .map_err(|e| RenderError::Render(e.to_string()))?;

    let margin_in = MARGIN_MM / 25.4_f64;
    let content_width_in = PAGE_WIDTH_INCH - 2.0 * margin_in;
    // DPI that makes the bitmap span exactly the printable width.
    let dpi = w as f64 / content_width_in;

    let mut img_elem =
        PdfImage::from_path(tmp.path()).map_err(|e| RenderError::Render(e.to_string()))?;
    img_elem.set_dpi(dpi);
    doc.push(img_elem);

    let mut out = Vec::new();
    doc.render(&mut out)
        .map_err(|e| RenderError::Render(e.to_string()))?;
    drop(tmp);
    Ok(out)
}
