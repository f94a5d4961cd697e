use std::io::Cursor;

use anyhow::Context as _;

use crate::foundation::error::{SkinError, SkinResult};

// Avoid pathological allocations from runaway placement rectangles.
const MAX_DIM: u32 = 16_384;

/// Rasterize SVG bytes to PNG at exactly `width` x `height`.
///
/// The fit is a non-uniform stretch: both axes are scaled independently to
/// the target size. Canvases and components are authored against their
/// placement rectangles, so preserving the aspect ratio here would be wrong.
pub fn rasterize_svg(svg: &[u8], width: u32, height: u32) -> SkinResult<Vec<u8>> {
    if width == 0 || height == 0 {
        return Err(SkinError::geometry(format!(
            "cannot rasterize to {width}x{height}"
        )));
    }
    if width > MAX_DIM || height > MAX_DIM {
        return Err(SkinError::geometry(format!(
            "raster size too large: {width}x{height} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }

    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(svg, &opts)
        .map_err(|err| SkinError::parse(format!("parse svg tree: {err}")))?;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| SkinError::geometry("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);
    resvg::render(&tree, xform, &mut pixmap.as_mut());

    encode_png(&pixmap)
}

/// Encode a premultiplied pixmap as straight-alpha PNG bytes.
fn encode_png(pixmap: &resvg::tiny_skia::Pixmap) -> SkinResult<Vec<u8>> {
    let mut rgba = Vec::with_capacity(pixmap.data().len());
    for px in pixmap.pixels() {
        let c = px.demultiply();
        rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    let img = image::RgbaImage::from_raw(pixmap.width(), pixmap.height(), rgba)
        .ok_or_else(|| SkinError::geometry("pixmap size mismatch"))?;

    let mut out = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .context("encode png")?;
    Ok(out)
}
