//! PNG thumbnail export for optimized vectors.

use std::fs;
use std::path::Path;

use resvg::{tiny_skia, usvg};

use crate::error::SvoptError;
use crate::source;

/// Raster export parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailOptions {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Source density in DPI; affects vector sampling before scaling.
    pub density: u32,
    /// Output compression quality. PNG encoding is lossless, so this is
    /// carried for interface compatibility with lossy encoders only.
    pub quality: u8,
}

impl Default for ThumbnailOptions {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            density: 120,
            quality: 90,
        }
    }
}

/// Rasterize `input` (raw markup, or a path to an .svg/.svgz file) into a
/// PNG written at `out_path`.
pub fn render(input: &str, out_path: &Path, opts: &ThumbnailOptions) -> Result<(), SvoptError> {
    let markup = if source::looks_like_markup(input) {
        input.to_string()
    } else {
        let path = Path::new(input);
        if !path.is_file() {
            return Err(SvoptError::Thumbnail(format!(
                "input is neither SVG markup nor a readable file: {}",
                input
            )));
        }
        source::read_markup(path)?
    };

    let mut usvg_opts = usvg::Options::default();
    usvg_opts.dpi = opts.density as f32;

    let tree = usvg::Tree::from_data(markup.as_bytes(), &usvg_opts)
        .map_err(|e| SvoptError::Thumbnail(e.to_string()))?;

    let mut pixmap = tiny_skia::Pixmap::new(opts.width, opts.height)
        .ok_or_else(|| SvoptError::Thumbnail("thumbnail dimensions must be nonzero".into()))?;

    let size = tree.size();
    let sx = opts.width as f32 / size.width();
    let sy = opts.height as f32 / size.height();
    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(sx, sy),
        &mut pixmap.as_mut(),
    );

    let png = pixmap
        .encode_png()
        .map_err(|e| SvoptError::Thumbnail(e.to_string()))?;
    fs::write(out_path, png)?;
    Ok(())
}
