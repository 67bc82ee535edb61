//! Pure Rust codec built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, WebP, GIF, BMP, TIFF) | `image::ImageReader` with format sniffing |
//! | Draw onto surface | `DynamicImage::resize_exact` with `Lanczos3`, flattened to RGB8 |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder::new_with_quality` |
//!
//! JPEG has no alpha channel, so transparent pixels lose their alpha when the
//! surface is flattened, the same as exporting a canvas to `image/jpeg`.

use super::codec::{CodecError, Dimensions, ImageCodec};
use super::params::Quality;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, ImageFormat, ImageReader, RgbImage};
use std::io::Cursor;
use std::sync::LazyLock;

/// Longest surface edge we agree to allocate. Matches common canvas limits.
pub const MAX_SURFACE_EDGE: u32 = 16_384;

const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("webp", ImageFormat::WebP),
    ("gif", ImageFormat::Gif),
    ("bmp", ImageFormat::Bmp),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    PHOTO_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Whether a file name carries one of the [supported extensions](supported_input_extensions).
pub fn is_supported_image(name: &str) -> bool {
    std::path::Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            supported_input_extensions()
                .iter()
                .any(|s| s.eq_ignore_ascii_case(ext))
        })
}

/// Production codec using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustCodec;

impl RustCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustCodec {
    fn default() -> Self {
        Self::new()
    }
}

fn check_surface(target: Dimensions) -> Result<(), CodecError> {
    let Dimensions { width, height } = target;
    let fits = width > 0
        && height > 0
        && width <= MAX_SURFACE_EDGE
        && height <= MAX_SURFACE_EDGE
        && (width as usize)
            .checked_mul(height as usize)
            .and_then(|px| px.checked_mul(3))
            .is_some();
    if fits {
        Ok(())
    } else {
        Err(CodecError::SurfaceAllocation { width, height })
    }
}

impl ImageCodec for RustCodec {
    type Raster = DynamicImage;
    type Surface = RgbImage;

    fn decode(&self, data: &[u8]) -> Result<DynamicImage, CodecError> {
        ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| CodecError::Decode(e.to_string()))?
            .decode()
            .map_err(|e| CodecError::Decode(e.to_string()))
    }

    fn dimensions(&self, raster: &DynamicImage) -> Dimensions {
        Dimensions::new(raster.width(), raster.height())
    }

    fn draw(&self, raster: &DynamicImage, target: Dimensions) -> Result<RgbImage, CodecError> {
        check_surface(target)?;
        if self.dimensions(raster) == target {
            return Ok(raster.to_rgb8());
        }
        Ok(raster
            .resize_exact(target.width, target.height, FilterType::Lanczos3)
            .to_rgb8())
    }

    fn encode_jpeg(&self, surface: &RgbImage, quality: Quality) -> Result<Vec<u8>, CodecError> {
        let mut buf = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality.as_percent());
        encoder
            .encode(
                surface.as_raw(),
                surface.width(),
                surface.height(),
                ExtendedColorType::Rgb8,
            )
            .map_err(|e| CodecError::Encode(e.to_string()))?;
        Ok(buf)
    }
}
