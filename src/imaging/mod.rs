//! Image compression: decode, resize, re-encode under a byte budget.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` (format sniffed from content) |
//! | **Resize** | `resize_exact` with Lanczos3 |
//! | **Encode → JPEG** | `JpegEncoder::new_with_quality` |
//! | **Data URI** | `base64` standard engine |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension and size math (unit testable)
//! - **Parameters**: Quality, quality ladder, compression params
//! - **Codec**: [`ImageCodec`] trait + [`RustCodec`]
//! - **Operations**: Budget search combining calculations + codec

mod calculations;
pub mod codec;
pub mod operations;
mod params;
pub mod rust_codec;

pub use calculations::{estimate_encoded_bytes, resolve_dimensions};
pub use codec::{CodecError, Dimensions, ImageCodec};
pub use operations::{Compressed, JPEG_MIME, compress, fit_to_budget};
pub use params::{CompressionParams, Quality, QualityLadder};
pub use rust_codec::{RustCodec, is_supported_image, supported_input_extensions};
