//! Image codec trait and shared types.
//!
//! The [`ImageCodec`] trait is the capability the pipeline needs from an
//! imaging runtime: decode a blob, draw it onto a surface of a given size,
//! and serialise that surface as JPEG at a given quality.
//!
//! The production implementation is
//! [`RustCodec`](super::rust_codec::RustCodec), built on the `image` crate.
//! Tests use the recording `MockCodec` in [`tests`], which needs no real
//! image files.

use super::params::Quality;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Failed to decode image: {0}")]
    Decode(String),
    #[error("Could not allocate a {width}x{height} drawing surface")]
    SurfaceAllocation { width: u32, height: u32 },
    #[error("Encoding failed: {0}")]
    Encode(String),
}

/// Pixel dimensions of a decoded image or surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn as_tuple(self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl From<(u32, u32)> for Dimensions {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

/// Trait for imaging runtimes.
///
/// `Raster` is the decoded source image. It must be `Send + 'static` because
/// decoding may run on a helper thread guarded by a timeout. `Surface` is the
/// resized drawing target; it is created once per file and encoded repeatedly
/// while the quality ladder is walked.
pub trait ImageCodec: Send + Sync {
    type Raster: Send + 'static;
    type Surface;

    /// Decode an encoded image blob (JPEG, PNG, ...).
    fn decode(&self, data: &[u8]) -> Result<Self::Raster, CodecError>;

    /// Natural size of a decoded image.
    fn dimensions(&self, raster: &Self::Raster) -> Dimensions;

    /// Allocate a surface of `target` size and draw `raster` scaled into it.
    fn draw(&self, raster: &Self::Raster, target: Dimensions) -> Result<Self::Surface, CodecError>;

    /// Serialise a surface as baseline JPEG at the given quality.
    fn encode_jpeg(&self, surface: &Self::Surface, quality: Quality) -> Result<Vec<u8>, CodecError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Mock codec that records operations and fabricates encodings.
    ///
    /// Blobs are parsed as text: `"WxH"` decodes to a raster of that size,
    /// `"hang"` blocks for a while (for timeout tests), anything else is a
    /// decode error. Encoded length comes from `size_model`.
    pub struct MockCodec {
        pub operations: Mutex<Vec<RecordedOp>>,
        pub size_model: fn(Dimensions, Quality) -> usize,
        pub fail_surface: bool,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Decode(String),
        Draw { width: u32, height: u32 },
        Encode { width: u32, height: u32, quality: u8 },
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MockRaster(pub Dimensions);

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MockSurface(pub Dimensions);

    /// Roughly half a byte per pixel at full quality, linear in quality.
    pub fn linear_size(dims: Dimensions, quality: Quality) -> usize {
        let pixels = dims.width as usize * dims.height as usize;
        pixels * quality.as_percent() as usize / 200
    }

    impl Default for MockCodec {
        fn default() -> Self {
            Self {
                operations: Mutex::new(Vec::new()),
                size_model: linear_size,
                fail_surface: false,
            }
        }
    }

    impl MockCodec {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_size_model(size_model: fn(Dimensions, Quality) -> usize) -> Self {
            Self {
                size_model,
                ..Self::default()
            }
        }

        pub fn failing_surface() -> Self {
            Self {
                fail_surface: true,
                ..Self::default()
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        pub fn decoded_blobs(&self) -> Vec<String> {
            self.get_operations()
                .into_iter()
                .filter_map(|op| match op {
                    RecordedOp::Decode(blob) => Some(blob),
                    _ => None,
                })
                .collect()
        }

        pub fn encoded_qualities(&self) -> Vec<u8> {
            self.get_operations()
                .into_iter()
                .filter_map(|op| match op {
                    RecordedOp::Encode { quality, .. } => Some(quality),
                    _ => None,
                })
                .collect()
        }
    }

    fn parse_blob(text: &str) -> Option<Dimensions> {
        let (w, h) = text.split_once('x')?;
        Some(Dimensions::new(w.parse().ok()?, h.parse().ok()?))
    }

    impl ImageCodec for MockCodec {
        type Raster = MockRaster;
        type Surface = MockSurface;

        fn decode(&self, data: &[u8]) -> Result<MockRaster, CodecError> {
            let text = String::from_utf8_lossy(data).to_string();
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Decode(text.clone()));

            if text == "hang" {
                std::thread::sleep(Duration::from_secs(2));
            }
            parse_blob(&text)
                .map(MockRaster)
                .ok_or_else(|| CodecError::Decode(format!("not an image: {text:?}")))
        }

        fn dimensions(&self, raster: &MockRaster) -> Dimensions {
            raster.0
        }

        fn draw(&self, _raster: &MockRaster, target: Dimensions) -> Result<MockSurface, CodecError> {
            self.operations.lock().unwrap().push(RecordedOp::Draw {
                width: target.width,
                height: target.height,
            });
            if self.fail_surface {
                return Err(CodecError::SurfaceAllocation {
                    width: target.width,
                    height: target.height,
                });
            }
            Ok(MockSurface(target))
        }

        fn encode_jpeg(&self, surface: &MockSurface, quality: Quality) -> Result<Vec<u8>, CodecError> {
            self.operations.lock().unwrap().push(RecordedOp::Encode {
                width: surface.0.width,
                height: surface.0.height,
                quality: quality.as_percent(),
            });
            Ok(vec![0xAB; (self.size_model)(surface.0, quality)])
        }
    }

    #[test]
    fn mock_decodes_dimension_blobs() {
        let codec = MockCodec::new();
        let raster = codec.decode(b"4000x3000").unwrap();
        assert_eq!(codec.dimensions(&raster), Dimensions::new(4000, 3000));
        assert_eq!(codec.decoded_blobs(), vec!["4000x3000".to_string()]);
    }

    #[test]
    fn mock_rejects_non_image_blob() {
        let codec = MockCodec::new();
        let result = codec.decode(b"%PDF-1.7");
        assert!(matches!(result, Err(CodecError::Decode(_))));
    }

    #[test]
    fn mock_records_draw_and_encode() {
        let codec = MockCodec::new();
        let raster = codec.decode(b"200x100").unwrap();
        let surface = codec.draw(&raster, Dimensions::new(100, 50)).unwrap();
        let bytes = codec.encode_jpeg(&surface, Quality::new(0.5)).unwrap();

        assert_eq!(bytes.len(), 100 * 50 * 50 / 200);
        let ops = codec.get_operations();
        assert_eq!(ops.len(), 3);
        assert!(matches!(
            &ops[2],
            RecordedOp::Encode {
                width: 100,
                height: 50,
                quality: 50
            }
        ));
    }

    #[test]
    fn mock_surface_failure() {
        let codec = MockCodec::failing_surface();
        let raster = codec.decode(b"10x10").unwrap();
        let result = codec.draw(&raster, Dimensions::new(10, 10));
        assert!(matches!(
            result,
            Err(CodecError::SurfaceAllocation {
                width: 10,
                height: 10
            })
        ));
    }
}
