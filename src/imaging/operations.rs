//! High-level image operations.
//!
//! These functions combine calculations with codec execution: resolve the
//! target size, draw the surface once, then walk the quality ladder until an
//! encoding fits the byte budget.

use super::calculations::{estimate_encoded_bytes, resolve_dimensions};
use super::codec::{CodecError, Dimensions, ImageCodec};
use super::params::{CompressionParams, Quality, QualityLadder};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, CodecError>;

/// MIME type of every encoding the pipeline produces.
pub const JPEG_MIME: &str = "image/jpeg";

/// Wrap raw bytes as a `data:<mime>;base64,<payload>` URI.
pub fn to_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// The base64 payload of a data URI (everything after the first comma).
pub fn data_uri_payload(uri: &str) -> &str {
    uri.split_once(',').map(|(_, payload)| payload).unwrap_or(uri)
}

/// One serialised surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Encoding {
    pub data_uri: String,
    pub quality: Quality,
    /// `ceil(payload_len * 3 / 4)`; see [`estimate_encoded_bytes`].
    pub estimated_bytes: usize,
}

/// Outcome of compressing one image.
#[derive(Debug, Clone, PartialEq)]
pub struct Compressed {
    pub data_uri: String,
    /// Size of the encoded surface.
    pub dimensions: Dimensions,
    /// Ladder step that produced `data_uri`.
    pub quality: Quality,
    pub estimated_bytes: usize,
    /// False when even the lowest ladder step exceeded the budget.
    pub within_budget: bool,
    /// Number of encodings tried.
    pub attempts: usize,
}

/// Compute the surface size for an image under the given params.
pub fn plan_surface(natural: Dimensions, params: &CompressionParams) -> Dimensions {
    resolve_dimensions(natural.as_tuple(), params.max_dimension).into()
}

/// Serialise a drawn surface to a JPEG data URI at `quality`.
pub fn encode_data_uri<C: ImageCodec>(
    codec: &C,
    surface: &C::Surface,
    quality: Quality,
) -> Result<Encoding> {
    let bytes = codec.encode_jpeg(surface, quality)?;
    let data_uri = to_data_uri(JPEG_MIME, &bytes);
    let estimated_bytes = estimate_encoded_bytes(data_uri_payload(&data_uri).len());
    Ok(Encoding {
        data_uri,
        quality,
        estimated_bytes,
    })
}

/// Walk the ladder from highest to lowest quality, stopping at the first
/// encoding whose estimate fits `budget_bytes`.
///
/// If no step fits, the lowest-quality encoding is returned with
/// `within_budget == false`. Callers decide whether that matters.
pub fn fit_to_budget<C: ImageCodec>(
    codec: &C,
    surface: &C::Surface,
    dimensions: Dimensions,
    ladder: &QualityLadder,
    budget_bytes: usize,
) -> Result<Compressed> {
    let mut last = None;

    for (index, &quality) in ladder.steps().iter().enumerate() {
        let encoding = encode_data_uri(codec, surface, quality)?;
        let fits = encoding.estimated_bytes <= budget_bytes;
        tracing::debug!(
            quality = %quality,
            estimated_bytes = encoding.estimated_bytes,
            budget_bytes,
            fits,
            "encoded surface"
        );
        let attempts = index + 1;
        if fits {
            return Ok(compressed(encoding, dimensions, true, attempts));
        }
        last = Some((encoding, attempts));
    }

    match last {
        Some((encoding, attempts)) => Ok(compressed(encoding, dimensions, false, attempts)),
        None => Err(CodecError::Encode("quality ladder is empty".into())),
    }
}

fn compressed(
    encoding: Encoding,
    dimensions: Dimensions,
    within_budget: bool,
    attempts: usize,
) -> Compressed {
    Compressed {
        data_uri: encoding.data_uri,
        dimensions,
        quality: encoding.quality,
        estimated_bytes: encoding.estimated_bytes,
        within_budget,
        attempts,
    }
}

/// Resize a decoded image and find the best encoding under budget.
///
/// The surface is drawn once and reused for every ladder step.
pub fn compress<C: ImageCodec>(
    codec: &C,
    raster: &C::Raster,
    params: &CompressionParams,
) -> Result<Compressed> {
    let target = plan_surface(codec.dimensions(raster), params);
    let surface = codec.draw(raster, target)?;
    fit_to_budget(codec, &surface, target, &params.ladder, params.budget_bytes)
}
