//! Pure calculation functions for image dimensions and encoded sizes.
//!
//! All functions here are pure and testable without any I/O or images.

/// Fit `(width, height)` under a maximum edge length, preserving aspect ratio.
///
/// Images whose longer edge is already within `max_dimension` come back
/// unchanged. Otherwise the longer edge becomes `max_dimension` and the
/// shorter edge is scaled proportionally and rounded to the nearest pixel
/// (never below 1).
///
/// # Examples
/// ```
/// # use estate_media::imaging::resolve_dimensions;
/// // 4000x3000 landscape under 1200 → 1200x900
/// assert_eq!(resolve_dimensions((4000, 3000), 1200), (1200, 900));
///
/// // Already small enough → untouched
/// assert_eq!(resolve_dimensions((640, 480), 1200), (640, 480));
/// ```
pub fn resolve_dimensions(natural: (u32, u32), max_dimension: u32) -> (u32, u32) {
    let (w, h) = natural;

    if w.max(h) <= max_dimension {
        return (w, h);
    }

    let max = max_dimension as f64;
    if w >= h {
        // Landscape or square: width is the long edge
        let scaled = (h as f64 * max / w as f64).round() as u32;
        (max_dimension, scaled.max(1))
    } else {
        // Portrait
        let scaled = (w as f64 * max / h as f64).round() as u32;
        (scaled.max(1), max_dimension)
    }
}

/// Estimate the decoded byte size of a base64 payload: `ceil(len * 3 / 4)`.
///
/// Padding characters and any `data:` header are not subtracted, so the
/// real payload can be a byte or two smaller than this estimate while the
/// stored data URI string is larger.
pub fn estimate_encoded_bytes(base64_len: usize) -> usize {
    (base64_len * 3).div_ceil(4)
}
