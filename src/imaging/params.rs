//! Parameter types for image operations.
//!
//! These describe *what* to produce, not *how*. They sit between the
//! high-level [`operations`](super::operations) (which decide which encodings
//! to try) and the [`codec`](super::codec) (which does the pixel work), so a
//! mock codec can stand in without changing the search logic.
//!
//! ## Types
//!
//! - [`Quality`]: lossy encoding quality in `(0, 1]`. Clamped on construction.
//! - [`QualityLadder`]: ordered, strictly decreasing qualities tried by the budget search.
//! - [`CompressionParams`]: max dimension + ladder + byte budget for one pipeline.

use std::fmt;

/// Lossy encoding quality in the `(0, 1]` range, as the browser canvas API takes it.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Quality(f32);

impl Quality {
    /// Lowest quality the encoders accept (1%).
    pub const MIN: f32 = 0.01;

    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self(Self::MIN);
        }
        Self(value.clamp(Self::MIN, 1.0))
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// Quality on the 1-100 scale used by JPEG encoders.
    pub fn as_percent(self) -> u8 {
        ((self.0 * 100.0).round() as u8).clamp(1, 100)
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(0.82)
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Ordered list of qualities, highest first.
#[derive(Debug, Clone, PartialEq)]
pub struct QualityLadder(Vec<Quality>);

impl QualityLadder {
    pub fn new(steps: &[f32]) -> Self {
        Self(steps.iter().copied().map(Quality::new).collect())
    }

    pub fn steps(&self) -> &[Quality] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The last (lowest) step, used as the best-effort floor.
    pub fn lowest(&self) -> Option<Quality> {
        self.0.last().copied()
    }
}

impl Default for QualityLadder {
    fn default() -> Self {
        Self::new(&[0.82, 0.65, 0.50, 0.40, 0.35])
    }
}

/// Everything the compression pipeline needs to know about one target.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionParams {
    /// Longest allowed output edge in pixels.
    pub max_dimension: u32,
    pub ladder: QualityLadder,
    /// Estimated byte size an encoding must not exceed.
    pub budget_bytes: usize,
}

impl Default for CompressionParams {
    fn default() -> Self {
        Self {
            max_dimension: 1200,
            ladder: QualityLadder::default(),
            budget_bytes: 700_000,
        }
    }
}
