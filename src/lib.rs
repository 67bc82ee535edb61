//! # Estate Media
//!
//! The image pipeline behind a real-estate site's admin uploads. Listing
//! photos, gallery shots and floor plans are not stored as files: each one is
//! compressed into a JPEG data URI and kept directly in a document field.
//! Documents have a size ceiling, so every image has to fit a byte budget.
//!
//! # Architecture: Resize Once, Re-encode Until It Fits
//!
//! ```text
//! blob ──decode──▶ raster ──resolve──▶ (w, h) ──draw──▶ surface
//!                                                         │
//!            ┌──────────── quality ladder ◀───────────────┘
//!            ▼
//!   encode @ 0.82 → fits? ── yes ──▶ data:image/jpeg;base64,...
//!            │ no
//!   encode @ 0.65 → ...      (lowest step is returned even if over budget)
//! ```
//!
//! - The longer side is scaled down to the configured maximum (1200 px by
//!   default), aspect ratio preserved. Smaller images keep their size.
//! - The resized surface is drawn once and re-encoded at each quality step.
//! - Size is estimated from the base64 payload length, which is what the
//!   document store actually holds.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Dimension resolver, `ImageCodec` trait, JPEG re-encoder, budget search |
//! | [`upload`] | Per-file and batch orchestration, progress, decode timeout |
//! | [`naming`] | File-name sanitizing and logical paths (`gallery/<millis>_<name>`) |
//! | [`types`] | `Folder`, `SourceFile`, `EncodedResult` |
//! | [`documents`] | Applying results to `Project` and `GalleryItem` documents |
//! | [`config`] | `config.toml` loading, presets, validation |
//! | [`sources`] | Expanding CLI paths into supported image files |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## One Pipeline, Two Presets
//!
//! Project photos, gallery items and floor plans all run through the same
//! code. The differences (maximum dimension, ladder, budget) are data:
//! `canonical` and `compact` presets in [`config`], overridable per key.
//!
//! ## Sequential Batches
//!
//! A batch never decodes more than one image at a time. Peak memory is one
//! raster plus one surface, and progress is a plain counter written by a
//! single loop. See [`upload`].
//!
//! ## Injected Codec
//!
//! Decoding, drawing and encoding sit behind [`imaging::ImageCodec`]. The
//! production [`imaging::RustCodec`] uses the `image` crate; tests drive the
//! whole pipeline with a recording mock and no image files.

pub mod config;
pub mod documents;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod sources;
pub mod types;
pub mod upload;
