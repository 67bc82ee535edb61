//! CLI output formatting.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability; the CLI prints the lines. Format functions are pure, no I/O.
//!
//! # Output Format
//!
//! ## Upload
//!
//! ```text
//! Uploading 3 files → gallery
//! 001 front door.jpg
//!     Path: gallery/1700000000000_front_door.jpg
//!     1200x900 @ q82, 412.3 kB  [33%]
//! 002 pool.png
//!     Path: gallery/1700000000001_pool.png
//!     1200x800 @ q35, 731.0 kB over budget  [67%]
//! ```
//!
//! ## Check config
//!
//! ```text
//! Preset: canonical
//!     Max dimension: 1200px
//!     Quality steps: 0.82, 0.65, 0.50, 0.40, 0.35
//!     Budget: 700.0 kB
//!     Decode timeout: 10000ms
//! ```

use crate::config::AppConfig;
use crate::upload::UploadEvent;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Human-readable decimal byte size (`512 B`, `412.3 kB`, `1.2 MB`).
pub fn format_bytes(bytes: usize) -> String {
    if bytes < 1_000 {
        format!("{} B", bytes)
    } else if bytes < 1_000_000 {
        format!("{:.1} kB", bytes as f64 / 1_000.0)
    } else {
        format!("{:.1} MB", bytes as f64 / 1_000_000.0)
    }
}

/// Format a single upload progress event as display lines.
pub fn format_upload_event(event: &UploadEvent) -> Vec<String> {
    match event {
        UploadEvent::BatchStarted { folder, total } => {
            let noun = if *total == 1 { "file" } else { "files" };
            vec![format!("Uploading {} {} \u{2192} {}", total, noun, folder)]
        }
        UploadEvent::FileUploaded {
            index,
            name,
            logical_path,
            width,
            height,
            quality_percent,
            estimated_bytes,
            within_budget,
            progress,
            ..
        } => {
            let budget_note = if *within_budget { "" } else { " over budget" };
            vec![
                format!("{} {}", format_index(*index), name),
                format!("    Path: {}", logical_path),
                format!(
                    "    {}x{} @ q{}, {}{}  [{}%]",
                    width,
                    height,
                    quality_percent,
                    format_bytes(*estimated_bytes),
                    budget_note,
                    progress
                ),
            ]
        }
        UploadEvent::FileFailed {
            index,
            total,
            name,
            error,
        } => vec![
            format!("{} {}", format_index(*index), name),
            format!("    Failed: {}", error),
            format!("    Batch aborted at {} of {}", index, total),
        ],
    }
}

/// Format the effective configuration for `check-config`.
pub fn format_config(config: &AppConfig) -> Vec<String> {
    let steps = config
        .compression
        .quality_steps
        .iter()
        .map(|q| format!("{:.2}", q))
        .collect::<Vec<_>>()
        .join(", ");
    let timeout = match config.compression.decode_timeout_ms {
        0 => "off".to_string(),
        ms => format!("{}ms", ms),
    };
    vec![
        format!("Preset: {}", config.preset.as_str()),
        format!("    Max dimension: {}px", config.compression.max_dimension),
        format!("    Quality steps: {}", steps),
        format!("    Budget: {}", format_bytes(config.compression.budget_bytes)),
        format!("    Decode timeout: {}", timeout),
        format!("    Log level: {}", config.logging.level),
    ]
}
