//! Logical path convention for uploads.
//!
//! Every upload gets a synthetic path `<folder>/<unix millis>_<name>` where
//! `<name>` is the original file name with every character outside
//! `[A-Za-z0-9.-]` replaced by `_`:
//!
//! - `"My Photo (1).png"` in `gallery` → `gallery/1700000000000_My_Photo__1_.png`
//! - `"plan-B.jpg"` in `floor-plans` → `floor-plans/1700000000000_plan-B.jpg`
//!
//! The path is never resolved against storage; the image itself lives inside
//! the owning document.

use crate::types::Folder;

/// Replace every character outside `[A-Za-z0-9.-]` with `_`.
///
/// Works per `char`, so a multi-byte character becomes a single `_`.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Build `<folder>/<timestamp>_<sanitized name>`.
pub fn logical_path(folder: Folder, timestamp_millis: u64, original_name: &str) -> String {
    format!(
        "{}/{}_{}",
        folder,
        timestamp_millis,
        sanitize_filename(original_name)
    )
}

/// Result of parsing a logical path back into its parts.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPath {
    pub folder: Folder,
    pub timestamp_millis: u64,
    /// Sanitized file name.
    pub name: String,
}

/// Parse a path produced by [`logical_path`].
///
/// Returns `None` for anything that doesn't follow the convention.
pub fn parse_logical_path(path: &str) -> Option<ParsedPath> {
    let (folder, rest) = path.split_once('/')?;
    let (timestamp, name) = rest.split_once('_')?;
    Some(ParsedPath {
        folder: folder.parse().ok()?,
        timestamp_millis: timestamp.parse().ok()?,
        name: name.to_string(),
    })
}

/// Human-readable title from a sanitized name: extension dropped,
/// separators turned into spaces.
///
/// `"My_Photo__1_.png"` → `"My Photo 1"`
pub fn display_title(sanitized_name: &str) -> String {
    let stem = sanitized_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .filter(|stem| !stem.is_empty())
        .unwrap_or(sanitized_name);
    stem.split(['_', '-'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
