//! Shared types passed between the uploader, the document hand-off and the CLI.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Logical folder an upload belongs to. Only used to build logical paths
/// and to pick which document field receives the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Folder {
    Projects,
    Gallery,
    FloorPlans,
}

impl Folder {
    pub fn as_str(self) -> &'static str {
        match self {
            Folder::Projects => "projects",
            Folder::Gallery => "gallery",
            Folder::FloorPlans => "floor-plans",
        }
    }
}

impl fmt::Display for Folder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Folder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "projects" => Ok(Folder::Projects),
            "gallery" => Ok(Folder::Gallery),
            "floor-plans" => Ok(Folder::FloorPlans),
            other => Err(format!("unknown folder: {other}")),
        }
    }
}

/// An image blob picked by the admin, with its original file name.
///
/// Consumed by the uploader; the bytes are dropped as soon as that file has
/// been compressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub data: Vec<u8>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    /// Read a file from disk, keeping only its file name.
    pub fn read(path: &Path) -> std::io::Result<Self> {
        let data = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self { name, data })
    }
}

/// What one upload produces: the data URI to store in a document, and a
/// logical path for display. The path does not address any storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedResult {
    /// `data:image/jpeg;base64,...`
    #[serde(rename = "url")]
    pub encoded_data: String,
    /// `<folder>/<unix millis>_<sanitized name>`
    #[serde(rename = "path")]
    pub logical_path: String,
}
