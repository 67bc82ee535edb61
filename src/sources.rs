//! Expanding CLI arguments into the list of files to upload.
//!
//! Directories are walked recursively in file-name order. Only files with a
//! [supported image extension](crate::imaging::supported_input_extensions)
//! are kept; the rest are reported as skipped, since a batch aborts on the
//! first file that fails to decode.

use crate::imaging::is_supported_image;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Files selected for upload, plus those filtered out.
#[derive(Debug, Default, PartialEq)]
pub struct Collected {
    pub images: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

/// Expand files and directories into image paths, preserving argument order.
pub fn collect_image_paths(paths: &[PathBuf]) -> Result<Collected, walkdir::Error> {
    let mut collected = Collected::default();

    for path in paths {
        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let file = entry.into_path();
            if has_supported_name(&file) {
                collected.images.push(file);
            } else {
                collected.skipped.push(file);
            }
        }
    }

    Ok(collected)
}

fn has_supported_name(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(is_supported_image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn walks_directories_in_name_order() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("b.jpg"));
        touch(&tmp.path().join("a.png"));
        touch(&tmp.path().join("sub/c.webp"));

        let collected = collect_image_paths(&[tmp.path().to_path_buf()]).unwrap();
        let names: Vec<_> = collected
            .images
            .iter()
            .map(|p| p.strip_prefix(tmp.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("a.png"),
                PathBuf::from("b.jpg"),
                PathBuf::from("sub/c.webp"),
            ]
        );
    }

    #[test]
    fn skips_unsupported_files() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("brochure.pdf"));
        touch(&tmp.path().join("photo.JPG"));

        let collected = collect_image_paths(&[tmp.path().to_path_buf()]).unwrap();
        assert_eq!(collected.images, vec![tmp.path().join("photo.JPG")]);
        assert_eq!(collected.skipped, vec![tmp.path().join("brochure.pdf")]);
    }

    #[test]
    fn explicit_files_keep_argument_order() {
        let tmp = TempDir::new().unwrap();
        let z = tmp.path().join("z.jpg");
        let a = tmp.path().join("a.jpg");
        touch(&z);
        touch(&a);

        let collected = collect_image_paths(&[z.clone(), a.clone()]).unwrap();
        assert_eq!(collected.images, vec![z, a]);
    }

    #[test]
    fn missing_path_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = collect_image_paths(&[tmp.path().join("missing")]);
        assert!(result.is_err());
    }
}
