//! Hand-off of upload results to the site's documents.
//!
//! Images are not stored anywhere on their own: a project keeps its photos
//! and floor plans as arrays of data URIs, and a gallery item holds a single
//! one. This module applies upload results to those shapes and reads/writes
//! them as JSON so the CLI can update exported documents.

use crate::naming::{display_title, parse_logical_path};
use crate::types::{EncodedResult, Folder};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A real-estate project as stored in the `projects` collection.
///
/// Fields this crate doesn't touch are kept verbatim in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub floor_plans: Vec<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One entry of the `gallery` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryItem {
    pub id: String,
    pub url: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Append result urls to the project field matching `folder`.
///
/// `projects` → `images`, `floor-plans` → `floor_plans`. Gallery uploads
/// don't belong to a project and attach nothing. Returns how many urls were
/// added.
pub fn attach_to_project(project: &mut Project, folder: Folder, results: &[EncodedResult]) -> usize {
    let field = match folder {
        Folder::Projects => &mut project.images,
        Folder::FloorPlans => &mut project.floor_plans,
        Folder::Gallery => return 0,
    };
    field.extend(results.iter().map(|r| r.encoded_data.clone()));
    results.len()
}

/// Remove an image url from a project, wherever it appears.
///
/// This is what deleting an upload actually means. Returns whether anything
/// was removed.
pub fn remove_image(project: &mut Project, url: &str) -> bool {
    let before = project.images.len() + project.floor_plans.len();
    project.images.retain(|u| u != url);
    project.floor_plans.retain(|u| u != url);
    before != project.images.len() + project.floor_plans.len()
}

/// One gallery item per result, in order.
///
/// The id is `<timestamp>_<position>_<name>`. Two files with the same name
/// can share a millisecond within a batch, so the 0-based position keeps
/// ids unique. The title comes from the sanitized file name.
pub fn gallery_items(results: &[EncodedResult], category: Option<&str>) -> Vec<GalleryItem> {
    results
        .iter()
        .enumerate()
        .map(|(position, r)| {
            let (id, title) = match parse_logical_path(&r.logical_path) {
                Some(parsed) => (
                    format!("{}_{}_{}", parsed.timestamp_millis, position, parsed.name),
                    display_title(&parsed.name),
                ),
                None => (
                    format!("{}_{}", position, r.logical_path),
                    r.logical_path.clone(),
                ),
            };
            GalleryItem {
                id,
                url: r.encoded_data.clone(),
                title,
                category: category.map(str::to_string),
            }
        })
        .collect()
}

pub fn load_project(path: &Path) -> Result<Project, DocumentError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<(), DocumentError> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn result(url: &str, path: &str) -> EncodedResult {
        EncodedResult {
            encoded_data: url.to_string(),
            logical_path: path.to_string(),
        }
    }

    #[test]
    fn attach_projects_appends_to_images() {
        let mut project = Project {
            images: vec!["data:old".into()],
            ..Project::default()
        };
        let added = attach_to_project(
            &mut project,
            Folder::Projects,
            &[result("data:a", "projects/1_a.jpg"), result("data:b", "projects/1_b.jpg")],
        );
        assert_eq!(added, 2);
        assert_eq!(project.images, vec!["data:old", "data:a", "data:b"]);
        assert!(project.floor_plans.is_empty());
    }

    #[test]
    fn attach_floor_plans_uses_floor_plan_field() {
        let mut project = Project::default();
        attach_to_project(
            &mut project,
            Folder::FloorPlans,
            &[result("data:plan", "floor-plans/1_plan.jpg")],
        );
        assert_eq!(project.floor_plans, vec!["data:plan"]);
        assert!(project.images.is_empty());
    }

    #[test]
    fn attach_gallery_is_ignored() {
        let mut project = Project::default();
        let added = attach_to_project(&mut project, Folder::Gallery, &[result("data:a", "gallery/1_a.jpg")]);
        assert_eq!(added, 0);
        assert_eq!(project, Project::default());
    }

    #[test]
    fn remove_image_from_either_field() {
        let mut project = Project {
            images: vec!["data:a".into(), "data:b".into()],
            floor_plans: vec!["data:b".into()],
            ..Project::default()
        };
        assert!(remove_image(&mut project, "data:b"));
        assert_eq!(project.images, vec!["data:a"]);
        assert!(project.floor_plans.is_empty());
        assert!(!remove_image(&mut project, "data:zzz"));
    }

    #[test]
    fn gallery_items_derive_id_and_title() {
        let items = gallery_items(
            &[result("data:x", "gallery/1700000000000_Sea_View__2_.jpg")],
            Some("exterior"),
        );
        assert_eq!(
            items,
            vec![GalleryItem {
                id: "1700000000000_0_Sea_View__2_.jpg".into(),
                url: "data:x".into(),
                title: "Sea View 2".into(),
                category: Some("exterior".into()),
            }]
        );
    }

    #[test]
    fn gallery_items_fall_back_to_raw_path() {
        let items = gallery_items(&[result("data:x", "elsewhere")], None);
        assert_eq!(items[0].id, "0_elsewhere");
        assert_eq!(items[0].category, None);
    }

    #[test]
    fn gallery_items_same_name_same_millisecond_get_distinct_ids() {
        let items = gallery_items(
            &[
                result("data:a", "gallery/1700000000000_cover.jpg"),
                result("data:b", "gallery/1700000000000_cover.jpg"),
            ],
            None,
        );
        assert_eq!(items[0].id, "1700000000000_0_cover.jpg");
        assert_eq!(items[1].id, "1700000000000_1_cover.jpg");
        assert_eq!(items[0].title, items[1].title);
    }

    #[test]
    fn project_round_trips_unknown_fields() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("project.json");
        std::fs::write(
            &path,
            r#"{"id":"p1","title":"Villa","images":[],"floorPlans":[],"location":"Coast","featured":true}"#,
        )
        .unwrap();

        let mut project = load_project(&path).unwrap();
        assert_eq!(project.title, "Villa");
        attach_to_project(&mut project, Folder::Projects, &[result("data:a", "projects/1_a.jpg")]);
        save_json(&path, &project).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["location"], "Coast");
        assert_eq!(value["featured"], true);
        assert_eq!(value["images"][0], "data:a");
        assert!(value.get("floorPlans").is_some());
    }

    #[test]
    fn load_project_invalid_json_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("project.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(load_project(&path), Err(DocumentError::Json(_))));
    }
}
