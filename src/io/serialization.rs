// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Dataset document serialization and deserialization.
//!
//! This module handles loading and saving the OSL JSON document: a whole
//! file is read or written in one piece, there is no streaming.

use crate::models::dataset::Dataset;
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading or saving a dataset document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// The file was readable but does not have the expected OSL shape:
    /// the top level is not a mapping, or `videos`/`labels` are present
    /// with the wrong structure.
    #[error("malformed document: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Load a dataset document from `path`.
///
/// The load is permissive: missing `videos`, `labels` or `date` default to
/// empty. On error the caller's current in-memory document is untouched.
pub fn load_dataset(path: &Path) -> Result<Dataset, DocumentError> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

/// Save a dataset document to `path`.
///
/// Re-stamps `date` with the current time and writes the full structure,
/// all videos with their annotations plus all labels, as pretty JSON.
pub fn save_dataset(dataset: &mut Dataset, path: &Path) -> Result<(), DocumentError> {
    dataset.touch_date();
    let json = serde_json::to_string_pretty(dataset)?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::Annotation;

    fn sample_dataset() -> Dataset {
        let mut dataset = Dataset::new();
        dataset.add_label("goal").unwrap();
        dataset.add_label("corner").unwrap();
        dataset.add_video("match/second_half.mp4");
        dataset.add_video("match/first_half.mp4");
        let video = dataset.video_mut(0).unwrap();
        video.annotations.insert_sorted(Annotation::new(12_500, "goal"));
        let mut with_meta = Annotation::new(3_000, "corner");
        let mut metadata = serde_json::Map::new();
        metadata.insert("team".to_string(), serde_json::json!("home"));
        metadata.insert("confidence".to_string(), serde_json::json!(0.87));
        with_meta.metadata = Some(metadata);
        video.annotations.insert_sorted(with_meta);
        dataset
    }

    #[test]
    fn test_round_trip_preserves_everything_but_date() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.json");

        let mut dataset = sample_dataset();
        let before = dataset.clone();
        save_dataset(&mut dataset, &path).unwrap();
        let loaded = load_dataset(&path).unwrap();

        assert_eq!(loaded.videos, before.videos);
        assert_eq!(loaded.labels, before.labels);
        assert_eq!(loaded.date, dataset.date);
    }

    #[test]
    fn test_metadata_round_trips_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.json");

        let mut dataset = sample_dataset();
        save_dataset(&mut dataset, &path).unwrap();
        let loaded = load_dataset(&path).unwrap();

        let annotations = &loaded.video(0).unwrap().annotations;
        let corner = annotations.get(0).unwrap();
        let metadata = corner.metadata.as_ref().unwrap();
        assert_eq!(metadata["team"], serde_json::json!("home"));
        assert_eq!(metadata["confidence"], serde_json::json!(0.87));
        // The annotation without metadata did not grow an empty mapping.
        assert!(annotations.get(1).unwrap().metadata.is_none());
    }

    #[test]
    fn test_load_defaults_missing_sections_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sparse.json");
        std::fs::write(&path, "{}").unwrap();

        let dataset = load_dataset(&path).unwrap();
        assert!(dataset.videos.is_empty());
        assert!(dataset.labels.is_empty());
        assert!(dataset.date.is_empty());
    }

    #[test]
    fn test_load_rejects_non_mapping_top_level() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();
        assert!(matches!(
            load_dataset(&path),
            Err(DocumentError::Malformed(_))
        ));
    }

    #[test]
    fn test_load_rejects_wrong_section_shapes() {
        let dir = tempfile::tempdir().unwrap();

        let videos_not_a_list = dir.path().join("a.json");
        std::fs::write(&videos_not_a_list, r#"{"videos": 5}"#).unwrap();
        assert!(matches!(
            load_dataset(&videos_not_a_list),
            Err(DocumentError::Malformed(_))
        ));

        let labels_not_strings = dir.path().join("b.json");
        std::fs::write(&labels_not_strings, r#"{"labels": [1, 2]}"#).unwrap();
        assert!(matches!(
            load_dataset(&labels_not_strings),
            Err(DocumentError::Malformed(_))
        ));

        let negative_position = dir.path().join("c.json");
        std::fs::write(
            &negative_position,
            r#"{"videos": [{"path": "a.mp4", "annotations": [{"position": -5, "label": "x"}]}]}"#,
        )
        .unwrap();
        assert!(matches!(
            load_dataset(&negative_position),
            Err(DocumentError::Malformed(_))
        ));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_dataset(&dir.path().join("absent.json")),
            Err(DocumentError::Io(_))
        ));
    }

    #[test]
    fn test_load_keeps_annotation_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unsorted.json");
        std::fs::write(
            &path,
            r#"{"videos": [{"path": "a.mp4", "annotations": [
                {"position": 2000, "label": "late"},
                {"position": 1000, "label": "early"}
            ]}]}"#,
        )
        .unwrap();

        let dataset = load_dataset(&path).unwrap();
        let annotations = &dataset.video(0).unwrap().annotations;
        assert_eq!(annotations.get(0).unwrap().label, "late");
        assert_eq!(annotations.get(1).unwrap().label, "early");
    }
}
