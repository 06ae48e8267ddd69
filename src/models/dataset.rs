// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Dataset document and video catalog.
//!
//! This module manages the whole persisted unit: the label vocabulary, the
//! catalog of videos and each video's annotation list.

use super::annotation::AnnotationList;
use super::ModelError;
use chrono::Local;
use serde::{Deserialize, Serialize};

/// Format of the document `date` stamp.
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// One video in the dataset together with its event annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoEntry {
    /// Path to the media file, relative to the document's directory unless
    /// absolute.
    pub path: String,
    #[serde(default)]
    pub annotations: AnnotationList,
}

impl VideoEntry {
    /// Create an entry with an empty annotation list.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            annotations: AnnotationList::new(),
        }
    }
}

/// Complete dataset document for serialization.
///
/// Videos are kept sorted by path after an add; labels keep their insertion
/// order and reject duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub videos: Vec<VideoEntry>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub date: String,
}

impl Dataset {
    /// Create an empty document stamped with the current time.
    pub fn new() -> Self {
        Self {
            videos: Vec::new(),
            labels: Vec::new(),
            date: Local::now().format(DATE_FORMAT).to_string(),
        }
    }

    /// Re-stamp `date` with the current local time. Called on every save.
    pub fn touch_date(&mut self) {
        self.date = Local::now().format(DATE_FORMAT).to_string();
    }

    /// Append a video with an empty annotation list, then re-sort the
    /// catalog lexicographically by path.
    ///
    /// Duplicate paths are not rejected; the sort is stable so duplicates
    /// stay adjacent.
    pub fn add_video(&mut self, path: impl Into<String>) {
        self.videos.push(VideoEntry::new(path));
        self.videos.sort_by(|a, b| a.path.cmp(&b.path));
    }

    /// Remove and return the video at `index`.
    pub fn remove_video(&mut self, index: usize) -> Result<VideoEntry, ModelError> {
        if index >= self.videos.len() {
            return Err(ModelError::IndexOutOfRange {
                index,
                len: self.videos.len(),
            });
        }
        Ok(self.videos.remove(index))
    }

    /// Look up the video at `index` for reading.
    pub fn video(&self, index: usize) -> Result<&VideoEntry, ModelError> {
        self.videos.get(index).ok_or(ModelError::IndexOutOfRange {
            index,
            len: self.videos.len(),
        })
    }

    /// Look up the video at `index` for editing.
    pub fn video_mut(&mut self, index: usize) -> Result<&mut VideoEntry, ModelError> {
        let len = self.videos.len();
        self.videos
            .get_mut(index)
            .ok_or(ModelError::IndexOutOfRange { index, len })
    }

    /// Append a label to the vocabulary, preserving insertion order.
    ///
    /// A label already present leaves the vocabulary untouched and signals
    /// `DuplicateLabel` so the caller can notify the user.
    pub fn add_label(&mut self, text: impl Into<String>) -> Result<(), ModelError> {
        let text = text.into();
        if self.labels.iter().any(|label| *label == text) {
            return Err(ModelError::DuplicateLabel(text));
        }
        self.labels.push(text);
        Ok(())
    }

    /// Remove a label from the vocabulary.
    pub fn remove_label(&mut self, text: &str) -> Result<(), ModelError> {
        match self.labels.iter().position(|label| label == text) {
            Some(index) => {
                self.labels.remove(index);
                Ok(())
            }
            None => Err(ModelError::LabelNotFound(text.to_string())),
        }
    }
}

impl Default for Dataset {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::Annotation;

    #[test]
    fn test_new_document_is_empty_and_dated() {
        let dataset = Dataset::new();
        assert!(dataset.videos.is_empty());
        assert!(dataset.labels.is_empty());
        // "YYYY-MM-DD HH:MM"
        assert_eq!(dataset.date.len(), 16);
    }

    #[test]
    fn test_add_video_sorts_catalog_by_path() {
        let mut dataset = Dataset::new();
        dataset.add_video("b.mp4");
        dataset.add_video("a.mp4");
        dataset.add_video("c.mp4");
        let paths: Vec<&str> = dataset.videos.iter().map(|v| v.path.as_str()).collect();
        assert_eq!(paths, vec!["a.mp4", "b.mp4", "c.mp4"]);
    }

    #[test]
    fn test_add_video_allows_duplicate_paths() {
        let mut dataset = Dataset::new();
        dataset.add_video("a.mp4");
        dataset.add_video("a.mp4");
        assert_eq!(dataset.videos.len(), 2);
    }

    #[test]
    fn test_remove_video_out_of_range() {
        let mut dataset = Dataset::new();
        dataset.add_video("a.mp4");
        assert_eq!(
            dataset.remove_video(3),
            Err(ModelError::IndexOutOfRange { index: 3, len: 1 })
        );
        assert_eq!(dataset.videos.len(), 1);
    }

    #[test]
    fn test_video_lookup() {
        let mut dataset = Dataset::new();
        dataset.add_video("a.mp4");
        assert_eq!(dataset.video(0).unwrap().path, "a.mp4");
        assert!(dataset.video(1).is_err());

        dataset
            .video_mut(0)
            .unwrap()
            .annotations
            .insert_sorted(Annotation::new(1000, "goal"));
        assert_eq!(dataset.video(0).unwrap().annotations.len(), 1);
    }

    #[test]
    fn test_add_label_rejects_duplicates() {
        let mut dataset = Dataset::new();
        dataset.add_label("goal").unwrap();
        assert_eq!(
            dataset.add_label("goal"),
            Err(ModelError::DuplicateLabel("goal".to_string()))
        );
        assert_eq!(dataset.labels, vec!["goal"]);
    }

    #[test]
    fn test_labels_keep_insertion_order() {
        let mut dataset = Dataset::new();
        dataset.add_label("substitution").unwrap();
        dataset.add_label("goal").unwrap();
        dataset.add_label("corner").unwrap();
        assert_eq!(dataset.labels, vec!["substitution", "goal", "corner"]);
    }

    #[test]
    fn test_remove_label() {
        let mut dataset = Dataset::new();
        dataset.add_label("goal").unwrap();
        dataset.remove_label("goal").unwrap();
        assert!(dataset.labels.is_empty());
        assert_eq!(
            dataset.remove_label("goal"),
            Err(ModelError::LabelNotFound("goal".to_string()))
        );
    }
}
