// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation data structures.
//!
//! This module defines the timestamped event record and the ordered
//! collection that keeps a video's events sorted by position while
//! supporting insertion, removal, re-timing and playhead-relative queries.

use super::ModelError;
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single action-spotting event: a labeled timestamp on a video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Event time in milliseconds from the start of the video.
    pub position: u64,
    pub label: String,
    /// Caller-defined payload with no fixed schema. Preserved verbatim
    /// across load/save; an absent key stays absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl Annotation {
    /// Create a new annotation with no metadata.
    pub fn new(position: u64, label: impl Into<String>) -> Self {
        Self {
            position,
            label: label.into(),
            metadata: None,
        }
    }
}

/// An annotation plus the list-assigned id that tracks it across re-sorts.
#[derive(Debug, Clone)]
struct Slot {
    id: u64,
    annotation: Annotation,
}

/// A sequence of annotations kept sorted ascending by position.
///
/// Entries are identity-tracked by an internal id so that `retime` can
/// report where an entry landed even when several entries share a position.
/// Ids never leave this module and do not take part in serialization or
/// equality.
#[derive(Debug, Clone, Default)]
pub struct AnnotationList {
    slots: Vec<Slot>,
    next_id: u64,
}

impl AnnotationList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from annotations in the given order.
    ///
    /// The order is kept as-is: documents are loaded permissively and the
    /// sort invariant is re-established by the first mutating operation.
    pub fn from_annotations(annotations: Vec<Annotation>) -> Self {
        let mut list = Self::new();
        for annotation in annotations {
            let id = list.alloc_id();
            list.slots.push(Slot { id, annotation });
        }
        list
    }

    fn alloc_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Annotation> {
        self.slots.get(index).map(|slot| &slot.annotation)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.slots.iter().map(|slot| &slot.annotation)
    }

    /// Insert the annotation so the sequence stays sorted ascending by
    /// position and return the insertion index.
    ///
    /// Ties go after the existing equal-position entries: the scan walks
    /// past every entry whose position is not strictly greater than the new
    /// one's.
    pub fn insert_sorted(&mut self, annotation: Annotation) -> usize {
        let mut index = 0;
        while index < self.slots.len() && self.slots[index].annotation.position <= annotation.position
        {
            index += 1;
        }
        let id = self.alloc_id();
        self.slots.insert(index, Slot { id, annotation });
        index
    }

    /// Remove and return the entry at `index`.
    ///
    /// The collection is unchanged when the index is out of range.
    pub fn remove_at(&mut self, index: usize) -> Result<Annotation, ModelError> {
        if index >= self.slots.len() {
            return Err(ModelError::IndexOutOfRange {
                index,
                len: self.slots.len(),
            });
        }
        Ok(self.slots.remove(index).annotation)
    }

    /// Move the entry at `index` to `new_position` and return its new index.
    ///
    /// The whole collection is stable-sorted afterwards, so entries sharing
    /// a position keep their relative order; the returned index follows the
    /// retimed entry itself, not whatever value now sits at the old index.
    pub fn retime(&mut self, index: usize, new_position: u64) -> Result<usize, ModelError> {
        let len = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(ModelError::IndexOutOfRange { index, len })?;
        let id = slot.id;
        slot.annotation.position = new_position;
        self.slots.sort_by_key(|slot| slot.annotation.position);
        let new_index = self
            .slots
            .iter()
            .position(|slot| slot.id == id)
            .expect("retimed entry is still in the list");
        Ok(new_index)
    }

    /// Replace the label of the entry at `index`. Label edits never move an
    /// entry.
    pub fn set_label(&mut self, index: usize, label: impl Into<String>) -> Result<(), ModelError> {
        let len = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(ModelError::IndexOutOfRange { index, len })?;
        slot.annotation.label = label.into();
        Ok(())
    }

    /// Index of the last entry strictly before `current_ms`.
    ///
    /// Ascending scan that remembers the last hit and stops at the first
    /// entry at or past the playhead (a predecessor search, relying on the
    /// sort order).
    pub fn find_previous(&self, current_ms: u64) -> Option<usize> {
        let mut previous = None;
        for (index, slot) in self.slots.iter().enumerate() {
            if slot.annotation.position < current_ms {
                previous = Some(index);
            } else {
                break;
            }
        }
        previous
    }

    /// Index of the first entry strictly after `current_ms` (a successor
    /// search).
    pub fn find_next(&self, current_ms: u64) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.annotation.position > current_ms)
    }

    /// Index of the first entry within `tolerance_ms` of `current_ms`.
    ///
    /// First match from the start wins, even if a later entry is closer.
    pub fn find_nearest(&self, current_ms: u64, tolerance_ms: u64) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.annotation.position.abs_diff(current_ms) < tolerance_ms)
    }
}

/// Equality compares the annotation values in order; internal ids are not
/// part of a list's identity.
impl PartialEq for AnnotationList {
    fn eq(&self, other: &Self) -> bool {
        self.slots.len() == other.slots.len()
            && self
                .slots
                .iter()
                .zip(&other.slots)
                .all(|(a, b)| a.annotation == b.annotation)
    }
}

/// Serializes as a plain JSON array of annotations.
impl Serialize for AnnotationList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.slots.iter().map(|slot| &slot.annotation))
    }
}

impl<'de> Deserialize<'de> for AnnotationList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let annotations = Vec::<Annotation>::deserialize(deserializer)?;
        Ok(Self::from_annotations(annotations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(list: &AnnotationList) -> Vec<u64> {
        list.iter().map(|a| a.position).collect()
    }

    #[test]
    fn test_insert_sorted_keeps_order() {
        let mut list = AnnotationList::new();
        for position in [3000, 1000, 2000, 500, 2500] {
            list.insert_sorted(Annotation::new(position, "event"));
            let sorted = positions(&list);
            let mut expected = sorted.clone();
            expected.sort();
            assert_eq!(sorted, expected);
        }
        assert_eq!(positions(&list), vec![500, 1000, 2000, 2500, 3000]);
    }

    #[test]
    fn test_insert_sorted_returns_index() {
        let mut list = AnnotationList::new();
        list.insert_sorted(Annotation::new(1000, "A"));
        let index = list.insert_sorted(Annotation::new(500, "B"));
        assert_eq!(index, 0);
        assert_eq!(list.get(0).map(|a| a.label.as_str()), Some("B"));
        assert_eq!(list.get(1).map(|a| a.label.as_str()), Some("A"));
    }

    #[test]
    fn test_insert_sorted_ties_go_after_existing() {
        let mut list = AnnotationList::new();
        list.insert_sorted(Annotation::new(500, "first"));
        list.insert_sorted(Annotation::new(500, "second"));
        let index = list.insert_sorted(Annotation::new(500, "third"));
        assert_eq!(index, 2);
        let labels: Vec<&str> = list.iter().map(|a| a.label.as_str()).collect();
        assert_eq!(labels, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_remove_at() {
        let mut list = AnnotationList::new();
        list.insert_sorted(Annotation::new(100, "A"));
        list.insert_sorted(Annotation::new(200, "B"));
        let removed = list.remove_at(0).unwrap();
        assert_eq!(removed.label, "A");
        assert_eq!(positions(&list), vec![200]);
    }

    #[test]
    fn test_remove_at_out_of_range_leaves_list_unchanged() {
        let mut list = AnnotationList::new();
        list.insert_sorted(Annotation::new(100, "A"));
        let err = list.remove_at(1).unwrap_err();
        assert_eq!(err, ModelError::IndexOutOfRange { index: 1, len: 1 });
        assert_eq!(positions(&list), vec![100]);
    }

    #[test]
    fn test_retime_moves_entry_and_reports_new_index() {
        let mut list = AnnotationList::new();
        list.insert_sorted(Annotation::new(100, "A"));
        list.insert_sorted(Annotation::new(200, "B"));
        list.insert_sorted(Annotation::new(300, "C"));

        let new_index = list.retime(0, 250).unwrap();
        assert_eq!(new_index, 1);
        let entry = list.get(new_index).unwrap();
        assert_eq!(entry.position, 250);
        assert_eq!(entry.label, "A");
        assert_eq!(positions(&list), vec![200, 250, 300]);
    }

    #[test]
    fn test_retime_tracks_identity_among_equal_positions() {
        let mut list = AnnotationList::new();
        list.insert_sorted(Annotation::new(100, "A"));
        list.insert_sorted(Annotation::new(100, "B"));

        // Retiming B onto A's position keeps B behind A (stable sort).
        let new_index = list.retime(1, 100).unwrap();
        assert_eq!(new_index, 1);
        assert_eq!(list.get(1).map(|a| a.label.as_str()), Some("B"));

        // Moving A past B follows A to its new slot.
        let new_index = list.retime(0, 150).unwrap();
        assert_eq!(new_index, 1);
        assert_eq!(list.get(new_index).map(|a| a.label.as_str()), Some("A"));
    }

    #[test]
    fn test_retime_out_of_range() {
        let mut list = AnnotationList::new();
        assert_eq!(
            list.retime(0, 100),
            Err(ModelError::IndexOutOfRange { index: 0, len: 0 })
        );
    }

    #[test]
    fn test_find_previous_and_next_partition() {
        let mut list = AnnotationList::new();
        for position in [100, 200, 300] {
            list.insert_sorted(Annotation::new(position, "event"));
        }
        assert_eq!(list.find_previous(250), Some(1));
        assert_eq!(list.find_next(250), Some(2));
        assert_eq!(list.find_previous(50), None);
        assert_eq!(list.find_next(350), None);
        // Boundaries are strict on both sides.
        assert_eq!(list.find_previous(200), Some(0));
        assert_eq!(list.find_next(200), Some(2));
    }

    #[test]
    fn test_queries_on_empty_list() {
        let list = AnnotationList::new();
        assert_eq!(list.find_previous(1000), None);
        assert_eq!(list.find_next(1000), None);
        assert_eq!(list.find_nearest(1000, 500), None);
    }

    #[test]
    fn test_find_nearest_takes_first_match_not_closest() {
        let mut list = AnnotationList::new();
        list.insert_sorted(Annotation::new(600, "far"));
        list.insert_sorted(Annotation::new(990, "near"));
        // Both are within tolerance of 1000; the scan stops at index 0.
        assert_eq!(list.find_nearest(1000, 500), Some(0));
        // Strict comparison: exactly at tolerance is not a match.
        assert_eq!(list.find_nearest(1100, 500), Some(1));
        assert_eq!(list.find_nearest(2000, 500), None);
    }

    #[test]
    fn test_set_label_keeps_position_and_order() {
        let mut list = AnnotationList::new();
        list.insert_sorted(Annotation::new(100, "A"));
        list.insert_sorted(Annotation::new(200, "B"));
        list.set_label(0, "renamed").unwrap();
        assert_eq!(list.get(0).map(|a| a.label.as_str()), Some("renamed"));
        assert_eq!(positions(&list), vec![100, 200]);
        assert!(list.set_label(5, "nope").is_err());
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let mut list = AnnotationList::new();
        list.insert_sorted(Annotation::new(1000, "goal"));
        let json = serde_json::to_value(&list).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{ "position": 1000, "label": "goal" }])
        );

        let parsed: AnnotationList = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, list);
    }
}
