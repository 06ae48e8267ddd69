// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation list, editor and label vocabulary panel.
//!
//! This module provides the right-hand panel: the event list for the
//! selected video, the label/timestamp editor with its metadata view,
//! previous/next navigation, and the label vocabulary manager.

use crate::models::dataset::Dataset;
use crate::util::time::ms_to_hms_ms;

/// Result of interacting with the annotation panel.
pub enum AnnotationAction {
    None,
    /// An annotation row was clicked.
    Select(usize),
    /// Create a new annotation at the current playhead.
    AddAtPlayhead,
    /// Remove the annotation at the given index.
    Remove(usize),
    /// Move the annotation at `index` to a new position.
    Retime { index: usize, position_ms: u64 },
    /// Change the label of the annotation at `index`.
    Relabel { index: usize, label: String },
    /// Jump to the last annotation before the playhead.
    JumpPrevious,
    /// Jump to the first annotation after the playhead.
    JumpNext,
    /// Add a label to the vocabulary.
    AddLabel(String),
    /// Remove a label from the vocabulary.
    RemoveLabel(String),
}

/// Display the annotation list and editors for the selected video.
///
/// `highlighted` is the row tracked to the playhead during playback, kept
/// separate from the clicked selection; `new_label_text` is the persistent
/// buffer behind the vocabulary entry field.
pub fn show(
    ui: &mut egui::Ui,
    dataset: Option<&Dataset>,
    selected_video: Option<usize>,
    selected_annotation: Option<usize>,
    highlighted: Option<usize>,
    new_label_text: &mut String,
) -> AnnotationAction {
    let mut action = AnnotationAction::None;

    // Dataset and selected video together, when both exist.
    let context = match (dataset, selected_video) {
        (Some(dataset), Some(index)) => dataset.videos.get(index).map(|video| (dataset, video)),
        _ => None,
    };
    let video = context.map(|(_, video)| video);

    ui.horizontal(|ui| {
        ui.label("Annotations");
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let can_remove = video.is_some() && selected_annotation.is_some();
            if ui
                .add_enabled(can_remove, egui::Button::new("−"))
                .on_hover_text("Remove selected annotation")
                .clicked()
            {
                if let Some(index) = selected_annotation {
                    action = AnnotationAction::Remove(index);
                }
            }
            if ui
                .add_enabled(video.is_some(), egui::Button::new("+"))
                .on_hover_text("Add an annotation at the playhead")
                .clicked()
            {
                action = AnnotationAction::AddAtPlayhead;
            }
        });
    });

    match context {
        Some((dataset, video)) => {
            egui::ScrollArea::vertical()
                .id_source("annotation_list")
                .max_height(220.0)
                .auto_shrink([false, true])
                .show(ui, |ui| {
                    for (index, annotation) in video.annotations.iter().enumerate() {
                        let text = format!(
                            "[{}] {}",
                            ms_to_hms_ms(annotation.position),
                            annotation.label
                        );
                        let is_current = selected_annotation == Some(index)
                            || highlighted == Some(index);
                        if ui.selectable_label(is_current, text).clicked() {
                            action = AnnotationAction::Select(index);
                        }
                    }
                });

            ui.horizontal(|ui| {
                if ui.button("Previous").clicked() {
                    action = AnnotationAction::JumpPrevious;
                }
                if ui.button("Next").clicked() {
                    action = AnnotationAction::JumpNext;
                }
            });

            ui.separator();
            ui.label("Edit Annotation");
            if let Some((index, annotation)) = selected_annotation
                .and_then(|index| video.annotations.get(index).map(|a| (index, a)))
            {
                let mut label = annotation.label.clone();
                egui::ComboBox::from_label("Label")
                    .selected_text(&label)
                    .show_ui(ui, |ui| {
                        for candidate in &dataset.labels {
                            if ui
                                .selectable_value(&mut label, candidate.clone(), candidate)
                                .clicked()
                                && label != annotation.label
                            {
                                action = AnnotationAction::Relabel {
                                    index,
                                    label: label.clone(),
                                };
                            }
                        }
                    });

                let mut position_ms = annotation.position;
                let drag = ui.add(
                    egui::DragValue::new(&mut position_ms)
                        .speed(100)
                        .suffix(" ms"),
                );
                if drag.changed() {
                    action = AnnotationAction::Retime { index, position_ms };
                }

                ui.label("Metadata");
                match &annotation.metadata {
                    Some(metadata) => {
                        let pretty = serde_json::to_string_pretty(metadata)
                            .unwrap_or_else(|_| String::new());
                        egui::ScrollArea::vertical()
                            .id_source("metadata_view")
                            .max_height(140.0)
                            .show(ui, |ui| {
                                ui.label(egui::RichText::new(pretty).monospace());
                            });
                    }
                    None => {
                        ui.label(egui::RichText::new("(none)").weak());
                    }
                }
            } else {
                ui.label(egui::RichText::new("No annotation selected").weak());
            }
        }
        None => {
            ui.label(egui::RichText::new("No video selected").weak());
        }
    }

    ui.separator();
    ui.label("Labels");
    if let Some(dataset) = dataset {
        for label in &dataset.labels {
            ui.horizontal(|ui| {
                ui.label(label);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.small_button("✕").clicked() {
                        action = AnnotationAction::RemoveLabel(label.clone());
                    }
                });
            });
        }
        ui.horizontal(|ui| {
            ui.add(
                egui::TextEdit::singleline(new_label_text)
                    .hint_text("New label")
                    .desired_width(140.0),
            );
            let text = new_label_text.trim();
            if ui
                .add_enabled(!text.is_empty(), egui::Button::new("Add"))
                .clicked()
            {
                action = AnnotationAction::AddLabel(text.to_string());
                new_label_text.clear();
            }
        });
    }

    action
}
