// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Video catalog panel.
//!
//! This module provides the left-hand panel: document load/save buttons and
//! the list of videos with their event counts.

use crate::models::dataset::Dataset;

/// Result of interacting with the video list panel.
pub enum VideoListAction {
    None,
    /// Open a dataset document via the file dialog.
    Open,
    /// Save the current document via the file dialog.
    Save,
    /// A video row was clicked.
    Select(usize),
    /// Add a video file to the catalog via the file dialog.
    Add,
    /// Remove the video at the given index.
    Remove(usize),
}

/// Display the document controls and the video catalog.
pub fn show(
    ui: &mut egui::Ui,
    dataset: Option<&Dataset>,
    selected_video: Option<usize>,
) -> VideoListAction {
    let mut action = VideoListAction::None;

    ui.horizontal(|ui| {
        if ui.button("Load OSL JSON").clicked() {
            action = VideoListAction::Open;
        }
        if ui
            .add_enabled(dataset.is_some(), egui::Button::new("Save OSL JSON"))
            .clicked()
        {
            action = VideoListAction::Save;
        }
    });

    ui.separator();

    ui.horizontal(|ui| {
        ui.label("Games");
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let can_remove = selected_video.is_some();
            if ui
                .add_enabled(can_remove, egui::Button::new("−"))
                .on_hover_text("Remove selected video")
                .clicked()
            {
                if let Some(index) = selected_video {
                    action = VideoListAction::Remove(index);
                }
            }
            if ui
                .add_enabled(dataset.is_some(), egui::Button::new("+"))
                .on_hover_text("Add a video file")
                .clicked()
            {
                action = VideoListAction::Add;
            }
        });
    });

    match dataset {
        Some(dataset) => {
            egui::ScrollArea::vertical()
                .id_source("video_list")
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    for (index, video) in dataset.videos.iter().enumerate() {
                        let text =
                            format!("{} ({} events)", video.path, video.annotations.len());
                        if ui
                            .selectable_label(selected_video == Some(index), text)
                            .clicked()
                        {
                            action = VideoListAction::Select(index);
                        }
                    }
                });
        }
        None => {
            ui.label(egui::RichText::new("No dataset loaded").weak());
        }
    }

    action
}
