// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! HuggingFace downloader window contents.
//!
//! This module provides the form and progress view for fetching an OSL
//! dataset (the JSON plus the videos it references) in the background.

/// Persistent state behind the downloader form.
pub struct DownloaderState {
    pub url: String,
    pub output_dir: String,
    pub dry_run: bool,
    pub log: Vec<String>,
    /// Files transferred so far out of the total, once known.
    pub progress: Option<(usize, usize)>,
}

impl Default for DownloaderState {
    fn default() -> Self {
        Self {
            url: String::new(),
            output_dir: "downloaded_data".to_string(),
            dry_run: false,
            log: Vec::new(),
            progress: None,
        }
    }
}

/// Result of interacting with the downloader window.
pub enum DownloaderAction {
    None,
    Start,
    Cancel,
}

/// Display the downloader form, log and progress.
pub fn show(ui: &mut egui::Ui, state: &mut DownloaderState, running: bool) -> DownloaderAction {
    let mut action = DownloaderAction::None;

    egui::Grid::new("downloader_form")
        .num_columns(2)
        .show(ui, |ui| {
            ui.label("OSL JSON URL");
            ui.add_enabled(
                !running,
                egui::TextEdit::singleline(&mut state.url)
                    .hint_text("https://huggingface.co/datasets/...")
                    .desired_width(320.0),
            );
            ui.end_row();

            ui.label("Output directory");
            ui.add_enabled(
                !running,
                egui::TextEdit::singleline(&mut state.output_dir).desired_width(320.0),
            );
            ui.end_row();
        });

    ui.add_enabled(!running, egui::Checkbox::new(&mut state.dry_run, "Dry run"))
        .on_hover_text("List files and total storage needed without downloading");

    ui.horizontal(|ui| {
        let can_start = !running && !state.url.trim().is_empty();
        if ui
            .add_enabled(can_start, egui::Button::new("Start"))
            .clicked()
        {
            action = DownloaderAction::Start;
        }
        if ui
            .add_enabled(running, egui::Button::new("Cancel"))
            .clicked()
        {
            action = DownloaderAction::Cancel;
        }
        if running {
            ui.spinner();
        }
    });

    if let Some((done, total)) = state.progress {
        let fraction = if total > 0 {
            done as f32 / total as f32
        } else {
            0.0
        };
        ui.add(
            egui::ProgressBar::new(fraction).text(format!("{done}/{total} files")),
        );
    }

    if !state.log.is_empty() {
        ui.separator();
        egui::ScrollArea::vertical()
            .id_source("download_log")
            .max_height(160.0)
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for line in &state.log {
                    ui.label(egui::RichText::new(line).monospace().size(11.0));
                }
            });
    }

    action
}
