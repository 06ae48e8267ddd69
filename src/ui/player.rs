// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Playback surface and transport controls.
//!
//! This module provides the center panel: the video surface placeholder,
//! the seek slider with its time label, play/pause, the playback-rate
//! selector and a go-to-time entry.

use crate::io::media::PlayerControl;
use crate::util::time::{hms_ms_to_ms, ms_to_time};

const PLAYBACK_RATES: [f32; 5] = [0.25, 0.5, 1.0, 1.5, 2.0];

/// Result of interacting with the player panel.
pub enum PlayerAction {
    None,
    TogglePlay,
    Seek(u64),
    SetRate(f32),
}

/// Display the playback surface and controls.
///
/// `video_path` is the resolved path of the selected video, if any;
/// `go_to_text` is the persistent buffer behind the go-to-time entry.
pub fn show(
    ui: &mut egui::Ui,
    player: &dyn PlayerControl,
    video_path: Option<&str>,
    go_to_text: &mut String,
) -> PlayerAction {
    let mut action = PlayerAction::None;

    // Playback surface. Frames come from the external player backend; this
    // area stands in for its window.
    let surface_height = (ui.available_height() - 90.0).max(120.0);
    egui::Frame::canvas(ui.style()).show(ui, |ui| {
        ui.set_min_size(egui::vec2(ui.available_width(), surface_height));
        ui.centered_and_justified(|ui| match video_path {
            Some(path) => {
                ui.label(
                    egui::RichText::new(path)
                        .size(14.0)
                        .color(egui::Color32::from_gray(180)),
                );
            }
            None => {
                ui.vertical_centered(|ui| {
                    ui.add_space(20.0);
                    ui.heading(
                        egui::RichText::new("OSL Dataset Visualizer")
                            .size(28.0)
                            .color(egui::Color32::from_gray(200)),
                    );
                    ui.label(
                        egui::RichText::new("Load an OSL JSON file and pick a game to begin")
                            .color(egui::Color32::from_gray(150)),
                    );
                });
            }
        });
    });

    // Seek slider and time label.
    ui.horizontal(|ui| {
        let duration = player.duration_ms();
        let mut position = player.position_ms();
        let slider = egui::Slider::new(&mut position, 0..=duration.max(1)).show_value(false);
        let response = ui.add_enabled(duration > 0, slider);
        if response.changed() {
            action = PlayerAction::Seek(position);
        }
        ui.label(format!(
            "{} / {}",
            ms_to_time(player.position_ms()),
            ms_to_time(duration)
        ));
    });

    ui.horizontal(|ui| {
        let play_label = if player.is_playing() { "Pause" } else { "Play" };
        if ui.button(play_label).clicked() {
            action = PlayerAction::TogglePlay;
        }

        ui.separator();

        let mut rate = player.rate();
        egui::ComboBox::from_label("Speed")
            .selected_text(format!("{rate}x"))
            .show_ui(ui, |ui| {
                for candidate in PLAYBACK_RATES {
                    if ui
                        .selectable_value(&mut rate, candidate, format!("{candidate}x"))
                        .clicked()
                    {
                        action = PlayerAction::SetRate(candidate);
                    }
                }
            });

        ui.separator();

        ui.label("Go to:");
        let entry = ui.add(
            egui::TextEdit::singleline(go_to_text)
                .hint_text("HH:MM:SS:ZZZ")
                .desired_width(110.0),
        );
        let submitted = entry.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        match hms_ms_to_ms(go_to_text) {
            Ok(target) => {
                if submitted {
                    action = PlayerAction::Seek(target);
                    go_to_text.clear();
                }
            }
            Err(e) => {
                if !go_to_text.is_empty() {
                    entry.on_hover_text(e.to_string());
                }
            }
        }
    });

    action
}
