// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module contains the main application structure that implements the
//! egui::App trait, coordinating the dataset document, the playback
//! transport and the panel actions.

use crate::config::Config;
use crate::io::download::{self, DownloadEvent, DownloadRequest, DownloadTask};
use crate::io::media::{PlayerControl, Transport};
use crate::io::serialization;
use crate::models::annotation::{Annotation, AnnotationList};
use crate::models::dataset::Dataset;
use crate::ui::downloader::DownloaderState;
use crate::ui::{annotations, downloader, player, video_list};
use std::path::{Path, PathBuf};

/// Tolerance for snapping the list highlight to the playhead.
const HIGHLIGHT_TOLERANCE_MS: u64 = 500;

/// Arrow-key seek step.
const STEP_MS: i64 = 1000;

/// Tail added past the last annotation when bounding the transport clock.
/// A real player backend would report the container duration instead.
const DURATION_TAIL_MS: u64 = 60_000;

/// Main application state.
pub struct OslApp {
    /// Current dataset document (if one is loaded)
    dataset: Option<Dataset>,

    /// Where the document was loaded from
    dataset_path: Option<PathBuf>,

    /// Directory video paths resolve against
    video_dir: PathBuf,

    /// Resolved path of the selected video
    current_video_path: Option<PathBuf>,

    /// Index of the selected video in the catalog
    selected_video: Option<usize>,

    /// Index of the annotation being edited
    selected_annotation: Option<usize>,

    /// Row tracked to the playhead during playback; separate from the
    /// clicked selection
    highlighted_annotation: Option<usize>,

    /// Playback clock
    transport: Transport,

    /// Persisted preferences
    config: Config,

    /// Status line shown in the bottom bar
    status: Option<String>,

    /// Buffer behind the go-to-time entry
    go_to_text: String,

    /// Buffer behind the new-label entry
    new_label_text: String,

    show_preferences: bool,
    preferences_draft_ms: u64,

    show_downloader: bool,
    downloader_state: DownloaderState,
    download_task: Option<DownloadTask>,
}

impl Default for OslApp {
    fn default() -> Self {
        Self::new(None)
    }
}

impl OslApp {
    /// Create the application, optionally preloading a document.
    pub fn new(preload: Option<PathBuf>) -> Self {
        let config = Config::load();
        let mut app = Self {
            dataset: None,
            dataset_path: None,
            video_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            current_video_path: None,
            selected_video: None,
            selected_annotation: None,
            highlighted_annotation: None,
            transport: Transport::new(),
            preferences_draft_ms: config.jump_before_ms,
            config,
            status: None,
            go_to_text: String::new(),
            new_label_text: String::new(),
            show_preferences: false,
            show_downloader: false,
            downloader_state: DownloaderState::default(),
            download_task: None,
        };
        if let Some(path) = preload {
            log::info!("Autoloading file from --osl-file: {}", path.display());
            app.load_document(&path);
        }
        app
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    fn current_annotations(&self) -> Option<&AnnotationList> {
        let dataset = self.dataset.as_ref()?;
        let video = dataset.videos.get(self.selected_video?)?;
        Some(&video.annotations)
    }

    fn current_annotations_mut(&mut self) -> Option<&mut AnnotationList> {
        let index = self.selected_video?;
        let dataset = self.dataset.as_mut()?;
        Some(&mut dataset.videos.get_mut(index)?.annotations)
    }

    fn resolve_video_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.video_dir.join(path)
        }
    }

    /// Load a document from disk. On failure the current in-memory
    /// document is left untouched.
    fn load_document(&mut self, path: &Path) {
        log::info!("Loading OSL JSON file: {}", path.display());
        match serialization::load_dataset(path) {
            Ok(dataset) => {
                log::info!("Loaded JSON with {} videos", dataset.videos.len());
                self.dataset = Some(dataset);
                self.dataset_path = Some(path.to_path_buf());
                if let Some(parent) = path.parent() {
                    self.video_dir = parent.to_path_buf();
                    self.config.last_dir = Some(parent.to_path_buf());
                    if let Err(e) = self.config.save() {
                        log::warn!("Failed to save config: {e:#}");
                    }
                }
                self.selected_video = None;
                self.selected_annotation = None;
                self.highlighted_annotation = None;
                self.current_video_path = None;
                self.transport = Transport::new();
                self.set_status(format!("Loaded {}", path.display()));
            }
            Err(e) => {
                self.set_status(format!("Failed to load JSON: {e}"));
                log::error!("Failed to load {}: {e}", path.display());
            }
        }
    }

    fn save_document(&mut self, path: &Path) {
        let Some(dataset) = self.dataset.as_mut() else {
            log::warn!("No data to save.");
            return;
        };
        match serialization::save_dataset(dataset, path) {
            Ok(()) => {
                log::info!("Annotations saved to {}", path.display());
                self.set_status(format!("Annotations saved to {}", path.display()));
            }
            Err(e) => {
                log::error!("Failed to save {}: {e}", path.display());
                self.set_status(format!("Failed to save JSON: {e}"));
            }
        }
    }

    fn open_dialog(&mut self) {
        let mut dialog = rfd::FileDialog::new().add_filter("JSON Files", &["json"]);
        if let Some(dir) = &self.config.last_dir {
            dialog = dialog.set_directory(dir);
        }
        if let Some(path) = dialog.pick_file() {
            self.load_document(&path);
        }
    }

    fn save_dialog(&mut self) {
        if self.dataset.is_none() {
            log::warn!("No data to save.");
            return;
        }
        let file_name = self
            .dataset_path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "dataset.json".to_string());
        let mut dialog = rfd::FileDialog::new()
            .add_filter("JSON Files", &["json"])
            .set_file_name(file_name);
        if let Some(dir) = &self.config.last_dir {
            dialog = dialog.set_directory(dir);
        }
        match dialog.save_file() {
            Some(path) => self.save_document(&path),
            None => log::info!("Save cancelled."),
        }
    }

    fn select_video(&mut self, index: usize) {
        let Some(dataset) = self.dataset.as_ref() else {
            return;
        };
        let video = match dataset.video(index) {
            Ok(video) => video,
            Err(e) => {
                let message = e.to_string();
                self.set_status(message);
                return;
            }
        };
        let resolved = self.resolve_video_path(&video.path);
        let last_position = video
            .annotations
            .iter()
            .map(|annotation| annotation.position)
            .max()
            .unwrap_or(0);

        self.selected_video = Some(index);
        self.selected_annotation = None;
        self.highlighted_annotation = None;
        self.transport.open(last_position + DURATION_TAIL_MS);
        log::info!("Selected video: {}", resolved.display());

        if resolved.exists() {
            self.transport.play();
            log::info!("Started video playback.");
        } else {
            self.set_status(format!("Video file not found: {}", resolved.display()));
            log::warn!("Video file not found: {}", resolved.display());
        }
        self.current_video_path = Some(resolved);
    }

    fn remove_video(&mut self, index: usize) {
        let Some(dataset) = self.dataset.as_mut() else {
            return;
        };
        match dataset.remove_video(index) {
            Ok(removed) => {
                log::info!("Removed video {}", removed.path);
                match self.selected_video {
                    Some(selected) if selected == index => {
                        self.selected_video = None;
                        self.selected_annotation = None;
                        self.highlighted_annotation = None;
                        self.current_video_path = None;
                        self.transport = Transport::new();
                    }
                    Some(selected) if selected > index => {
                        self.selected_video = Some(selected - 1);
                    }
                    _ => {}
                }
            }
            Err(e) => self.set_status(e.to_string()),
        }
    }

    fn add_video_dialog(&mut self) {
        if self.dataset.is_none() {
            return;
        }
        let dialog = rfd::FileDialog::new()
            .add_filter("Videos", &["mp4", "mkv", "avi", "mov", "webm"])
            .set_directory(&self.video_dir);
        let Some(path) = dialog.pick_file() else {
            return;
        };
        // Store relative to the document's directory when the file is
        // inside it, so the document stays relocatable.
        let stored = path
            .strip_prefix(&self.video_dir)
            .unwrap_or(&path)
            .to_string_lossy()
            .to_string();
        let Some(dataset) = self.dataset.as_mut() else {
            return;
        };
        dataset.add_video(stored.clone());
        let index = dataset.videos.iter().position(|video| video.path == stored);
        log::info!("Added video {stored}");
        if let Some(index) = index {
            self.select_video(index);
        }
    }

    fn select_annotation(&mut self, index: usize) {
        let jump_before = self.config.jump_before_ms;
        let Some(annotations) = self.current_annotations() else {
            return;
        };
        let Some(annotation) = annotations.get(index) else {
            return;
        };
        let position = annotation.position;
        let label = annotation.label.clone();

        self.selected_annotation = Some(index);
        self.transport.seek(position.saturating_sub(jump_before));
        self.transport.play();
        log::info!("Selected annotation at idx={index}, time={position}ms, label={label}");
    }

    fn add_annotation_at_playhead(&mut self) {
        let position = self.transport.position_ms();
        let label = self
            .dataset
            .as_ref()
            .and_then(|dataset| dataset.labels.first().cloned())
            .unwrap_or_else(|| "event".to_string());
        let Some(annotations) = self.current_annotations_mut() else {
            return;
        };
        let index = annotations.insert_sorted(Annotation::new(position, label));
        self.selected_annotation = Some(index);
        self.highlighted_annotation = None;
        log::info!("Added annotation at {position}ms, index {index}");
    }

    fn remove_annotation(&mut self, index: usize) {
        let Some(annotations) = self.current_annotations_mut() else {
            return;
        };
        match annotations.remove_at(index) {
            Ok(removed) => {
                self.highlighted_annotation = None;
                self.selected_annotation = match self.selected_annotation {
                    Some(selected) if selected == index => None,
                    Some(selected) if selected > index => Some(selected - 1),
                    other => other,
                };
                log::info!("Removed annotation at {}ms ({})", removed.position, removed.label);
            }
            Err(e) => self.set_status(e.to_string()),
        }
    }

    fn retime_annotation(&mut self, index: usize, position_ms: u64) {
        let Some(annotations) = self.current_annotations_mut() else {
            return;
        };
        match annotations.retime(index, position_ms) {
            Ok(new_index) => {
                // Follow the entry to wherever the re-sort put it.
                self.selected_annotation = Some(new_index);
                log::info!("Retimed annotation to {position_ms}ms, index {index} -> {new_index}");
            }
            Err(e) => self.set_status(e.to_string()),
        }
    }

    fn relabel_annotation(&mut self, index: usize, label: String) {
        let Some(annotations) = self.current_annotations_mut() else {
            return;
        };
        match annotations.set_label(index, label.clone()) {
            Ok(()) => log::info!("Updated annotation idx={index} to label={label}"),
            Err(e) => self.set_status(e.to_string()),
        }
    }

    fn jump_previous(&mut self) {
        let position = self.transport.position_ms();
        let target = self
            .current_annotations()
            .and_then(|annotations| annotations.find_previous(position));
        if let Some(index) = target {
            self.select_annotation(index);
            log::info!("Jumped to previous annotation idx={index}.");
        }
    }

    fn jump_next(&mut self) {
        let position = self.transport.position_ms();
        let target = self
            .current_annotations()
            .and_then(|annotations| annotations.find_next(position));
        if let Some(index) = target {
            self.select_annotation(index);
            log::info!("Jumped to next annotation idx={index}.");
        }
    }

    fn add_label(&mut self, text: String) {
        let Some(dataset) = self.dataset.as_mut() else {
            return;
        };
        match dataset.add_label(text.clone()) {
            Ok(()) => log::info!("Added label {text}"),
            Err(e) => self.set_status(e.to_string()),
        }
    }

    fn remove_label(&mut self, text: String) {
        let Some(dataset) = self.dataset.as_mut() else {
            return;
        };
        match dataset.remove_label(&text) {
            Ok(()) => log::info!("Removed label {text}"),
            Err(e) => self.set_status(e.to_string()),
        }
    }

    fn toggle_play(&mut self) {
        if self.transport.is_playing() {
            self.transport.pause();
            log::info!("Paused video.");
        } else {
            self.transport.play();
            log::info!("Playing video.");
        }
    }

    /// Seek relative to the current position, clamped to `[0, duration]`.
    fn step_video(&mut self, delta_ms: i64) {
        let position = self.transport.position_ms();
        let target = if delta_ms < 0 {
            position.saturating_sub(delta_ms.unsigned_abs())
        } else {
            position.saturating_add(delta_ms as u64)
        };
        self.transport.seek(target);
    }

    fn start_download(&mut self) {
        let request = DownloadRequest {
            url: self.downloader_state.url.trim().to_string(),
            output_dir: PathBuf::from(self.downloader_state.output_dir.trim()),
            dry_run: self.downloader_state.dry_run,
        };
        self.downloader_state.log.clear();
        self.downloader_state.progress = None;
        self.download_task = Some(download::spawn(request));
    }

    fn poll_download_events(&mut self) {
        let Some(task) = &self.download_task else {
            return;
        };
        let mut finished = false;
        while let Ok(event) = task.events.try_recv() {
            match event {
                DownloadEvent::Log(line) => self.downloader_state.log.push(line),
                DownloadEvent::Progress { done, total } => {
                    self.downloader_state.progress = Some((done, total));
                }
                DownloadEvent::Finished => {
                    self.downloader_state.log.push("Download finished.".to_string());
                    finished = true;
                }
                DownloadEvent::Cancelled => {
                    self.downloader_state.log.push("Download cancelled.".to_string());
                    finished = true;
                }
                DownloadEvent::Failed(e) => {
                    self.downloader_state.log.push(format!("Download failed: {e}"));
                    finished = true;
                }
            }
        }
        if finished {
            self.download_task = None;
        }
    }
}

impl eframe::App for OslApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_download_events();

        // Track the playhead with a highlight row. The previous highlight
        // is kept when nothing falls inside the tolerance window.
        if self.transport.is_playing() {
            let position = self.transport.position_ms();
            let hit = self
                .current_annotations()
                .and_then(|annotations| annotations.find_nearest(position, HIGHLIGHT_TOLERANCE_MS));
            if let Some(index) = hit {
                self.highlighted_annotation = Some(index);
            }
        }

        // Keyboard shortcuts, skipped while a text field has focus.
        if !ctx.wants_keyboard_input() {
            if ctx.input(|i| i.key_pressed(egui::Key::Space)) {
                self.toggle_play();
            }
            if ctx.input(|i| i.key_pressed(egui::Key::ArrowLeft)) {
                self.step_video(-STEP_MS);
            }
            if ctx.input(|i| i.key_pressed(egui::Key::ArrowRight)) {
                self.step_video(STEP_MS);
            }
        }

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open OSL JSON...").clicked() {
                        self.open_dialog();
                        ui.close_menu();
                    }
                    if ui
                        .add_enabled(
                            self.dataset.is_some(),
                            egui::Button::new("Save OSL JSON..."),
                        )
                        .clicked()
                    {
                        self.save_dialog();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("Tools", |ui| {
                    if ui.button("Download from HuggingFace...").clicked() {
                        self.show_downloader = true;
                        ui.close_menu();
                    }
                    if ui.button("Preferences...").clicked() {
                        self.preferences_draft_ms = self.config.jump_before_ms;
                        self.show_preferences = true;
                        ui.close_menu();
                    }
                });
            });
        });

        // Status bar
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                match &self.status {
                    Some(status) => ui.label(status),
                    None => ui.label("Ready"),
                };
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if let Some(dataset) = &self.dataset {
                        ui.label(format!(
                            "{} videos, {} labels",
                            dataset.videos.len(),
                            dataset.labels.len()
                        ));
                    }
                });
            });
        });

        // Left panel - video catalog
        let video_action = egui::SidePanel::left("video_list")
            .default_width(260.0)
            .show(ctx, |ui| {
                video_list::show(ui, self.dataset.as_ref(), self.selected_video)
            })
            .inner;

        match video_action {
            video_list::VideoListAction::Open => self.open_dialog(),
            video_list::VideoListAction::Save => self.save_dialog(),
            video_list::VideoListAction::Select(index) => self.select_video(index),
            video_list::VideoListAction::Add => self.add_video_dialog(),
            video_list::VideoListAction::Remove(index) => self.remove_video(index),
            video_list::VideoListAction::None => {}
        }

        // Right panel - annotations
        let annotation_action = egui::SidePanel::right("annotations")
            .default_width(330.0)
            .show(ctx, |ui| {
                annotations::show(
                    ui,
                    self.dataset.as_ref(),
                    self.selected_video,
                    self.selected_annotation,
                    self.highlighted_annotation,
                    &mut self.new_label_text,
                )
            })
            .inner;

        match annotation_action {
            annotations::AnnotationAction::Select(index) => self.select_annotation(index),
            annotations::AnnotationAction::AddAtPlayhead => self.add_annotation_at_playhead(),
            annotations::AnnotationAction::Remove(index) => self.remove_annotation(index),
            annotations::AnnotationAction::Retime { index, position_ms } => {
                self.retime_annotation(index, position_ms)
            }
            annotations::AnnotationAction::Relabel { index, label } => {
                self.relabel_annotation(index, label)
            }
            annotations::AnnotationAction::JumpPrevious => self.jump_previous(),
            annotations::AnnotationAction::JumpNext => self.jump_next(),
            annotations::AnnotationAction::AddLabel(text) => self.add_label(text),
            annotations::AnnotationAction::RemoveLabel(text) => self.remove_label(text),
            annotations::AnnotationAction::None => {}
        }

        // Center panel - playback
        let video_path_text = self
            .current_video_path
            .as_ref()
            .map(|path| path.display().to_string());
        let player_action = egui::CentralPanel::default()
            .show(ctx, |ui| {
                player::show(
                    ui,
                    &self.transport,
                    video_path_text.as_deref(),
                    &mut self.go_to_text,
                )
            })
            .inner;

        match player_action {
            player::PlayerAction::TogglePlay => self.toggle_play(),
            player::PlayerAction::Seek(position_ms) => {
                self.transport.seek(position_ms);
                log::info!("Seeked video to {}ms.", self.transport.position_ms());
            }
            player::PlayerAction::SetRate(rate) => {
                self.transport.set_rate(rate);
                log::info!("Playback rate set to {rate}x.");
            }
            player::PlayerAction::None => {}
        }

        // Preferences window
        if self.show_preferences {
            let mut open = true;
            let mut save_clicked = false;
            let mut cancel_clicked = false;
            egui::Window::new("Preferences")
                .open(&mut open)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        ui.label("Jump before annotation (ms)");
                        ui.add(
                            egui::DragValue::new(&mut self.preferences_draft_ms).speed(100),
                        );
                    });
                    ui.horizontal(|ui| {
                        if ui.button("OK").clicked() {
                            save_clicked = true;
                        }
                        if ui.button("Cancel").clicked() {
                            cancel_clicked = true;
                        }
                    });
                });
            if save_clicked {
                self.config.jump_before_ms = self.preferences_draft_ms;
                if let Err(e) = self.config.save() {
                    log::warn!("Failed to save config: {e:#}");
                }
                self.set_status(format!(
                    "Jump-before set to {} ms",
                    self.config.jump_before_ms
                ));
            }
            if save_clicked || cancel_clicked || !open {
                self.show_preferences = false;
            }
        }

        // Downloader window. Closing it leaves a running download alone;
        // reopening shows the accumulated log.
        if self.show_downloader {
            let mut open = true;
            let running = self.download_task.is_some();
            let mut action = downloader::DownloaderAction::None;
            egui::Window::new("Download from HuggingFace")
                .open(&mut open)
                .default_width(470.0)
                .show(ctx, |ui| {
                    action = downloader::show(ui, &mut self.downloader_state, running);
                });
            match action {
                downloader::DownloaderAction::Start => self.start_download(),
                downloader::DownloaderAction::Cancel => {
                    if let Some(task) = &self.download_task {
                        task.cancel();
                    }
                }
                downloader::DownloaderAction::None => {}
            }
            if !open {
                self.show_downloader = false;
            }
        }

        // Keep the slider and highlight moving.
        if self.transport.is_playing() || self.download_task.is_some() {
            ctx.request_repaint_after(std::time::Duration::from_millis(33));
        }
    }
}
