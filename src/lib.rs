// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! OSL Dataset Visualizer library.
//!
//! The annotation timeline model lives in [`models`]; document persistence,
//! the playback transport and the HuggingFace downloader live in [`io`].
//! The egui application in [`app`] wires them to the panels in [`ui`].

pub mod app;
pub mod config;
pub mod io;
pub mod models;
pub mod ui;
pub mod util;
