// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! OSL Dataset Visualizer
//!
//! A cross-platform desktop application for viewing and hand-editing
//! timestamped event annotations (OSL action-spotting datasets)
//! synchronized against video playback.

use anyhow::Result;
use clap::Parser;
use oslviz::app::OslApp;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about = "OSL Dataset Visualizer")]
struct Args {
    /// Path to an OSL JSON file to preload
    #[arg(long)]
    osl_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1600.0, 800.0])
            .with_min_inner_size([1000.0, 600.0])
            .with_title("OSL Dataset Visualizer"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "OSL Dataset Visualizer",
        options,
        Box::new(move |_cc| Ok(Box::new(OslApp::new(args.osl_file)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
