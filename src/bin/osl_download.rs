// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Command-line OSL dataset downloader.
//!
//! Fetches an OSL JSON file from a HuggingFace dataset repository together
//! with the video files it references, or reports what a download would
//! fetch with `--dry-run`.

use anyhow::Result;
use clap::Parser;
use oslviz::io::download::{self, DownloadEvent, DownloadRequest};
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about = "Download an OSL dataset from HuggingFace")]
struct Args {
    /// URL of the OSL JSON file on HuggingFace
    #[arg(long)]
    url: String,

    /// Directory to store downloaded files
    #[arg(long, default_value = "downloaded_data")]
    output_dir: PathBuf,

    /// List files to download without downloading them, and show total
    /// storage needed
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let task = download::spawn(DownloadRequest {
        url: args.url,
        output_dir: args.output_dir,
        dry_run: args.dry_run,
    });

    // The channel closes right after the terminal event.
    for event in task.events.iter() {
        match event {
            DownloadEvent::Log(line) => println!("{line}"),
            DownloadEvent::Progress { done, total } => println!("  [{done}/{total}] transferred"),
            DownloadEvent::Finished => return Ok(()),
            DownloadEvent::Cancelled => return Ok(()),
            DownloadEvent::Failed(e) => anyhow::bail!(e),
        }
    }
    Ok(())
}
