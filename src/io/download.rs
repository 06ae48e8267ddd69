// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! HuggingFace dataset downloader.
//!
//! Fetches an OSL JSON file from a HuggingFace dataset repository, then the
//! video files it references. Runs on a background thread and reports
//! progress over a one-way channel; cancellation is cooperative, checked
//! between file transfers and never mid-transfer.

use crate::io::serialization;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

const HF_HOST: &str = "https://huggingface.co";

/// Location of one file inside a HuggingFace dataset repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HfFileRef {
    pub repo_id: String,
    pub revision: String,
    pub path_in_repo: String,
}

/// Convert a HuggingFace "blob" URL to a "resolve" URL for direct download.
pub fn fix_hf_url(url: &str) -> String {
    url.replace("/blob/", "/resolve/")
}

/// Parse a HuggingFace dataset file URL ("blob" or "resolve" form).
pub fn parse_hf_url(url: &str) -> Result<HfFileRef> {
    let fixed = fix_hf_url(url);
    let after_scheme = fixed
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(&fixed);
    let path = match after_scheme.split_once('/') {
        Some((_host, rest)) => rest,
        None => "",
    };
    let mut parts: Vec<&str> = path
        .trim_matches('/')
        .split('/')
        .filter(|part| !part.is_empty())
        .collect();
    if let Some(index) = parts.iter().position(|part| *part == "datasets") {
        parts.drain(..=index);
    }
    if parts.len() < 5 || parts[2] != "resolve" {
        bail!("URL does not look like a valid HuggingFace dataset file URL: {fixed}");
    }
    Ok(HfFileRef {
        repo_id: format!("{}/{}", parts[0], parts[1]),
        revision: parts[3].to_string(),
        path_in_repo: parts[4..].join("/"),
    })
}

/// Folder containing the JSON inside the repo, or "" when it sits at the
/// root. Video paths in the document are relative to this folder.
fn json_repo_folder(path_in_repo: &str) -> &str {
    match path_in_repo.rsplit_once('/') {
        Some((folder, _file)) => folder,
        None => "",
    }
}

/// Prefix `rel_path` with the repo folder the JSON lives in, unless it
/// already is.
fn repo_full_path(repo_json_folder: &str, rel_path: &str) -> String {
    let rel = rel_path.trim_start_matches('/');
    if !repo_json_folder.is_empty() && !rel.starts_with(&format!("{repo_json_folder}/")) {
        format!("{repo_json_folder}/{rel}")
    } else {
        rel.to_string()
    }
}

/// Convert a byte count to a human-readable string (B, KB, MB, GB, TB).
pub fn human_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in ["B", "KB", "MB", "GB", "TB"] {
        if size < 1024.0 {
            return format!("{size:.1} {unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.1} PB")
}

/// What to fetch and where to put it.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    /// URL of the OSL JSON file on HuggingFace.
    pub url: String,
    /// Directory to store downloaded files.
    pub output_dir: PathBuf,
    /// List files and total storage needed without downloading.
    pub dry_run: bool,
}

/// Progress notifications emitted by the download thread.
#[derive(Debug)]
pub enum DownloadEvent {
    Log(String),
    /// Video files transferred so far out of the total.
    Progress { done: usize, total: usize },
    Finished,
    Cancelled,
    Failed(String),
}

/// Handle to a running download.
pub struct DownloadTask {
    pub events: Receiver<DownloadEvent>,
    cancel: Arc<AtomicBool>,
}

impl DownloadTask {
    /// Request cooperative cancellation; honored between file transfers.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }
}

/// Spawn the download on a background thread and return its handle.
pub fn spawn(request: DownloadRequest) -> DownloadTask {
    let (sender, events) = channel();
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancel);
    std::thread::spawn(move || {
        let terminal = match run(&request, &sender, &flag) {
            Ok(true) => DownloadEvent::Finished,
            Ok(false) => DownloadEvent::Cancelled,
            Err(e) => DownloadEvent::Failed(format!("{e:#}")),
        };
        let _ = sender.send(terminal);
    });
    DownloadTask { events, cancel }
}

fn emit(sender: &Sender<DownloadEvent>, line: String) {
    log::info!("{line}");
    let _ = sender.send(DownloadEvent::Log(line));
}

/// Returns `Ok(true)` on completion, `Ok(false)` when cancelled.
fn run(
    request: &DownloadRequest,
    sender: &Sender<DownloadEvent>,
    cancel: &AtomicBool,
) -> Result<bool> {
    let json_ref = parse_hf_url(&request.url)?;
    let repo_json_folder = json_repo_folder(&json_ref.path_in_repo).to_string();

    emit(
        sender,
        format!(
            "Downloading OSL JSON from {}@{}: {}",
            json_ref.repo_id, json_ref.revision, json_ref.path_in_repo
        ),
    );

    let client = reqwest::blocking::Client::builder()
        .build()
        .context("failed to build HTTP client")?;
    std::fs::create_dir_all(&request.output_dir).with_context(|| {
        format!("failed to create output dir {}", request.output_dir.display())
    })?;

    let json_path = fetch_repo_file(&client, &json_ref, &request.output_dir)?;
    emit(sender, format!("Saved as {}", json_path.display()));

    let dataset = serialization::load_dataset(&json_path)
        .with_context(|| format!("failed to parse {}", json_path.display()))?;
    emit(
        sender,
        format!("Found {} video files to download.", dataset.videos.len()),
    );

    let mut repo_paths: Vec<String> = dataset
        .videos
        .iter()
        .map(|video| repo_full_path(&repo_json_folder, &video.path))
        .collect();
    repo_paths.sort();
    repo_paths.dedup();

    if request.dry_run {
        dry_run_report(&client, &json_ref, &repo_paths, &request.output_dir, sender)?;
        return Ok(true);
    }

    let total = repo_paths.len();
    for (index, repo_path) in repo_paths.iter().enumerate() {
        if cancel.load(Ordering::Relaxed) {
            emit(sender, "Cancellation requested, stopping.".to_string());
            return Ok(false);
        }
        let file_ref = HfFileRef {
            repo_id: json_ref.repo_id.clone(),
            revision: json_ref.revision.clone(),
            path_in_repo: repo_path.clone(),
        };
        fetch_repo_file(&client, &file_ref, &request.output_dir)?;
        emit(sender, format!("Downloaded {repo_path}"));
        let _ = sender.send(DownloadEvent::Progress {
            done: index + 1,
            total,
        });
    }

    emit(
        sender,
        format!(
            "All requested files downloaded to: {}",
            request.output_dir.display()
        ),
    );
    Ok(true)
}

fn resolve_url(file: &HfFileRef) -> String {
    format!(
        "{HF_HOST}/datasets/{}/resolve/{}/{}",
        file.repo_id, file.revision, file.path_in_repo
    )
}

/// Download one repo file to its mirrored path under `output_dir`.
fn fetch_repo_file(
    client: &reqwest::blocking::Client,
    file: &HfFileRef,
    output_dir: &Path,
) -> Result<PathBuf> {
    let url = resolve_url(file);
    let local_path = output_dir.join(&file.path_in_repo);
    if let Some(parent) = local_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let bytes = client
        .get(&url)
        .send()
        .and_then(|response| response.error_for_status())
        .with_context(|| format!("failed to fetch {url}"))?
        .bytes()
        .with_context(|| format!("failed to read body of {url}"))?;
    std::fs::write(&local_path, &bytes)
        .with_context(|| format!("failed to write {}", local_path.display()))?;
    Ok(local_path)
}

#[derive(Debug, Deserialize)]
struct RepoInfo {
    #[serde(default)]
    siblings: Vec<RepoFile>,
}

#[derive(Debug, Deserialize)]
struct RepoFile {
    rfilename: String,
    #[serde(default)]
    size: Option<u64>,
}

/// Report what would be downloaded and the total storage needed.
fn dry_run_report(
    client: &reqwest::blocking::Client,
    json_ref: &HfFileRef,
    repo_paths: &[String],
    output_dir: &Path,
    sender: &Sender<DownloadEvent>,
) -> Result<()> {
    let info_url = format!(
        "{HF_HOST}/api/datasets/{}/revision/{}?blobs=true",
        json_ref.repo_id, json_ref.revision
    );
    let size_lookup: HashMap<String, u64> = match client
        .get(&info_url)
        .send()
        .and_then(|response| response.error_for_status())
    {
        Ok(response) => {
            let info: RepoInfo = response
                .json()
                .with_context(|| format!("failed to parse repo info from {info_url}"))?;
            info.siblings
                .into_iter()
                .filter_map(|file| file.size.map(|size| (file.rfilename, size)))
                .collect()
        }
        Err(e) => {
            emit(sender, format!("Could not fetch repo files info: {e}"));
            HashMap::new()
        }
    };

    let mut total_size = 0;
    let mut missing = Vec::new();
    for repo_path in repo_paths {
        let local_path = output_dir.join(repo_path);
        let size_text = match size_lookup.get(repo_path) {
            Some(size) => {
                total_size += size;
                human_size(*size)
            }
            None => {
                missing.push(repo_path.clone());
                "not found".to_string()
            }
        };
        emit(
            sender,
            format!(
                "Would download '{repo_path}' ({size_text}) to '{}'",
                local_path.display()
            ),
        );
    }

    emit(
        sender,
        format!("Total estimated storage needed: {}", human_size(total_size)),
    );
    if !missing.is_empty() {
        emit(
            sender,
            format!("WARNING: {} files not found in repo!", missing.len()),
        );
        for path in &missing {
            emit(sender, format!("  - {path}"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fix_hf_url_rewrites_blob() {
        assert_eq!(
            fix_hf_url("https://huggingface.co/datasets/org/repo/blob/main/osl.json"),
            "https://huggingface.co/datasets/org/repo/resolve/main/osl.json"
        );
    }

    #[test]
    fn test_parse_hf_url_resolve_form() {
        let parsed =
            parse_hf_url("https://huggingface.co/datasets/org/soccer/resolve/main/osl.json")
                .unwrap();
        assert_eq!(
            parsed,
            HfFileRef {
                repo_id: "org/soccer".to_string(),
                revision: "main".to_string(),
                path_in_repo: "osl.json".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_hf_url_blob_form_with_nested_path() {
        let parsed = parse_hf_url(
            "https://huggingface.co/datasets/org/soccer/blob/v2/season/2024/osl.json",
        )
        .unwrap();
        assert_eq!(parsed.revision, "v2");
        assert_eq!(parsed.path_in_repo, "season/2024/osl.json");
    }

    #[test]
    fn test_parse_hf_url_rejects_garbage() {
        assert!(parse_hf_url("https://huggingface.co/org/repo").is_err());
        assert!(parse_hf_url("https://example.com/nothing/here").is_err());
        assert!(parse_hf_url("not a url at all").is_err());
        // A repo URL without a file path is not a file URL.
        assert!(parse_hf_url("https://huggingface.co/datasets/org/repo/resolve/main").is_err());
    }

    #[test]
    fn test_json_repo_folder() {
        assert_eq!(json_repo_folder("osl.json"), "");
        assert_eq!(json_repo_folder("season/2024/osl.json"), "season/2024");
    }

    #[test]
    fn test_repo_full_path_prefixes_when_needed() {
        assert_eq!(
            repo_full_path("season/2024", "videos/a.mp4"),
            "season/2024/videos/a.mp4"
        );
        assert_eq!(
            repo_full_path("season/2024", "season/2024/videos/a.mp4"),
            "season/2024/videos/a.mp4"
        );
        assert_eq!(repo_full_path("", "/videos/a.mp4"), "videos/a.mp4");
    }

    #[test]
    fn test_human_size_units() {
        assert_eq!(human_size(0), "0.0 B");
        assert_eq!(human_size(512), "512.0 B");
        assert_eq!(human_size(2048), "2.0 KB");
        assert_eq!(human_size(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(human_size(3 * 1024 * 1024 * 1024), "3.0 GB");
        assert_eq!(human_size(1024_u64.pow(4)), "1.0 TB");
        assert_eq!(human_size(1024_u64.pow(5)), "1.0 PB");
    }
}
