// SYNOID Storyboard Assets
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Resolves selected clips to local files with a known duration. Exports
// skip any block whose asset cannot be resolved; nothing is guessed.

use crate::engine::types::{ClipRecord, SelectionRecord};
use crate::errors::StoryboardError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{error, info};

/// A clip (or narration track) available on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAsset {
    pub path: PathBuf,
    pub duration: f64,
}

impl ResolvedAsset {
    pub fn new(path: impl Into<PathBuf>, duration: f64) -> Self {
        Self {
            path: path.into(),
            duration,
        }
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

#[async_trait]
pub trait AssetResolver: Send + Sync {
    async fn resolve(&self, clip: &ClipRecord) -> Result<ResolvedAsset, String>;
}

/// Footage stored under a root folder, addressed by clip id (relative path)
/// or, failing that, by file name.
pub struct LocalAssetLibrary {
    root: PathBuf,
}

impl LocalAssetLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl AssetResolver for LocalAssetLibrary {
    async fn resolve(&self, clip: &ClipRecord) -> Result<ResolvedAsset, String> {
        let by_id = self.root.join(&clip.id);
        let path = if by_id.is_file() {
            by_id
        } else {
            self.root.join(&clip.file_name)
        };
        if !path.is_file() {
            return Err(format!("{:?} does not exist", path));
        }
        let duration = probe_duration(&path).await?;
        Ok(ResolvedAsset { path, duration })
    }
}

/// Media duration in seconds via ffprobe.
pub async fn probe_duration(path: &Path) -> Result<f64, String> {
    let output = tokio::time::timeout(
        tokio::time::Duration::from_secs(10),
        Command::new("ffprobe")
            .kill_on_drop(true)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(path)
            .output(),
    )
    .await
    .map_err(|_| "ffprobe duration check timed out".to_string())?
    .map_err(|e| format!("ffprobe failed to start: {}", e))?;

    let duration: f64 = String::from_utf8_lossy(&output.stdout)
        .trim()
        .parse()
        .map_err(|_| "Failed to parse duration from ffprobe output".to_string())?;
    if !duration.is_finite() || duration <= 0.0 {
        return Err(format!("ffprobe reported unusable duration {}", duration));
    }
    Ok(duration)
}

/// Resolve every selection, in order. Failures are logged with the block
/// index and come back as `None`.
pub async fn resolve_selections(
    selections: &[SelectionRecord],
    resolver: &dyn AssetResolver,
) -> Vec<Option<ResolvedAsset>> {
    let mut resolved = Vec::with_capacity(selections.len());
    for record in selections {
        match resolver.resolve(&record.clip).await {
            Ok(asset) => resolved.push(Some(asset)),
            Err(reason) => {
                let failure = StoryboardError::AssetResolutionFailed {
                    index: record.index,
                    clip_id: record.clip.id.clone(),
                    reason,
                };
                error!("[ASSETS] {}", failure);
                resolved.push(None);
            }
        }
    }
    let ok = resolved.iter().filter(|a| a.is_some()).count();
    info!("[ASSETS] Resolved {}/{} clips", ok, selections.len());
    resolved
}
