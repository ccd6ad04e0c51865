// SYNOID Library Indexer
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Walks a footage folder and registers every video with tags derived from
// its file name. Clips already in the library keep their usage history.

use super::ClipCatalog;
use crate::engine::segmenter::extract_keywords;
use crate::engine::types::ClipRecord;
use crate::errors::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "mkv", "avi", "webm"];

#[derive(Debug, Default, Clone, PartialEq)]
pub struct IndexReport {
    pub added: usize,
    pub updated: usize,
}

fn is_video(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| VIDEO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Video files under `root`, sorted for a stable order.
pub fn scan_videos(root: &Path) -> Vec<PathBuf> {
    let mut videos: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(e) => {
                warn!("[INDEX] Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|e| e.file_type().is_file() && is_video(e.path()))
        .map(|e| e.into_path())
        .collect();
    videos.sort();
    videos
}

/// Build a clip for `path`. The id is the path relative to `root` with forward slashes.
pub fn clip_for(root: &Path, path: &Path, min_keyword_len: usize) -> ClipRecord {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let id = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| id.clone());
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().replace(['_', '-'], " "))
        .unwrap_or_default();

    ClipRecord::new(id, file_name).with_tags(extract_keywords(&stem, min_keyword_len))
}

pub async fn index_directory(
    catalog: &dyn ClipCatalog,
    root: &Path,
    min_keyword_len: usize,
) -> Result<IndexReport> {
    let existing: HashMap<String, ClipRecord> = catalog
        .list_clips()
        .await?
        .into_iter()
        .map(|c| (c.id.clone(), c))
        .collect();

    let mut report = IndexReport::default();
    for path in scan_videos(root) {
        let mut clip = clip_for(root, &path, min_keyword_len);
        match existing.get(&clip.id) {
            Some(known) => {
                // Tags merge; semantic fields and usage history stay as stored.
                clip.tags.extend(known.tags.iter().cloned());
                clip.action = known.action.clone();
                clip.emotion = known.emotion.clone();
                clip.description = known.description.clone();
                clip.last_used_at = known.last_used_at;
                report.updated += 1;
            }
            None => report.added += 1,
        }
        catalog.upsert_clip(&clip).await?;
    }

    info!(
        "[INDEX] {:?}: {} new clips, {} refreshed",
        root, report.added, report.updated
    );
    Ok(report)
}
