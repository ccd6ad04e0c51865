// SYNOID Storyboard Export - Editor Draft Project
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Writes a draft folder holding `draft_meta_info.json` and
// `draft_content.json`. All times are integer microseconds.

use super::{to_micros, Placement, Timeline};
use crate::errors::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

pub const META_FILE: &str = "draft_meta_info.json";
pub const CONTENT_FILE: &str = "draft_content.json";

const DRAFT_VERSION: u32 = 360000;
const DRAFT_APP_VERSION: &str = "5.9.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftMeta {
    pub draft_id: String,
    pub draft_name: String,
    pub draft_root_path: String,
    pub draft_fold_path: String,
    pub tm_draft_create: i64,
    pub tm_draft_modified: i64,
    pub tm_duration: i64,
    pub draft_materials: Vec<MaterialGroup>,
    pub draft_type: String,
    pub draft_new_version: String,
    pub draft_is_invisible: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialGroup {
    #[serde(rename = "type")]
    pub group_type: u32,
    pub value: Vec<MetaMaterial>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaMaterial {
    pub id: String,
    pub file_path: String,
    pub extra_info: String,
    pub metetype: String,
    pub duration: i64,
    pub create_time: i64,
    pub import_time: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftContent {
    pub id: String,
    pub name: String,
    pub version: u32,
    pub new_version: String,
    pub fps: f64,
    pub duration: i64,
    pub canvas_config: CanvasConfig,
    pub materials: Materials,
    pub tracks: Vec<Track>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    pub ratio: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Materials {
    pub videos: Vec<MediaMaterial>,
    pub audios: Vec<MediaMaterial>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaMaterial {
    pub id: String,
    pub path: String,
    pub material_name: String,
    pub duration: i64,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub id: String,
    pub material_id: String,
    pub target_timerange: TimeRange,
    pub source_timerange: TimeRange,
    pub speed: f64,
    pub volume: f64,
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: i64,
    pub duration: i64,
}

fn new_id() -> String {
    Uuid::new_v4().to_string().to_uppercase()
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

/// Both draft documents for `timeline`, rooted at `draft_dir`.
pub fn build(timeline: &Timeline, draft_dir: &Path, fps: u32) -> (DraftMeta, DraftContent) {
    let now = Utc::now();
    let now_us = now.timestamp_micros();
    let now_s = now.timestamp();
    let total_us = to_micros(timeline.total_duration());

    let mut materials = Materials::default();
    let mut meta_videos = Vec::new();
    let mut video_segments = Vec::new();

    for placement in &timeline.placements {
        let material = video_material(placement);
        video_segments.push(segment(&material.id, placement.start, placement.duration));
        meta_videos.push(MetaMaterial {
            id: material.id.clone(),
            file_path: material.path.clone(),
            extra_info: placement.file_name.clone(),
            metetype: "video".to_string(),
            duration: material.duration,
            create_time: now_s,
            import_time: now_s,
        });
        materials.videos.push(material);
    }

    let narration = MediaMaterial {
        id: new_id(),
        path: path_string(&timeline.narration.path),
        material_name: timeline.narration.file_name(),
        duration: to_micros(timeline.narration.duration),
        kind: "extract_music".to_string(),
    };
    let audio_segment = segment(&narration.id, 0.0, timeline.narration.duration);
    let meta_audio = MetaMaterial {
        id: narration.id.clone(),
        file_path: narration.path.clone(),
        extra_info: narration.material_name.clone(),
        metetype: "music".to_string(),
        duration: narration.duration,
        create_time: now_s,
        import_time: now_s,
    };
    materials.audios.push(narration);

    let content = DraftContent {
        id: new_id(),
        name: timeline.title.clone(),
        version: DRAFT_VERSION,
        new_version: DRAFT_APP_VERSION.to_string(),
        fps: fps as f64,
        duration: total_us,
        canvas_config: CanvasConfig {
            width: 1920,
            height: 1080,
            ratio: "original".to_string(),
        },
        materials,
        tracks: vec![
            Track {
                id: new_id(),
                kind: "video".to_string(),
                segments: video_segments,
            },
            Track {
                id: new_id(),
                kind: "audio".to_string(),
                segments: vec![audio_segment],
            },
        ],
    };

    let root = draft_dir.parent().unwrap_or(draft_dir);
    let mut all_meta = meta_videos;
    all_meta.push(meta_audio);
    let meta = DraftMeta {
        draft_id: new_id(),
        draft_name: timeline.title.clone(),
        draft_root_path: path_string(root),
        draft_fold_path: path_string(draft_dir),
        tm_draft_create: now_us,
        tm_draft_modified: now_us,
        tm_duration: total_us,
        draft_materials: vec![MaterialGroup {
            group_type: 0,
            value: all_meta,
        }],
        draft_type: String::new(),
        draft_new_version: DRAFT_APP_VERSION.to_string(),
        draft_is_invisible: false,
    };

    (meta, content)
}

fn video_material(placement: &Placement) -> MediaMaterial {
    MediaMaterial {
        id: new_id(),
        path: path_string(&placement.asset.path),
        material_name: placement.file_name.clone(),
        duration: to_micros(placement.asset.duration),
        kind: "video".to_string(),
    }
}

fn segment(material_id: &str, start: f64, duration: f64) -> Segment {
    let duration = to_micros(duration);
    Segment {
        id: new_id(),
        material_id: material_id.to_string(),
        target_timerange: TimeRange {
            start: to_micros(start),
            duration,
        },
        source_timerange: TimeRange { start: 0, duration },
        speed: 1.0,
        volume: 1.0,
        visible: true,
    }
}

/// Write both documents into `draft_dir`, creating it if needed.
pub fn write(timeline: &Timeline, draft_dir: &Path, fps: u32) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(draft_dir)?;
    let (meta, content) = build(timeline, draft_dir, fps);

    let meta_path = draft_dir.join(META_FILE);
    let content_path = draft_dir.join(CONTENT_FILE);
    fs::write(&meta_path, serde_json::to_string_pretty(&meta)?)?;
    fs::write(&content_path, serde_json::to_string_pretty(&content)?)?;

    info!(
        "[EXPORT] Draft '{}' written to {:?} ({} clips)",
        timeline.title,
        draft_dir,
        timeline.placements.len()
    );
    Ok(vec![meta_path, content_path])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::ResolvedAsset;
    use crate::engine::types::{ClipRecord, ScriptBlock, SelectionReason, SelectionRecord};

    fn timeline() -> Timeline {
        let selections: Vec<SelectionRecord> = (0..3)
            .map(|i| SelectionRecord {
                index: i,
                block: ScriptBlock::new(format!("00:{}0", i), ""),
                clip: ClipRecord::new(format!("c{}", i), format!("c{}.mp4", i)),
                match_score: 0.0,
                reason: SelectionReason::OldestCandidate,
            })
            .collect();
        let assets = vec![
            Some(ResolvedAsset::new("/v/c0.mp4", 12.0)),
            Some(ResolvedAsset::new("/v/c1.mp4", 3.25)),
            None,
        ];
        Timeline::build(
            "Demo",
            &selections,
            &assets,
            ResolvedAsset::new("/a/voice.mp3", 27.5),
            10.0,
        )
    }

    #[test]
    fn test_segments_in_microseconds() {
        let (meta, content) = build(&timeline(), Path::new("/drafts/demo"), 30);

        let video = &content.tracks[0];
        assert_eq!(video.kind, "video");
        assert_eq!(video.segments.len(), 2);
        assert_eq!(
            video.segments[0].target_timerange,
            TimeRange { start: 0, duration: 10_000_000 }
        );
        assert_eq!(
            video.segments[1].target_timerange,
            TimeRange { start: 10_000_000, duration: 3_250_000 }
        );
        assert_eq!(video.segments[1].source_timerange.start, 0);

        let audio = &content.tracks[1];
        assert_eq!(
            audio.segments[0].target_timerange,
            TimeRange { start: 0, duration: 27_500_000 }
        );
        assert_eq!(content.duration, 27_500_000);
        assert_eq!(meta.tm_duration, 27_500_000);
        assert_eq!(meta.draft_root_path, "/drafts");
        assert_eq!(meta.draft_materials[0].value.len(), 3);
    }

    #[test]
    fn test_segments_reference_materials() {
        let (_, content) = build(&timeline(), Path::new("/drafts/demo"), 30);
        for (segment, material) in content.tracks[0]
            .segments
            .iter()
            .zip(content.materials.videos.iter())
        {
            assert_eq!(segment.material_id, material.id);
        }
        assert_ne!(content.materials.videos[0].id, content.materials.videos[1].id);
    }

    #[test]
    fn test_write_creates_both_documents() {
        let dir = tempfile::tempdir().unwrap();
        let draft_dir = dir.path().join("demo");
        let written = write(&timeline(), &draft_dir, 30).unwrap();
        assert_eq!(written.len(), 2);

        let raw = fs::read_to_string(draft_dir.join(CONTENT_FILE)).unwrap();
        let content: DraftContent = serde_json::from_str(&raw).unwrap();
        assert_eq!(content.name, "Demo");
        assert!(draft_dir.join(META_FILE).exists());
    }
}
