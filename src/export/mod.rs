// SYNOID Storyboard Export
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Turns a confirmed selection list into editor-facing artifacts. Every
// format shares the same placement math: slot i starts at i * slot width
// and lasts min(clip duration, slot width).

pub mod archive;
pub mod draft;
pub mod transcript;
pub mod xmeml;

use crate::assets::ResolvedAsset;
use crate::engine::types::SelectionRecord;
use serde::Serialize;

/// One video on the timeline, already trimmed to its slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placement {
    pub index: usize,
    pub time_label: String,
    pub clip_id: String,
    pub file_name: String,
    #[serde(skip)]
    pub asset: ResolvedAsset,
    /// Seconds from timeline start.
    pub start: f64,
    /// Seconds on the timeline (and trimmed from the source start).
    pub duration: f64,
}

impl Placement {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// Placements plus the narration track they sit on.
#[derive(Debug, Clone)]
pub struct Timeline {
    pub title: String,
    pub slot_seconds: f64,
    pub narration: ResolvedAsset,
    pub placements: Vec<Placement>,
}

impl Timeline {
    /// `assets[i]` belongs to `selections[i]`; unresolved entries are skipped
    /// without shifting the remaining slots.
    pub fn build(
        title: &str,
        selections: &[SelectionRecord],
        assets: &[Option<ResolvedAsset>],
        narration: ResolvedAsset,
        slot_seconds: f64,
    ) -> Self {
        let placements = selections
            .iter()
            .zip(assets.iter())
            .filter_map(|(record, asset)| {
                let asset = asset.as_ref()?;
                Some(Placement {
                    index: record.index,
                    time_label: record.block.time_label.clone(),
                    clip_id: record.clip.id.clone(),
                    file_name: record.clip.file_name.clone(),
                    asset: asset.clone(),
                    start: record.index as f64 * slot_seconds,
                    duration: asset.duration.min(slot_seconds).max(0.0),
                })
            })
            .collect();

        Self {
            title: title.to_string(),
            slot_seconds,
            narration,
            placements,
        }
    }

    /// Narration length, or the end of the last clip if that runs longer.
    pub fn total_duration(&self) -> f64 {
        self.placements
            .iter()
            .map(Placement::end)
            .fold(self.narration.duration, f64::max)
    }
}

pub fn to_micros(seconds: f64) -> i64 {
    (seconds * 1_000_000.0).round() as i64
}

pub fn to_frames(seconds: f64, fps: u32) -> i64 {
    (seconds * fps as f64).round() as i64
}

/// Lowercase title with spaces turned into underscores, for file names.
pub fn slugify(title: &str) -> String {
    let slug = title.trim().to_lowercase().replace(' ', "_");
    let slug: String = slug
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
        .collect();
    if slug.is_empty() {
        "storyboard".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::{ClipRecord, ScriptBlock, SelectionReason};

    fn record(index: usize, id: &str) -> SelectionRecord {
        SelectionRecord {
            index,
            block: ScriptBlock::new(format!("00:{:02}", index * 10), "text"),
            clip: ClipRecord::new(id, format!("{}.mp4", id)),
            match_score: 0.0,
            reason: SelectionReason::OldestCandidate,
        }
    }

    #[test]
    fn test_slot_math_survives_gaps() {
        let selections = vec![record(0, "a"), record(1, "b"), record(2, "c")];
        let assets = vec![
            Some(ResolvedAsset::new("a.mp4", 25.0)),
            None,
            Some(ResolvedAsset::new("c.mp4", 4.5)),
        ];
        let timeline = Timeline::build(
            "Demo",
            &selections,
            &assets,
            ResolvedAsset::new("voice.mp3", 28.0),
            10.0,
        );

        assert_eq!(timeline.placements.len(), 2);
        assert_eq!(timeline.placements[0].start, 0.0);
        assert_eq!(timeline.placements[0].duration, 10.0);
        assert_eq!(timeline.placements[1].index, 2);
        assert_eq!(timeline.placements[1].start, 20.0);
        assert_eq!(timeline.placements[1].duration, 4.5);
        assert_eq!(timeline.total_duration(), 28.0);
    }

    #[test]
    fn test_unit_conversions_round_trip() {
        for (i, d) in [(0usize, 3.337), (1, 10.0), (7, 12.5), (3, 0.04)] {
            let start = i as f64 * 10.0;
            let dur = f64::min(d, 10.0);
            assert!((to_micros(start) as f64 / 1e6 - start).abs() < 1e-6);
            assert!((to_micros(dur) as f64 / 1e6 - dur).abs() < 1e-6);
            assert!((to_frames(dur, 30) as f64 / 30.0 - dur).abs() <= 0.5 / 30.0);
        }
        assert_eq!(to_micros(1.5), 1_500_000);
        assert_eq!(to_frames(10.0, 30), 300);
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Nova Montagem"), "nova_montagem");
        assert_eq!(slugify("  "), "storyboard");
        assert_eq!(slugify("A/B: test"), "ab_test");
    }
}
