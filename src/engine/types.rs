// SYNOID Storyboard Types
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// One time-bounded slice of the narration, mapped to exactly one clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptBlock {
    /// `MM:SS` position on the timeline.
    pub time_label: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_theme: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_elements: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_emotion: Option<String>,
}

impl ScriptBlock {
    pub fn new(time_label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            time_label: time_label.into(),
            text: text.into(),
            visual_theme: None,
            key_elements: Vec::new(),
            target_emotion: None,
        }
    }

    /// Text shortened for tabular display.
    pub fn preview(&self) -> String {
        const MAX: usize = 75;
        if self.text.chars().count() > MAX {
            let cut: String = self.text.chars().take(MAX).collect();
            format!("{}...", cut)
        } else {
            self.text.clone()
        }
    }
}

/// A clip as read from the library, already normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipRecord {
    pub id: String,
    pub file_name: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub last_used_at: Option<DateTime<Utc>>,
}

impl ClipRecord {
    pub fn new(id: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            file_name: file_name.into(),
            tags: BTreeSet::new(),
            action: None,
            emotion: None,
            description: None,
            last_used_at: None,
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags = tags
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        self
    }

    pub fn with_last_used(mut self, at: DateTime<Utc>) -> Self {
        self.last_used_at = Some(at);
        self
    }
}

/// Which step of the selection chain produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionReason {
    /// Best scoring candidate.
    Matched,
    /// No match; oldest eligible candidate.
    OldestCandidate,
    /// Every candidate exhausted; oldest clip not yet used this session, even if recent.
    RecentFallback,
    /// The whole library is used up; the oldest clip repeats.
    ForcedRepeat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionRecord {
    /// Slot position; the block starts at `index * slot_seconds`.
    pub index: usize,
    pub block: ScriptBlock,
    pub clip: ClipRecord,
    pub match_score: f64,
    pub reason: SelectionReason,
}

/// Per-run bookkeeping threaded through the selector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub recent_ids: HashSet<String>,
    pub session_used_ids: Vec<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_recent(&self, id: &str) -> bool {
        self.recent_ids.contains(id)
    }

    pub fn is_used(&self, id: &str) -> bool {
        self.session_used_ids.iter().any(|u| u == id)
    }

    pub fn mark_used(&mut self, id: &str) {
        self.session_used_ids.push(id.to_string());
    }
}

/// Format whole seconds as `MM:SS`.
pub fn format_time_label(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Parse `MM:SS` or `HH:MM:SS` (fractional seconds allowed) into seconds.
pub fn parse_time_label(label: &str) -> Option<f64> {
    let parts: Vec<&str> = label.trim().split(':').collect();
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }
    let mut total = 0.0;
    for part in &parts {
        let value: f64 = part.trim().parse().ok()?;
        if value < 0.0 {
            return None;
        }
        total = total * 60.0 + value;
    }
    Some(total)
}
