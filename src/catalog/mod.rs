// SYNOID Clip Catalog
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Boundary to the external clip library. Rows are normalized once here so
// the selector never sees placeholder strings or mixed-case tags.

pub mod indexer;
pub mod json_file;
pub mod memory;
pub mod supabase;

pub use indexer::{index_directory, IndexReport, VIDEO_EXTENSIONS};
pub use json_file::JsonFileCatalog;
pub use memory::MemoryCatalog;
pub use supabase::SupabaseCatalog;

use crate::config::Environment;
use crate::engine::types::ClipRecord;
use crate::errors::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::info;

#[async_trait]
pub trait ClipCatalog: Send + Sync {
    /// Full snapshot of the library.
    async fn list_clips(&self) -> Result<Vec<ClipRecord>>;

    /// Set `last_used_at` for a single clip.
    async fn touch_clip(&self, id: &str, at: DateTime<Utc>) -> Result<()>;

    /// Insert or replace a clip, keyed by id.
    async fn upsert_clip(&self, clip: &ClipRecord) -> Result<()>;
}

/// Supabase when both credentials are set, otherwise the local JSON library.
pub fn open(env: &Environment) -> Result<Arc<dyn ClipCatalog>> {
    match env.remote_store() {
        Some((url, key)) => {
            info!("[CATALOG] Using Supabase library at {}", url);
            Ok(Arc::new(SupabaseCatalog::new(url, key)?))
        }
        None => {
            info!("[CATALOG] Using local library {:?}", env.library_path);
            Ok(Arc::new(JsonFileCatalog::new(env.library_path.clone())))
        }
    }
}

/// A library row as stored. Everything beyond the id is loosely typed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClipRow {
    pub file_id: String,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub tags: Value,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub emotion: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub last_used_at: Option<String>,
}

impl ClipRow {
    pub fn normalize(self) -> ClipRecord {
        let file_name = normalize_text(self.file_name.as_deref()).unwrap_or_else(|| self.file_id.clone());
        ClipRecord {
            id: self.file_id,
            file_name,
            tags: normalize_tags(&self.tags),
            action: normalize_text(self.action.as_deref()),
            emotion: normalize_text(self.emotion.as_deref()),
            description: normalize_text(self.description.as_deref()),
            last_used_at: normalize_text(self.last_used_at.as_deref()).and_then(|v| parse_timestamp(&v)),
        }
    }
}

impl From<&ClipRecord> for ClipRow {
    fn from(clip: &ClipRecord) -> Self {
        Self {
            file_id: clip.id.clone(),
            file_name: Some(clip.file_name.clone()),
            tags: Value::Array(clip.tags.iter().cloned().map(Value::String).collect()),
            action: clip.action.clone(),
            emotion: clip.emotion.clone(),
            description: clip.description.clone(),
            last_used_at: clip.last_used_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Empty strings and the placeholder spellings `None`/`null` are absent.
pub fn normalize_text(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") || trimmed.eq_ignore_ascii_case("null") {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Tags arrive as a JSON array or a comma separated string.
pub fn normalize_tags(value: &Value) -> BTreeSet<String> {
    let raw: Vec<String> = match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        Value::String(s) => s.split(',').map(str::to_string).collect(),
        _ => Vec::new(),
    };
    raw.iter()
        .filter_map(|t| normalize_text(Some(t.as_str())))
        .map(|t| t.to_lowercase())
        .collect()
}

/// RFC 3339, or the naive ISO form some stores write without an offset (read as UTC).
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(value) {
        return Some(t.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Never-used clips first, then by ascending `last_used_at`. Ties keep catalog order.
pub fn oldest_first(catalog: &[ClipRecord]) -> Vec<&ClipRecord> {
    let mut pool: Vec<&ClipRecord> = catalog.iter().collect();
    pool.sort_by(|a, b| match (a.last_used_at, b.last_used_at) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => x.cmp(&y),
    });
    pool
}

/// Newest first; never-used clips are not part of the listing.
pub fn most_recent(catalog: &[ClipRecord], limit: usize) -> Vec<&ClipRecord> {
    let mut used: Vec<&ClipRecord> = catalog.iter().filter(|c| c.last_used_at.is_some()).collect();
    used.sort_by(|a, b| b.last_used_at.cmp(&a.last_used_at));
    used.truncate(limit);
    used
}

pub fn most_recent_ids(catalog: &[ClipRecord], window: usize) -> HashSet<String> {
    most_recent(catalog, window)
        .into_iter()
        .map(|c| c.id.clone())
        .collect()
}

/// Library listing for display: most recently used first, never-used last.
pub fn by_recency(catalog: &[ClipRecord]) -> Vec<&ClipRecord> {
    let mut listing = oldest_first(catalog);
    listing.reverse();
    listing
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_row_normalization() {
        let row: ClipRow = serde_json::from_value(json!({
            "file_id": "abc",
            "file_name": "sunrise.mp4",
            "tags": ["Faith", " hope ", "None", ""],
            "action": "None",
            "emotion": "",
            "description": "Woman walking",
            "last_used_at": "2024-03-01T10:00:00.123456"
        }))
        .unwrap();

        let clip = row.normalize();
        assert_eq!(clip.id, "abc");
        assert_eq!(clip.tags.iter().collect::<Vec<_>>(), vec!["faith", "hope"]);
        assert_eq!(clip.action, None);
        assert_eq!(clip.emotion, None);
        assert_eq!(clip.description.as_deref(), Some("Woman walking"));
        assert!(clip.last_used_at.is_some());
    }

    #[test]
    fn test_comma_tags_and_null_fields() {
        let row: ClipRow = serde_json::from_value(json!({
            "file_id": "x",
            "tags": "Sea, Storm",
            "last_used_at": null
        }))
        .unwrap();
        let clip = row.normalize();
        assert_eq!(clip.file_name, "x");
        assert!(clip.tags.contains("sea") && clip.tags.contains("storm"));
        assert_eq!(clip.last_used_at, None);
    }

    #[test]
    fn test_ordering_helpers() {
        let t = |y| Utc.with_ymd_and_hms(y, 1, 1, 0, 0, 0).unwrap();
        let catalog = vec![
            ClipRecord::new("b", "b").with_last_used(t(2024)),
            ClipRecord::new("n1", "n1"),
            ClipRecord::new("c", "c").with_last_used(t(2023)),
            ClipRecord::new("n2", "n2"),
        ];

        let ids = |v: Vec<&ClipRecord>| v.iter().map(|c| c.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(oldest_first(&catalog)), vec!["n1", "n2", "c", "b"]);
        assert_eq!(ids(most_recent(&catalog, 5)), vec!["b", "c"]);
        assert_eq!(ids(most_recent(&catalog, 1)), vec!["b"]);
        assert_eq!(ids(by_recency(&catalog)), vec!["b", "c", "n2", "n1"]);
        assert!(most_recent_ids(&catalog, 0).is_empty());
    }

    #[tokio::test]
    async fn test_open_falls_back_to_local_library() {
        let dir = tempfile::tempdir().unwrap();
        let env = Environment {
            supabase_url: Some("https://demo.supabase.co".to_string()),
            supabase_key: None,
            library_path: dir.path().join("library.json"),
            asset_dir: dir.path().to_path_buf(),
        };
        let catalog = open(&env).unwrap();
        assert!(catalog.list_clips().await.unwrap().is_empty());
    }
}
