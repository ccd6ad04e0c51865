// SYNOID Clip Catalog - Local JSON Library
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use super::{ClipCatalog, ClipRow};
use crate::engine::types::ClipRecord;
use crate::errors::{Result, StoryboardError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// A library kept as a JSON array of rows on disk. A missing file is an empty library.
pub struct JsonFileCatalog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn read_rows(&self) -> Result<Vec<ClipRow>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(data) if data.trim().is_empty() => Ok(Vec::new()),
            Ok(data) => Ok(serde_json::from_str(&data)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("[CATALOG] No library at {:?}, starting empty", self.path);
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn write_rows(&self, rows: &[ClipRow]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let data = serde_json::to_string_pretty(rows)?;
        // Write to a sibling then rename so readers never see half a file.
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, data).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl ClipCatalog for JsonFileCatalog {
    async fn list_clips(&self) -> Result<Vec<ClipRecord>> {
        let rows = self.read_rows().await?;
        info!("[CATALOG] Loaded {} clips from {:?}", rows.len(), self.path);
        Ok(rows.into_iter().map(ClipRow::normalize).collect())
    }

    async fn touch_clip(&self, id: &str, at: DateTime<Utc>) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut rows = self.read_rows().await?;
        match rows.iter_mut().find(|r| r.file_id == id) {
            Some(row) => row.last_used_at = Some(at.to_rfc3339()),
            None => {
                return Err(StoryboardError::ExternalStoreUnavailable(format!(
                    "clip '{}' not found in {:?}",
                    id, self.path
                )))
            }
        }
        self.write_rows(&rows).await
    }

    async fn upsert_clip(&self, clip: &ClipRecord) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut rows = self.read_rows().await?;
        let row = ClipRow::from(clip);
        match rows.iter_mut().find(|r| r.file_id == clip.id) {
            Some(existing) => *existing = row,
            None => rows.push(row),
        }
        self.write_rows(&rows).await
    }
}
