// SYNOID Clip Catalog - In-Memory Library
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use super::ClipCatalog;
use crate::engine::types::ClipRecord;
use crate::errors::{Result, StoryboardError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tokio::sync::Mutex;

/// Library held in memory. Ids listed in `failing` reject writes, which lets
/// callers exercise partial-failure paths.
#[derive(Default)]
pub struct MemoryCatalog {
    clips: Mutex<Vec<ClipRecord>>,
    failing: Mutex<HashSet<String>>,
}

impl MemoryCatalog {
    pub fn new(clips: Vec<ClipRecord>) -> Self {
        Self {
            clips: Mutex::new(clips),
            failing: Mutex::new(HashSet::new()),
        }
    }

    pub async fn fail_writes_for(&self, id: &str) {
        self.failing.lock().await.insert(id.to_string());
    }

    pub async fn heal(&self, id: &str) {
        self.failing.lock().await.remove(id);
    }
}

#[async_trait]
impl ClipCatalog for MemoryCatalog {
    async fn list_clips(&self) -> Result<Vec<ClipRecord>> {
        Ok(self.clips.lock().await.clone())
    }

    async fn touch_clip(&self, id: &str, at: DateTime<Utc>) -> Result<()> {
        if self.failing.lock().await.contains(id) {
            return Err(StoryboardError::ExternalStoreUnavailable(format!(
                "write rejected for '{}'",
                id
            )));
        }
        let mut clips = self.clips.lock().await;
        match clips.iter_mut().find(|c| c.id == id) {
            Some(clip) => {
                clip.last_used_at = Some(at);
                Ok(())
            }
            None => Err(StoryboardError::ExternalStoreUnavailable(format!(
                "clip '{}' not found",
                id
            ))),
        }
    }

    async fn upsert_clip(&self, clip: &ClipRecord) -> Result<()> {
        let mut clips = self.clips.lock().await;
        match clips.iter_mut().find(|c| c.id == clip.id) {
            Some(existing) => *existing = clip.clone(),
            None => clips.push(clip.clone()),
        }
        Ok(())
    }
}
