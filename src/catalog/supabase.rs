// SYNOID Clip Catalog - Supabase (PostgREST) Library
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Reads and writes the `video_library` table over the PostgREST API.
// Failures are reported, never retried here.

use super::{ClipCatalog, ClipRow};
use crate::engine::types::ClipRecord;
use crate::errors::{Result, StoryboardError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use std::time::Duration;
use tracing::info;
use url::Url;

const TABLE: &str = "video_library";

pub struct SupabaseCatalog {
    client: reqwest::Client,
    table_url: Url,
}

impl SupabaseCatalog {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let table_url = table_url(base_url)?;

        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(api_key).map_err(|e| unavailable(e.to_string()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|e| unavailable(e.to_string()))?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { client, table_url })
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(unavailable(format!("{} {}", status, body.trim())))
    }
}

#[async_trait]
impl ClipCatalog for SupabaseCatalog {
    async fn list_clips(&self) -> Result<Vec<ClipRecord>> {
        let response = self
            .client
            .get(self.table_url.clone())
            .query(&[("select", "*"), ("order", "last_used_at.asc.nullsfirst")])
            .send()
            .await?;
        let rows: Vec<ClipRow> = Self::check(response).await?.json().await?;
        info!("[CATALOG] Fetched {} clips from Supabase", rows.len());
        Ok(rows.into_iter().map(ClipRow::normalize).collect())
    }

    /// PostgREST answers 2xx even when the filter matches nothing, so the
    /// updated rows are echoed back and an empty echo counts as a failure.
    async fn touch_clip(&self, id: &str, at: DateTime<Utc>) -> Result<()> {
        let filter = format!("eq.{}", id);
        let response = self
            .client
            .patch(self.table_url.clone())
            .query(&[("file_id", filter.as_str())])
            .header("Prefer", "return=representation")
            .json(&serde_json::json!({ "last_used_at": at.to_rfc3339() }))
            .send()
            .await?;
        let rows: Vec<serde_json::Value> = Self::check(response).await?.json().await?;
        if rows.is_empty() {
            return Err(unavailable(format!("clip '{}' not found", id)));
        }
        Ok(())
    }

    async fn upsert_clip(&self, clip: &ClipRecord) -> Result<()> {
        let response = self
            .client
            .post(self.table_url.clone())
            .query(&[("on_conflict", "file_id")])
            .header("Prefer", "resolution=merge-duplicates")
            .json(&[ClipRow::from(clip)])
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

fn table_url(base_url: &str) -> Result<Url> {
    let mut base = base_url.trim().to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    Url::parse(&base)
        .and_then(|u| u.join(&format!("rest/v1/{}", TABLE)))
        .map_err(|e| unavailable(format!("invalid Supabase URL '{}': {}", base_url, e)))
}

fn unavailable(reason: String) -> StoryboardError {
    StoryboardError::ExternalStoreUnavailable(reason)
}
