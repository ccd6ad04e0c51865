// SYNOID Usage Recorder
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Stamps `last_used_at` on confirmed clips so the next run rotates away
// from them. Every id is written on its own; a failure never undoes the
// ids that already succeeded.

use crate::catalog::ClipCatalog;
use crate::engine::storyboard::Storyboard;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageFailure {
    pub id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageReport {
    pub updated: Vec<String>,
    pub failed: Vec<UsageFailure>,
}

impl UsageReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Ids to hand back to `record_usage` for a retry.
    pub fn failed_ids(&self) -> Vec<String> {
        self.failed.iter().map(|f| f.id.clone()).collect()
    }
}

/// Write `at` as the last use of every id in `ids`.
pub async fn record_usage(
    catalog: &dyn ClipCatalog,
    ids: &[String],
    at: DateTime<Utc>,
) -> UsageReport {
    let mut report = UsageReport::default();
    for id in ids {
        match catalog.touch_clip(id, at).await {
            Ok(()) => report.updated.push(id.clone()),
            Err(e) => {
                error!("[USAGE] Could not record use of '{}': {}", id, e);
                report.failed.push(UsageFailure {
                    id: id.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }
    info!(
        "[USAGE] Recorded {} clips ({} failed)",
        report.updated.len(),
        report.failed.len()
    );
    report
}

/// Accept a storyboard: record its clips as used now. The storyboard is
/// consumed; a new run starts from a fresh catalog read.
pub async fn confirm(catalog: &dyn ClipCatalog, storyboard: Storyboard) -> UsageReport {
    info!(
        "[USAGE] Confirming '{}' ({} blocks)",
        storyboard.title,
        storyboard.selections.len()
    );
    record_usage(catalog, &storyboard.clip_ids(), Utc::now()).await
}
