// SYNOID Storyboard Generation
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use super::scoring::strategy_for;
use super::segmenter::{estimate_duration, AlignedFragment, Segmentation, Segmenter};
use super::selector::Selector;
use super::types::{ClipRecord, SelectionRecord};
use crate::catalog::ClipCatalog;
use crate::config::StoryboardConfig;
use crate::errors::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// What the caller hands in: a plain script, or fragments already aligned
/// to the narration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ScriptInput {
    Plain {
        script: String,
        /// Narration length in seconds; estimated from the word count when absent.
        #[serde(default)]
        duration: Option<f64>,
    },
    Aligned {
        fragments: Vec<AlignedFragment>,
        #[serde(default)]
        duration: Option<f64>,
    },
}

/// A generated, not yet confirmed, shot list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Storyboard {
    pub title: String,
    /// Narration length the blocks were laid out against, in seconds.
    pub duration: f64,
    /// Slot width the blocks were cut with; exports place clips on it.
    #[serde(default = "default_slot_seconds")]
    pub slot_seconds: f64,
    pub generated_at: DateTime<Utc>,
    pub selections: Vec<SelectionRecord>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

fn default_slot_seconds() -> f64 {
    StoryboardConfig::default().slot_seconds
}

impl Storyboard {
    /// Distinct clip ids in first-use order.
    pub fn clip_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::with_capacity(self.selections.len());
        for record in &self.selections {
            if !ids.contains(&record.clip.id) {
                ids.push(record.clip.id.clone());
            }
        }
        ids
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

pub struct StoryboardEngine {
    config: StoryboardConfig,
    segmenter: Segmenter,
    selector: Selector,
}

impl StoryboardEngine {
    pub fn new(config: StoryboardConfig) -> Self {
        let segmenter = Segmenter::new(config.slot_seconds, config.min_keyword_len)
            .with_max_blocks(config.max_blocks);
        let selector = Selector::new(
            strategy_for(config.scoring, &config.weights),
            Segmenter::new(config.slot_seconds, config.min_keyword_len),
            config.recency_window,
        );
        Self {
            config,
            segmenter,
            selector,
        }
    }

    pub fn config(&self) -> &StoryboardConfig {
        &self.config
    }

    /// Blocks for `input`, plus the narration duration they were cut against.
    pub fn segment(&self, input: &ScriptInput) -> Result<(Segmentation, f64)> {
        match input {
            ScriptInput::Plain { script, duration } => {
                let duration = duration
                    .filter(|d| d.is_finite() && *d > 0.0)
                    .unwrap_or_else(|| estimate_duration(script, self.config.speech_rate_wps));
                Ok((self.segmenter.by_duration(script, duration)?, duration))
            }
            ScriptInput::Aligned {
                fragments,
                duration,
            } => {
                let segmentation = self.segmenter.from_fragments(fragments)?;
                let duration = duration.filter(|d| d.is_finite() && *d > 0.0).unwrap_or_else(|| {
                    segmentation.blocks.len() as f64 * self.config.slot_seconds
                });
                Ok((segmentation, duration))
            }
        }
    }

    /// Segment and select against an in-memory catalog snapshot.
    pub fn plan(&self, title: &str, input: &ScriptInput, catalog: &[ClipRecord]) -> Result<Storyboard> {
        let (segmentation, duration) = self.segment(input)?;
        let mut session = self.selector.begin_session(catalog);
        let selections = self
            .selector
            .select(&segmentation.blocks, catalog, &mut session)?;

        let warnings: Vec<String> = segmentation.warnings.iter().map(|w| w.to_string()).collect();
        for warning in &warnings {
            warn!("[SELECT] '{}': {}", title, warning);
        }

        Ok(Storyboard {
            title: title.to_string(),
            duration,
            slot_seconds: self.config.slot_seconds,
            generated_at: Utc::now(),
            selections,
            warnings,
        })
    }

    /// Read the catalog once, then plan.
    pub async fn generate(
        &self,
        title: &str,
        input: &ScriptInput,
        catalog: &dyn ClipCatalog,
    ) -> Result<Storyboard> {
        let snapshot = catalog.list_clips().await?;
        info!(
            "[SELECT] Generating '{}' against {} clips",
            title,
            snapshot.len()
        );
        self.plan(title, input, &snapshot)
    }
}
