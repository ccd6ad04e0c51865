// SYNOID Storyboard Configuration
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const STRATEGY_FILE: &str = "storyboard_strategy.json";

/// Two hours of narration at the default slot width.
pub const DEFAULT_MAX_BLOCKS: usize = 720;

/// Which matching strategy the selector uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    /// First oldest clip whose tag set intersects the block keywords.
    TagIntersection,
    /// Any keyword contained in tags, action or description.
    Keyword,
    /// Weighted phrase / key element / emotion scoring.
    Weighted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub phrase_weight: f64,
    pub key_element_weight: f64,
    pub emotion_weight: f64,
    pub keyword_weight: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            phrase_weight: 10.0,
            key_element_weight: 3.0,
            emotion_weight: 1.0,
            keyword_weight: 0.5,
        }
    }
}

/// Tunables for segmentation, selection and export.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoryboardConfig {
    /// How many of the most recently used clips are held back.
    pub recency_window: usize,
    /// Width of one timeline slot in seconds.
    pub slot_seconds: f64,
    /// Longest storyboard, in blocks, a single run may produce.
    pub max_blocks: usize,
    pub fps: u32,
    pub min_keyword_len: usize,
    /// Words per second used to estimate narration length from text.
    pub speech_rate_wps: f64,
    pub scoring: ScoringMode,
    pub weights: ScoringWeights,
}

impl Default for StoryboardConfig {
    fn default() -> Self {
        Self {
            recency_window: 5,
            slot_seconds: 10.0,
            max_blocks: DEFAULT_MAX_BLOCKS,
            fps: 30,
            min_keyword_len: 5,
            speech_rate_wps: 2.3,
            scoring: ScoringMode::Keyword,
            weights: ScoringWeights::default(),
        }
    }
}

impl StoryboardConfig {
    pub fn load() -> Self {
        Self::load_from(Path::new(STRATEGY_FILE))
    }

    /// Read a strategy file, falling back to defaults when it is missing or invalid.
    pub fn load_from(path: &Path) -> Self {
        if let Ok(content) = fs::read_to_string(path) {
            match serde_json::from_str::<Self>(&content) {
                Ok(config) => {
                    info!("[CONFIG] Loaded storyboard strategy from {:?}", path);
                    return config.validated();
                }
                Err(e) => warn!("[CONFIG] Ignoring invalid {:?}: {}", path, e),
            }
        }
        info!("[CONFIG] Using default storyboard strategy");
        Self::default()
    }

    /// Replace values the engine cannot work with by their defaults.
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        if !(self.slot_seconds.is_finite() && self.slot_seconds > 0.0) {
            warn!(
                "[CONFIG] slot_seconds {} is unusable, using {}",
                self.slot_seconds, defaults.slot_seconds
            );
            self.slot_seconds = defaults.slot_seconds;
        }
        if self.fps == 0 {
            warn!("[CONFIG] fps 0 is unusable, using {}", defaults.fps);
            self.fps = defaults.fps;
        }
        if self.max_blocks == 0 {
            warn!("[CONFIG] max_blocks 0 is unusable, using {}", defaults.max_blocks);
            self.max_blocks = defaults.max_blocks;
        }
        self
    }
}

/// Where the external collaborators live. Read from the environment after `dotenv`.
#[derive(Debug, Clone)]
pub struct Environment {
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,
    pub library_path: PathBuf,
    pub asset_dir: PathBuf,
}

impl Environment {
    pub fn from_env() -> Self {
        let non_empty = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());

        let library_path = non_empty("SYNOID_LIBRARY")
            .map(PathBuf::from)
            .unwrap_or_else(default_library_path);
        let asset_dir = non_empty("SYNOID_ASSET_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            supabase_url: non_empty("SUPABASE_URL"),
            supabase_key: non_empty("SUPABASE_KEY"),
            library_path,
            asset_dir,
        }
    }

    /// Both Supabase credentials are present.
    pub fn remote_store(&self) -> Option<(&str, &str)> {
        match (&self.supabase_url, &self.supabase_key) {
            (Some(url), Some(key)) => Some((url.as_str(), key.as_str())),
            _ => None,
        }
    }
}

fn default_library_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("synoid")
        .join("library.json")
}
