// SYNOID Storyboard Errors
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoryboardError {
    #[error("No clips available in the library")]
    NoClipsAvailable,

    #[error("Script produced no sentences; using a placeholder block")]
    SegmentationDegenerate,

    #[error("Block {index}: asset for clip '{clip_id}' could not be resolved: {reason}")]
    AssetResolutionFailed {
        index: usize,
        clip_id: String,
        reason: String,
    },

    #[error("Clip store unavailable: {0}")]
    ExternalStoreUnavailable(String),

    #[error("Dropped {dropped} malformed fragment(s): {reason}")]
    MatchingInputInvalid { dropped: usize, reason: String },

    #[error("Narration of {duration}s needs more than {max_blocks} blocks")]
    NarrationTooLong { duration: f64, max_blocks: usize },

    #[error("Export cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
}

impl From<reqwest::Error> for StoryboardError {
    fn from(e: reqwest::Error) -> Self {
        StoryboardError::ExternalStoreUnavailable(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StoryboardError>;
