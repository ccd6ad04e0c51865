// SYNOID Storyboard Library
// Copyright (c) 2026 Xing_The_Creator | SYNOID

pub mod assets;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod errors;
pub mod export;
pub mod server;
pub mod usage;

pub use errors::{Result, StoryboardError};
