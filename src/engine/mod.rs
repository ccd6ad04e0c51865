// SYNOID Storyboard Engine
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Script -> blocks -> clip selections. Pure over a catalog snapshot; the
// only I/O is the single catalog read in `StoryboardEngine::generate`.

pub mod scoring;
pub mod segmenter;
pub mod selector;
pub mod storyboard;
pub mod types;

pub use scoring::{strategy_for, ScoringStrategy};
pub use segmenter::{AlignedFragment, Segmentation, Segmenter};
pub use selector::Selector;
pub use storyboard::{ScriptInput, Storyboard, StoryboardEngine};
pub use types::{ClipRecord, ScriptBlock, SelectionReason, SelectionRecord, SessionState};
