// SYNOID Storyboard Segmenter
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Splits a narration script into time-coded blocks, either by fixed
// slots derived from the audio duration or from externally aligned fragments.

use crate::catalog::normalize_text;
use crate::config::DEFAULT_MAX_BLOCKS;
use crate::engine::types::{format_time_label, parse_time_label, ScriptBlock};
use crate::errors::StoryboardError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::{info, warn};

fn sentence_splitter() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.!?\n]+").expect("static regex"))
}

fn word_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\w+").expect("static regex"))
}

/// A fragment produced by an external aligner. Every field is optional on the
/// wire so malformed input can be counted instead of rejected wholesale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlignedFragment {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub script_fragment: Option<String>,
    #[serde(default)]
    pub visual_theme: Option<String>,
    #[serde(default)]
    pub target_emotion: Option<String>,
    #[serde(default)]
    pub key_elements: Vec<String>,
}

/// Blocks plus the recoverable conditions hit while producing them.
#[derive(Debug, Default)]
pub struct Segmentation {
    pub blocks: Vec<ScriptBlock>,
    pub warnings: Vec<StoryboardError>,
}

pub struct Segmenter {
    slot_seconds: f64,
    min_keyword_len: usize,
    max_blocks: usize,
}

impl Segmenter {
    pub fn new(slot_seconds: f64, min_keyword_len: usize) -> Self {
        Self {
            slot_seconds,
            min_keyword_len,
            max_blocks: DEFAULT_MAX_BLOCKS,
        }
    }

    pub fn with_max_blocks(mut self, max_blocks: usize) -> Self {
        self.max_blocks = max_blocks;
        self
    }

    /// Number of slots for a narration of `duration` seconds. A trailing
    /// remainder only earns its own slot when it is longer than 2 seconds.
    /// Counts above `max_blocks` (or an unusable slot width) are refused.
    pub fn block_count(&self, duration: f64) -> Result<usize, StoryboardError> {
        let duration = duration.max(0.0);
        let too_long = || StoryboardError::NarrationTooLong {
            duration,
            max_blocks: self.max_blocks,
        };
        if !(self.slot_seconds.is_finite() && self.slot_seconds > 0.0) {
            return Err(too_long());
        }

        let whole = (duration / self.slot_seconds).floor();
        let extra = if duration % self.slot_seconds > 2.0 { 1.0 } else { 0.0 };
        let count = (whole + extra).max(1.0);
        if count > self.max_blocks as f64 {
            return Err(too_long());
        }
        Ok(count as usize)
    }

    /// Duration-driven segmentation.
    pub fn by_duration(&self, script: &str, duration: f64) -> Result<Segmentation, StoryboardError> {
        let num_blocks = self.block_count(duration)?;

        let sentences = split_sentences(script);
        if sentences.is_empty() {
            warn!("[SEGMENT] {}", StoryboardError::SegmentationDegenerate);
            return Ok(Segmentation {
                blocks: vec![ScriptBlock::new(format_time_label(0), "")],
                warnings: vec![StoryboardError::SegmentationDegenerate],
            });
        }

        let per_block = (sentences.len() / num_blocks).max(1);

        let blocks: Vec<ScriptBlock> = (0..num_blocks)
            .map(|i| {
                let start = (i * per_block).min(sentences.len());
                let end = ((i + 1) * per_block).min(sentences.len());
                let seconds = (i as f64 * self.slot_seconds).round() as u64;
                ScriptBlock::new(format_time_label(seconds), sentences[start..end].join(" "))
            })
            .collect();

        let empty = blocks.iter().filter(|b| b.text.is_empty()).count();
        info!(
            "[SEGMENT] {} sentences -> {} blocks ({} per block, {} padded)",
            sentences.len(),
            blocks.len(),
            per_block,
            empty
        );

        Ok(Segmentation {
            blocks,
            warnings: Vec::new(),
        })
    }

    /// Segmentation from aligned fragments. Fragments without a parseable
    /// timestamp or a non-empty text are dropped and counted.
    pub fn from_fragments(
        &self,
        fragments: &[AlignedFragment],
    ) -> Result<Segmentation, StoryboardError> {
        let mut timed: Vec<(f64, ScriptBlock)> = Vec::with_capacity(fragments.len());
        let mut dropped = 0usize;

        for fragment in fragments {
            let text = fragment.script_fragment.as_deref().map(str::trim).unwrap_or("");
            let seconds = fragment.timestamp.as_deref().and_then(parse_time_label);

            match seconds {
                Some(seconds) if !text.is_empty() => {
                    let label = format_time_label(seconds.floor() as u64);
                    timed.push((
                        seconds,
                        ScriptBlock {
                            time_label: label,
                            text: text.to_string(),
                            visual_theme: present(&fragment.visual_theme),
                            key_elements: fragment
                                .key_elements
                                .iter()
                                .map(|e| e.trim().to_string())
                                .filter(|e| !e.is_empty())
                                .collect(),
                            target_emotion: present(&fragment.target_emotion),
                        },
                    ));
                }
                _ => dropped += 1,
            }
        }

        if timed.is_empty() {
            return Err(StoryboardError::MatchingInputInvalid {
                dropped,
                reason: "no fragment carries both a timestamp and text".to_string(),
            });
        }

        // Stable: equal timestamps keep their input order.
        timed.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut warnings = Vec::new();
        if dropped > 0 {
            let warning = StoryboardError::MatchingInputInvalid {
                dropped,
                reason: "missing timestamp or script_fragment".to_string(),
            };
            warn!("[SEGMENT] {}", warning);
            warnings.push(warning);
        }

        info!("[SEGMENT] {} aligned blocks accepted", timed.len());
        Ok(Segmentation {
            blocks: timed.into_iter().map(|(_, block)| block).collect(),
            warnings,
        })
    }

    /// Lowercase matching terms for a block: long words from the text,
    /// the visual theme and the key elements, first occurrence first.
    pub fn keywords(&self, block: &ScriptBlock) -> Vec<String> {
        let mut source = block.text.clone();
        if let Some(theme) = &block.visual_theme {
            source.push(' ');
            source.push_str(theme);
        }
        for element in &block.key_elements {
            source.push(' ');
            source.push_str(element);
        }
        extract_keywords(&source, self.min_keyword_len)
    }
}

/// Sentences split on terminal punctuation or line breaks, blanks discarded.
pub fn split_sentences(script: &str) -> Vec<String> {
    sentence_splitter()
        .split(script)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn extract_keywords(text: &str, min_len: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    word_pattern()
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .filter(|w| w.chars().count() >= min_len)
        .filter(|w| seen.insert(w.clone()))
        .collect()
}

/// Narration length estimated from word count.
pub fn estimate_duration(script: &str, words_per_second: f64) -> f64 {
    if words_per_second <= 0.0 {
        return 0.0;
    }
    let words = word_pattern().find_iter(script).count();
    words as f64 / words_per_second
}

fn present(value: &Option<String>) -> Option<String> {
    normalize_text(value.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segmenter() -> Segmenter {
        Segmenter::new(10.0, 5)
    }

    #[test]
    fn test_block_count() {
        let s = segmenter();
        assert_eq!(s.block_count(0.0).unwrap(), 1);
        assert_eq!(s.block_count(15.0).unwrap(), 2);
        assert_eq!(s.block_count(12.0).unwrap(), 1);
        assert_eq!(s.block_count(12.5).unwrap(), 2);
        assert_eq!(s.block_count(30.0).unwrap(), 3);
    }

    #[test]
    fn test_block_count_is_bounded() {
        let s = segmenter().with_max_blocks(4);
        assert_eq!(s.block_count(40.0).unwrap(), 4);
        assert!(matches!(
            s.block_count(41.0),
            Err(StoryboardError::NarrationTooLong { max_blocks: 4, .. })
        ));
        assert!(matches!(
            segmenter().block_count(1e300),
            Err(StoryboardError::NarrationTooLong { .. })
        ));
        assert!(segmenter().block_count(f64::INFINITY).is_err());
    }

    #[test]
    fn test_zero_slot_width_is_refused() {
        assert!(Segmenter::new(0.0, 5).block_count(30.0).is_err());
        assert!(Segmenter::new(f64::NAN, 5).block_count(30.0).is_err());
        assert!(Segmenter::new(0.0, 5).by_duration("One.", 30.0).is_err());
    }

    #[test]
    fn test_fifteen_seconds_splits_into_two_slots() {
        // 15 % 10 = 5 > 2, so a second slot opens for the tail.
        let seg = segmenter().by_duration("Hello world. This is great! Amazing.", 15.0).unwrap();
        assert_eq!(seg.blocks.len(), 2);
        assert_eq!(seg.blocks[0].text, "Hello world");
        assert_eq!(seg.blocks[1].time_label, "00:10");
    }

    #[test]
    fn test_single_slot_gets_every_sentence() {
        let seg = segmenter().by_duration("Hello world. This is great! Amazing.", 11.0).unwrap();
        assert_eq!(seg.blocks.len(), 1);
        assert_eq!(seg.blocks[0].text, "Hello world This is great Amazing");
        assert_eq!(seg.blocks[0].time_label, "00:00");
    }

    #[test]
    fn test_short_script_pads_trailing_blocks() {
        let seg = segmenter().by_duration("Only one sentence here.", 40.0).unwrap();
        assert_eq!(seg.blocks.len(), 4);
        assert_eq!(seg.blocks[0].text, "Only one sentence here");
        assert!(seg.blocks[1..].iter().all(|b| b.text.is_empty()));
        assert_eq!(seg.blocks[3].time_label, "00:30");
    }

    #[test]
    fn test_empty_script_yields_placeholder() {
        let seg = segmenter().by_duration("  \n ... \n", 30.0).unwrap();
        assert_eq!(seg.blocks.len(), 1);
        assert!(matches!(
            seg.warnings.as_slice(),
            [StoryboardError::SegmentationDegenerate]
        ));
    }

    #[test]
    fn test_fragments_are_validated_and_ordered() {
        let fragments = vec![
            AlignedFragment {
                timestamp: Some("00:10".into()),
                script_fragment: Some("Second".into()),
                ..Default::default()
            },
            AlignedFragment {
                timestamp: None,
                script_fragment: Some("Lost".into()),
                ..Default::default()
            },
            AlignedFragment {
                timestamp: Some("00:00".into()),
                script_fragment: Some("First".into()),
                visual_theme: Some("None".into()),
                ..Default::default()
            },
            AlignedFragment {
                timestamp: Some("00:20".into()),
                script_fragment: Some("   ".into()),
                ..Default::default()
            },
        ];
        let seg = segmenter().from_fragments(&fragments).unwrap();
        let texts: Vec<&str> = seg.blocks.iter().map(|b| b.text.as_str()).collect();
        assert_eq!(texts, vec!["First", "Second"]);
        assert_eq!(seg.blocks[0].visual_theme, None);
        assert!(matches!(
            seg.warnings.as_slice(),
            [StoryboardError::MatchingInputInvalid { dropped: 2, .. }]
        ));
    }

    #[test]
    fn test_all_fragments_invalid_is_an_error() {
        let fragments = vec![AlignedFragment::default()];
        let err = segmenter().from_fragments(&fragments).unwrap_err();
        assert!(matches!(err, StoryboardError::MatchingInputInvalid { dropped: 1, .. }));
    }

    #[test]
    fn test_keywords_include_theme_and_elements() {
        let mut block = ScriptBlock::new("00:00", "Faith moves mountains, FAITH endures");
        block.visual_theme = Some("sunrise over water".into());
        block.key_elements = vec!["Candle".into()];
        let words = segmenter().keywords(&block);
        assert_eq!(
            words,
            vec!["faith", "moves", "mountains", "endures", "sunrise", "water", "candle"]
        );
    }

    #[test]
    fn test_keywords_handle_accented_words() {
        let words = extract_keywords("Coração em oração", 5);
        assert_eq!(words, vec!["coração", "oração"]);
    }

    #[test]
    fn test_estimate_duration() {
        let est = estimate_duration("one two three four five six seven eight nine ten", 2.0);
        assert!((est - 5.0).abs() < f64::EPSILON);
        assert_eq!(estimate_duration("anything", 0.0), 0.0);
    }
}
