// SYNOID Storyboard Scoring
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Pluggable matching strategies. A score of 0.0 means "no match"; the
// selector then falls back to recency ordering.

use crate::config::{ScoringMode, ScoringWeights};
use crate::engine::types::{ClipRecord, ScriptBlock};

pub trait ScoringStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Score `clip` for `block`. `keywords` are the block's lowercase matching terms.
    fn score(&self, block: &ScriptBlock, keywords: &[String], clip: &ClipRecord) -> f64;
}

pub fn strategy_for(mode: ScoringMode, weights: &ScoringWeights) -> Box<dyn ScoringStrategy> {
    match mode {
        ScoringMode::TagIntersection => Box::new(TagIntersection),
        ScoringMode::Keyword => Box::new(KeywordContainment),
        ScoringMode::Weighted => Box::new(WeightedSemantic::new(weights.clone())),
    }
}

/// Exact tag equality against the block keywords.
pub struct TagIntersection;

impl ScoringStrategy for TagIntersection {
    fn name(&self) -> &'static str {
        "tag_intersection"
    }

    fn score(&self, _block: &ScriptBlock, keywords: &[String], clip: &ClipRecord) -> f64 {
        if keywords.iter().any(|k| clip.tags.contains(k)) {
            1.0
        } else {
            0.0
        }
    }
}

/// Keyword contained in any tag, the action or the description.
pub struct KeywordContainment;

impl ScoringStrategy for KeywordContainment {
    fn name(&self) -> &'static str {
        "keyword"
    }

    fn score(&self, _block: &ScriptBlock, keywords: &[String], clip: &ClipRecord) -> f64 {
        if keyword_hit(keywords, clip) {
            1.0
        } else {
            0.0
        }
    }
}

fn keyword_hit(keywords: &[String], clip: &ClipRecord) -> bool {
    let action = lower(&clip.action);
    let description = lower(&clip.description);
    keywords.iter().any(|k| {
        clip.tags.iter().any(|t| t.contains(k.as_str()))
            || action.contains(k.as_str())
            || description.contains(k.as_str())
    })
}

/// Phrase, key element and emotion weighting for clips carrying semantic metadata.
pub struct WeightedSemantic {
    weights: ScoringWeights,
}

impl WeightedSemantic {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }
}

impl ScoringStrategy for WeightedSemantic {
    fn name(&self) -> &'static str {
        "weighted"
    }

    fn score(&self, block: &ScriptBlock, keywords: &[String], clip: &ClipRecord) -> f64 {
        let action = lower(&clip.action);
        let description = lower(&clip.description);
        let emotion = lower(&clip.emotion);
        let mut score = 0.0;

        if let Some(theme) = block.visual_theme.as_deref() {
            let phrase = theme.trim().to_lowercase();
            if !phrase.is_empty() && (action.contains(&phrase) || description.contains(&phrase)) {
                score += self.weights.phrase_weight;
            }
        }

        for element in &block.key_elements {
            let element = element.trim().to_lowercase();
            if element.is_empty() {
                continue;
            }
            let in_text = action.contains(&element) || description.contains(&element);
            let in_tags = clip.tags.iter().any(|t| t.contains(&element));
            if in_text || in_tags {
                score += self.weights.key_element_weight;
            }
        }

        if let Some(target) = block.target_emotion.as_deref() {
            let target = target.trim().to_lowercase();
            if !target.is_empty() && emotion.contains(&target) {
                score += self.weights.emotion_weight;
            }
        }

        if keyword_hit(keywords, clip) {
            score += self.weights.keyword_weight;
        }

        score
    }
}

fn lower(value: &Option<String>) -> String {
    value.as_deref().map(str::to_lowercase).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kw(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_tag_intersection_needs_exact_tag() {
        let clip = ClipRecord::new("a", "a.mp4").with_tags(["faithful"]);
        let block = ScriptBlock::new("00:00", "");
        assert_eq!(TagIntersection.score(&block, &kw(&["faith"]), &clip), 0.0);
        assert_eq!(TagIntersection.score(&block, &kw(&["faithful"]), &clip), 1.0);
    }

    #[test]
    fn test_keyword_containment_reads_all_fields() {
        let block = ScriptBlock::new("00:00", "");
        let mut clip = ClipRecord::new("a", "a.mp4").with_tags(["faithful"]);
        assert_eq!(KeywordContainment.score(&block, &kw(&["faith"]), &clip), 1.0);

        clip.tags.clear();
        clip.description = Some("Woman PRAYING at dawn".into());
        assert_eq!(KeywordContainment.score(&block, &kw(&["praying"]), &clip), 1.0);
        assert_eq!(KeywordContainment.score(&block, &kw(&["ocean"]), &clip), 0.0);
    }

    #[test]
    fn test_weighted_prefers_phrase_over_elements() {
        let weights = ScoringWeights::default();
        let strategy = WeightedSemantic::new(weights.clone());

        let mut block = ScriptBlock::new("00:00", "");
        block.visual_theme = Some("Hands in prayer".into());
        block.key_elements = vec!["candle".into(), "window".into()];
        block.target_emotion = Some("hope".into());

        let mut phrase_clip = ClipRecord::new("p", "p.mp4");
        phrase_clip.description = Some("close up of hands in prayer".into());

        let mut element_clip = ClipRecord::new("e", "e.mp4").with_tags(["candle", "window"]);
        element_clip.emotion = Some("hopeful".into());

        let phrase = strategy.score(&block, &[], &phrase_clip);
        let elements = strategy.score(&block, &[], &element_clip);
        assert_eq!(phrase, weights.phrase_weight);
        assert_eq!(
            elements,
            2.0 * weights.key_element_weight + weights.emotion_weight
        );
        assert!(phrase > elements);
    }

    #[test]
    fn test_strategy_for_mode() {
        let weights = ScoringWeights::default();
        assert_eq!(strategy_for(ScoringMode::Weighted, &weights).name(), "weighted");
        assert_eq!(strategy_for(ScoringMode::Keyword, &weights).name(), "keyword");
        assert_eq!(
            strategy_for(ScoringMode::TagIntersection, &weights).name(),
            "tag_intersection"
        );
    }
}
