// SYNOID Storyboard Selector
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Picks one clip per script block. Candidates are visited oldest-first so
// that, absent any tag signal, repeated runs rotate through the library.
// Matching is a best-effort override on top of that order.

use crate::catalog::{most_recent_ids, oldest_first};
use crate::engine::scoring::ScoringStrategy;
use crate::engine::segmenter::Segmenter;
use crate::engine::types::{ClipRecord, ScriptBlock, SelectionReason, SelectionRecord, SessionState};
use crate::errors::{Result, StoryboardError};
use tracing::{debug, info};

pub struct Selector {
    strategy: Box<dyn ScoringStrategy>,
    segmenter: Segmenter,
    recency_window: usize,
}

impl Selector {
    pub fn new(strategy: Box<dyn ScoringStrategy>, segmenter: Segmenter, recency_window: usize) -> Self {
        Self {
            strategy,
            segmenter,
            recency_window,
        }
    }

    /// Seed a fresh session from a catalog snapshot.
    pub fn begin_session(&self, catalog: &[ClipRecord]) -> SessionState {
        SessionState {
            recent_ids: most_recent_ids(catalog, self.recency_window),
            session_used_ids: Vec::new(),
        }
    }

    /// One record per block, in block order.
    pub fn select(
        &self,
        blocks: &[ScriptBlock],
        catalog: &[ClipRecord],
        state: &mut SessionState,
    ) -> Result<Vec<SelectionRecord>> {
        if catalog.is_empty() {
            return Err(StoryboardError::NoClipsAvailable);
        }

        let pool = oldest_first(catalog);
        info!(
            "[SELECT] {} blocks, {} clips, {} recent held back ({})",
            blocks.len(),
            pool.len(),
            state.recent_ids.len(),
            self.strategy.name()
        );

        let mut records = Vec::with_capacity(blocks.len());
        for (index, block) in blocks.iter().enumerate() {
            let record = self.select_one(index, block, &pool, state);
            debug!(
                "[SELECT] [{}] -> {} ({:?}, score {:.2})",
                block.time_label, record.clip.file_name, record.reason, record.match_score
            );
            state.mark_used(&record.clip.id);
            records.push(record);
        }

        let repeats = records
            .iter()
            .filter(|r| r.reason == SelectionReason::ForcedRepeat)
            .count();
        info!(
            "[SELECT] Storyboard ready: {} selections, {} forced repeats",
            records.len(),
            repeats
        );
        Ok(records)
    }

    fn select_one(
        &self,
        index: usize,
        block: &ScriptBlock,
        pool: &[&ClipRecord],
        state: &SessionState,
    ) -> SelectionRecord {
        let candidates: Vec<&ClipRecord> = pool
            .iter()
            .copied()
            .filter(|c| !state.is_recent(&c.id) && !state.is_used(&c.id))
            .collect();

        let keywords = self.segmenter.keywords(block);

        let mut best: Option<(&ClipRecord, f64)> = None;
        for clip in &candidates {
            let score = self.strategy.score(block, &keywords, clip);
            // Strictly greater: ties keep the older clip.
            if score > 0.0 && best.map_or(true, |(_, s)| score > s) {
                best = Some((*clip, score));
            }
        }

        let (clip, match_score, reason) = match best {
            Some((clip, score)) => (clip, score, SelectionReason::Matched),
            None => match candidates.first() {
                Some(clip) => (*clip, 0.0, SelectionReason::OldestCandidate),
                None => match pool.iter().find(|c| !state.is_used(&c.id)) {
                    Some(clip) => (*clip, 0.0, SelectionReason::RecentFallback),
                    // pool is non-empty, checked by `select`
                    None => (pool[0], 0.0, SelectionReason::ForcedRepeat),
                },
            },
        };

        SelectionRecord {
            index,
            block: block.clone(),
            clip: clip.clone(),
            match_score,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::scoring::{KeywordContainment, TagIntersection};
    use chrono::{TimeZone, Utc};

    fn selector(window: usize) -> Selector {
        Selector::new(Box::new(TagIntersection), Segmenter::new(10.0, 5), window)
    }

    fn at(year: i32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).unwrap()
    }

    fn block(text: &str) -> ScriptBlock {
        ScriptBlock::new("00:00", text)
    }

    #[test]
    fn test_empty_catalog_fails() {
        let s = selector(5);
        let mut state = SessionState::new();
        let err = s.select(&[block("faith")], &[], &mut state).unwrap_err();
        assert!(matches!(err, StoryboardError::NoClipsAvailable));
        assert!(state.session_used_ids.is_empty());
    }

    #[test]
    fn test_never_used_clip_counts_as_oldest() {
        let catalog = vec![
            ClipRecord::new("A", "a.mp4").with_tags(["faith"]),
            ClipRecord::new("B", "b.mp4").with_tags(["hope"]).with_last_used(at(2024)),
            ClipRecord::new("C", "c.mp4").with_tags(["faith"]).with_last_used(at(2023)),
        ];
        for window in [0, 5] {
            let s = selector(window);
            let mut state = s.begin_session(&catalog);
            let records = s.select(&[block("faith")], &catalog, &mut state).unwrap();
            assert_eq!(records[0].clip.id, "A", "window {}", window);
            assert_eq!(records[0].reason, SelectionReason::Matched);
        }
    }

    #[test]
    fn test_single_clip_repeats_for_every_block() {
        let catalog = vec![ClipRecord::new("only", "only.mp4")];
        let s = selector(5);
        let mut state = s.begin_session(&catalog);
        let records = s
            .select(&[block("first"), block("second")], &catalog, &mut state)
            .unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.clip.id == "only"));
        assert_eq!(records[1].reason, SelectionReason::ForcedRepeat);
        assert_eq!(state.session_used_ids, vec!["only", "only"]);
    }

    #[test]
    fn test_recent_clips_only_used_when_candidates_run_out() {
        let catalog = vec![
            ClipRecord::new("fresh", "fresh.mp4").with_last_used(at(2020)),
            ClipRecord::new("recent", "recent.mp4").with_last_used(at(2025)),
        ];
        let s = Selector::new(Box::new(KeywordContainment), Segmenter::new(10.0, 5), 1);
        let mut state = s.begin_session(&catalog);
        assert!(state.is_recent("recent"));

        let records = s
            .select(&[block("one"), block("two")], &catalog, &mut state)
            .unwrap();
        assert_eq!(records[0].clip.id, "fresh");
        assert_eq!(records[0].reason, SelectionReason::OldestCandidate);
        assert_eq!(records[1].clip.id, "recent");
        assert_eq!(records[1].reason, SelectionReason::RecentFallback);
    }

    #[test]
    fn test_match_overrides_age() {
        let catalog = vec![
            ClipRecord::new("old", "old.mp4").with_tags(["ocean"]).with_last_used(at(2019)),
            ClipRecord::new("new", "new.mp4").with_tags(["mountains"]).with_last_used(at(2022)),
        ];
        let s = selector(0);
        let mut state = s.begin_session(&catalog);
        let records = s
            .select(&[block("Climbing mountains at dawn")], &catalog, &mut state)
            .unwrap();
        assert_eq!(records[0].clip.id, "new");
        assert_eq!(records[0].match_score, 1.0);
    }
}
