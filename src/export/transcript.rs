// SYNOID Storyboard Export - Plain Text Script
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use super::slugify;
use crate::engine::types::SelectionRecord;

pub const MIME: &str = "text/plain";

/// Title header followed by one `[MM:SS] -> file` line per block.
pub fn render(title: &str, selections: &[SelectionRecord]) -> String {
    let mut out = format!("ROTEIRO TÉCNICO: {}\n{}\n\n", title, "=".repeat(30));
    for record in selections {
        out.push_str(&format!(
            "[{}] -> {}\n",
            record.block.time_label, record.clip.file_name
        ));
    }
    out
}

pub fn file_name(title: &str) -> String {
    format!("roteiro_{}.txt", slugify(title))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::{ClipRecord, ScriptBlock, SelectionReason};

    #[test]
    fn test_render() {
        let selections: Vec<SelectionRecord> = ["a.mp4", "b.mp4"]
            .iter()
            .enumerate()
            .map(|(i, name)| SelectionRecord {
                index: i,
                block: ScriptBlock::new(format!("00:{}0", i), "text"),
                clip: ClipRecord::new(*name, *name),
                match_score: 0.0,
                reason: SelectionReason::OldestCandidate,
            })
            .collect();

        let text = render("Nova Montagem", &selections);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "ROTEIRO TÉCNICO: Nova Montagem");
        assert_eq!(lines[1], "==============================");
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "[00:00] -> a.mp4");
        assert_eq!(lines[4], "[00:10] -> b.mp4");
        assert_eq!(file_name("Nova Montagem"), "roteiro_nova_montagem.txt");
    }
}
