use chrono::{TimeZone, Utc};
use synoid_storyboard::catalog::{ClipCatalog, MemoryCatalog};
use synoid_storyboard::config::StoryboardConfig;
use synoid_storyboard::engine::{ClipRecord, ScriptInput, SelectionReason, StoryboardEngine};
use synoid_storyboard::usage;
use synoid_storyboard::StoryboardError;

fn engine() -> StoryboardEngine {
    StoryboardEngine::new(StoryboardConfig::default())
}

fn plain(script: &str, duration: f64) -> ScriptInput {
    ScriptInput::Plain {
        script: script.to_string(),
        duration: Some(duration),
    }
}

#[tokio::test]
async fn test_never_used_matching_clip_wins() {
    let catalog = MemoryCatalog::new(vec![
        ClipRecord::new("A", "a.mp4").with_tags(["faith"]),
        ClipRecord::new("B", "b.mp4")
            .with_tags(["hope"])
            .with_last_used(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
        ClipRecord::new("C", "c.mp4")
            .with_tags(["faith"])
            .with_last_used(Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap()),
    ]);

    let board = engine()
        .generate("Fé", &plain("Keep the faith.", 8.0), &catalog)
        .await
        .unwrap();
    assert_eq!(board.selections.len(), 1);
    assert_eq!(board.selections[0].clip.id, "A");
    assert_eq!(board.selections[0].reason, SelectionReason::Matched);
}

#[tokio::test]
async fn test_short_narration_keeps_all_sentences_in_one_block() {
    let catalog = MemoryCatalog::new(vec![ClipRecord::new("A", "a.mp4")]);
    let script = "Hello world. This is great! Amazing.";

    // 11s: one whole slot and a 1s remainder, which does not earn a slot.
    let board = engine().generate("Demo", &plain(script, 11.0), &catalog).await.unwrap();
    assert_eq!(board.selections.len(), 1);
    assert_eq!(
        board.selections[0].block.text,
        "Hello world This is great Amazing"
    );

    // 15s: the 5s remainder earns a second slot.
    let board = engine().generate("Demo", &plain(script, 15.0), &catalog).await.unwrap();
    assert_eq!(board.selections.len(), 2);
    assert_eq!(board.selections[1].block.time_label, "00:10");
}

#[tokio::test]
async fn test_empty_library_raises_no_clips() {
    let err = engine()
        .generate("Demo", &plain("Anything at all.", 30.0), &MemoryCatalog::default())
        .await
        .unwrap_err();
    assert!(matches!(err, StoryboardError::NoClipsAvailable));
}

#[tokio::test]
async fn test_single_clip_is_forced_to_repeat() {
    let catalog = MemoryCatalog::new(vec![ClipRecord::new("solo", "solo.mp4")]);
    let board = engine()
        .generate("Demo", &plain("First part. Second part.", 20.0), &catalog)
        .await
        .unwrap();
    let ids: Vec<&str> = board.selections.iter().map(|r| r.clip.id.as_str()).collect();
    assert_eq!(ids, vec!["solo", "solo"]);
    assert_eq!(board.selections[1].reason, SelectionReason::ForcedRepeat);
    assert_eq!(board.clip_ids(), vec!["solo"]);
}

#[tokio::test]
async fn test_confirmation_rotates_the_library() {
    let catalog = MemoryCatalog::new(
        (0..6)
            .map(|i| ClipRecord::new(format!("c{}", i), format!("c{}.mp4", i)))
            .collect(),
    );
    let script = "One. Two. Three.";

    let first = engine().generate("Run 1", &plain(script, 30.0), &catalog).await.unwrap();
    assert_eq!(first.clip_ids(), vec!["c0", "c1", "c2"]);
    let report = usage::confirm(&catalog, first).await;
    assert!(report.is_complete());

    // Confirmed clips are now the most recent and are held back.
    let second = engine().generate("Run 2", &plain(script, 30.0), &catalog).await.unwrap();
    assert_eq!(second.clip_ids(), vec!["c3", "c4", "c5"]);
}

#[tokio::test]
async fn test_failed_usage_write_can_be_retried_alone() {
    let catalog = MemoryCatalog::new(vec![
        ClipRecord::new("a", "a.mp4"),
        ClipRecord::new("b", "b.mp4"),
    ]);
    let board = engine()
        .generate("Demo", &plain("One. Two.", 20.0), &catalog)
        .await
        .unwrap();

    catalog.fail_writes_for("b").await;
    let report = usage::confirm(&catalog, board).await;
    assert_eq!(report.updated, vec!["a"]);
    assert_eq!(report.failed_ids(), vec!["b"]);

    let stamped_a = catalog.list_clips().await.unwrap()[0].last_used_at;
    catalog.heal("b").await;
    let retry = usage::record_usage(&catalog, &report.failed_ids(), Utc::now()).await;
    assert!(retry.is_complete());

    let clips = catalog.list_clips().await.unwrap();
    assert_eq!(clips[0].last_used_at, stamped_a);
    assert!(clips[1].last_used_at.is_some());
}
