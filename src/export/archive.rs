// SYNOID Storyboard Export - Bundle Archive
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Packs the transcript, the xmeml timeline and every referenced media file
// into one zip. Layout:
//   roteiro_<slug>.txt
//   timeline.xml
//   audio/<narration>
//   videos/<clip>   (each file name once)
//
// Blocking; run it on a blocking thread from async code.

use super::{transcript, xmeml, Timeline};
use crate::engine::types::SelectionRecord;
use crate::errors::{Result, StoryboardError};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info, warn};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveReport {
    pub path: PathBuf,
    pub videos: usize,
    /// Block indices whose footage could not be read and were left out.
    pub skipped: Vec<usize>,
}

/// Build the archive at `out`. Checking `cancel` between media files; a
/// cancelled or failed build leaves no file behind.
pub fn write(
    timeline: &Timeline,
    selections: &[SelectionRecord],
    out: &Path,
    fps: u32,
    cancel: &AtomicBool,
) -> Result<ArchiveReport> {
    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let result = File::create(out)
        .map_err(StoryboardError::from)
        .and_then(|file| pack(file, timeline, selections, fps, cancel));

    match result {
        Ok((videos, skipped)) => {
            info!(
                "[EXPORT] Archive {:?}: {} videos, {} skipped",
                out,
                videos,
                skipped.len()
            );
            Ok(ArchiveReport {
                path: out.to_path_buf(),
                videos,
                skipped,
            })
        }
        Err(e) => {
            if out.exists() {
                if let Err(rm) = fs::remove_file(out) {
                    warn!("[EXPORT] Could not remove partial archive {:?}: {}", out, rm);
                }
            }
            match &e {
                StoryboardError::Cancelled => warn!("[EXPORT] Archive cancelled"),
                other => error!("[EXPORT] Archive failed: {}", other),
            }
            Err(e)
        }
    }
}

fn pack(
    file: File,
    timeline: &Timeline,
    selections: &[SelectionRecord],
    fps: u32,
    cancel: &AtomicBool,
) -> Result<(usize, Vec<usize>)> {
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    // Footage is already compressed.
    let stored = FileOptions::default().compression_method(CompressionMethod::Stored);
    let mut zip = ZipWriter::new(file);

    let check = || {
        if cancel.load(Ordering::SeqCst) {
            Err(StoryboardError::Cancelled)
        } else {
            Ok(())
        }
    };

    check()?;
    let narration_name = timeline.narration.file_name();
    zip.start_file(format!("{}/{}", xmeml::AUDIO_DIR, narration_name), stored)?;
    io::copy(&mut File::open(&timeline.narration.path)?, &mut zip)?;

    let mut packed = HashSet::new();
    let mut skipped = Vec::new();
    for placement in &timeline.placements {
        check()?;
        if packed.contains(&placement.file_name) {
            continue;
        }
        let mut source = match File::open(&placement.asset.path) {
            Ok(f) => f,
            Err(e) => {
                let failure = StoryboardError::AssetResolutionFailed {
                    index: placement.index,
                    clip_id: placement.clip_id.clone(),
                    reason: e.to_string(),
                };
                error!("[EXPORT] {}", failure);
                skipped.push(placement.index);
                continue;
            }
        };
        zip.start_file(
            format!("{}/{}", xmeml::VIDEO_DIR, placement.file_name),
            stored,
        )?;
        io::copy(&mut source, &mut zip)?;
        packed.insert(placement.file_name.clone());
    }

    check()?;
    // The timeline and transcript only point at footage that actually made it in.
    let mut packed_timeline = timeline.clone();
    packed_timeline
        .placements
        .retain(|p| !skipped.contains(&p.index));

    let placed: HashSet<usize> = packed_timeline.placements.iter().map(|p| p.index).collect();
    let bundled: Vec<SelectionRecord> = selections
        .iter()
        .filter(|r| placed.contains(&r.index))
        .cloned()
        .collect();

    zip.start_file(transcript::file_name(&timeline.title), options)?;
    zip.write_all(transcript::render(&timeline.title, &bundled).as_bytes())?;
    zip.start_file(xmeml::FILE_NAME, options)?;
    zip.write_all(xmeml::render(&packed_timeline, fps).as_bytes())?;
    zip.finish()?;

    Ok((packed.len(), skipped))
}
