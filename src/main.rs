// SYNOID Storyboard Entry Point
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use synoid_storyboard::assets::{self, probe_duration, LocalAssetLibrary, ResolvedAsset};
use synoid_storyboard::catalog::{self, by_recency, index_directory};
use synoid_storyboard::config::{Environment, StoryboardConfig};
use synoid_storyboard::engine::{AlignedFragment, ScriptInput, Storyboard, StoryboardEngine};
use synoid_storyboard::export::{archive, draft, slugify, transcript, xmeml, Timeline};
use synoid_storyboard::server::{self, AppState};
use synoid_storyboard::usage;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use dotenv::dotenv;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "synoid-storyboard")]
#[command(about = "SYNOID Storyboard - script to shot list", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the clip library, most recently used first
    Library,

    /// Register every video under a folder in the library
    Index {
        /// Footage folder
        #[arg(short, long)]
        dir: PathBuf,
    },

    /// Build a storyboard from a narration script
    Generate {
        /// Plain-text script
        #[arg(short, long, required_unless_present = "fragments")]
        script: Option<PathBuf>,

        /// Storyboard title
        #[arg(short, long)]
        title: String,

        /// Narration length in seconds (estimated from the script when omitted)
        #[arg(short, long)]
        duration: Option<f64>,

        /// JSON array of aligned fragments, used instead of splitting the script
        #[arg(long)]
        fragments: Option<PathBuf>,

        /// Where to save the storyboard (default: storyboard_<title>.json)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Accept a storyboard and record its clips as used
    Confirm {
        #[arg(short, long)]
        storyboard: PathBuf,
    },

    /// Export a storyboard for editing
    Export {
        #[arg(short, long)]
        storyboard: PathBuf,

        #[arg(short, long, value_enum, default_value = "transcript")]
        format: ExportFormat,

        /// Output file (transcript, xml, archive) or folder (draft)
        #[arg(short, long)]
        out: PathBuf,

        /// Narration audio (required for draft, xml and archive)
        #[arg(short, long)]
        audio: Option<PathBuf>,

        /// Narration length in seconds; probed with ffprobe when omitted
        #[arg(long)]
        audio_duration: Option<f64>,
    },

    /// Serve the storyboard API
    Serve {
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Transcript,
    Draft,
    Xml,
    Archive,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info,hyper=warn,reqwest=warn");
    }
    tracing_subscriber::fmt::init();

    info!("--- SYNOID STORYBOARD v{} ---", env!("CARGO_PKG_VERSION"));

    let args = Cli::parse();
    let env = Environment::from_env();
    let config = StoryboardConfig::load();

    match args.command {
        Commands::Library => {
            let catalog = catalog::open(&env)?;
            let clips = catalog.list_clips().await?;
            println!("{:<40} {:<20} {}", "CLIP", "LAST USED", "TAGS");
            for clip in by_recency(&clips) {
                let used = clip
                    .last_used_at
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "never".to_string());
                let tags: Vec<&str> = clip.tags.iter().map(String::as_str).collect();
                println!("{:<40} {:<20} {}", clip.file_name, used, tags.join(", "));
            }
            info!("{} clips in library", clips.len());
        }
        Commands::Index { dir } => {
            let catalog = catalog::open(&env)?;
            let report = index_directory(catalog.as_ref(), &dir, config.min_keyword_len).await?;
            println!("Indexed {:?}: {} new, {} refreshed", dir, report.added, report.updated);
        }
        Commands::Generate {
            script,
            title,
            duration,
            fragments,
            out,
        } => {
            let input = match (fragments, script) {
                (Some(path), _) => {
                    let raw = std::fs::read_to_string(&path)
                        .with_context(|| format!("reading fragments {:?}", path))?;
                    let fragments: Vec<AlignedFragment> = serde_json::from_str(&raw)
                        .with_context(|| format!("parsing fragments {:?}", path))?;
                    ScriptInput::Aligned { fragments, duration }
                }
                (None, Some(path)) => ScriptInput::Plain {
                    script: std::fs::read_to_string(&path)
                        .with_context(|| format!("reading script {:?}", path))?,
                    duration,
                },
                (None, None) => bail!("either --script or --fragments is required"),
            };

            let catalog = catalog::open(&env)?;
            let engine = StoryboardEngine::new(config);
            let board = engine.generate(&title, &input, catalog.as_ref()).await?;

            for record in &board.selections {
                println!(
                    "[{}] {:<78} -> {} ({:?})",
                    record.block.time_label,
                    record.block.preview(),
                    record.clip.file_name,
                    record.reason
                );
            }
            for warning in &board.warnings {
                warn!("{}", warning);
            }

            let out = out.unwrap_or_else(|| PathBuf::from(format!("storyboard_{}.json", slugify(&title))));
            board.save(&out)?;
            println!("Storyboard saved to {:?}. Run `confirm` to accept it.", out);
        }
        Commands::Confirm { storyboard } => {
            let board = Storyboard::load(&storyboard)
                .with_context(|| format!("loading storyboard {:?}", storyboard))?;
            let catalog = catalog::open(&env)?;
            let mut pending = board.clone();
            let report = usage::confirm(catalog.as_ref(), board).await;

            if report.is_complete() {
                std::fs::remove_file(&storyboard).ok();
                println!("Recorded {} clips as used.", report.updated.len());
            } else {
                // Keep only what still needs recording so a rerun retries those alone.
                let failed = report.failed_ids();
                pending.selections.retain(|r| failed.contains(&r.clip.id));
                pending.save(&storyboard)?;
                for failure in &report.failed {
                    println!("FAILED {}: {}", failure.id, failure.reason);
                }
                bail!(
                    "{} of {} clips not recorded; rerun confirm on {:?} to retry",
                    report.failed.len(),
                    report.failed.len() + report.updated.len(),
                    storyboard
                );
            }
        }
        Commands::Export {
            storyboard,
            format,
            out,
            audio,
            audio_duration,
        } => {
            let board = Storyboard::load(&storyboard)
                .with_context(|| format!("loading storyboard {:?}", storyboard))?;

            if let ExportFormat::Transcript = format {
                std::fs::write(&out, transcript::render(&board.title, &board.selections))?;
                println!("Transcript written to {:?}", out);
                return Ok(());
            }

            let Some(audio) = audio else {
                bail!("--audio is required for this export format");
            };
            let narration = narration_asset(&audio, audio_duration).await?;
            let library = LocalAssetLibrary::new(&env.asset_dir);
            let resolved = assets::resolve_selections(&board.selections, &library).await;
            let timeline = Timeline::build(
                &board.title,
                &board.selections,
                &resolved,
                narration,
                board.slot_seconds,
            );

            match format {
                ExportFormat::Draft => {
                    let written = draft::write(&timeline, &out, config.fps)?;
                    println!("Draft written: {:?}", written);
                }
                ExportFormat::Xml => {
                    std::fs::write(&out, xmeml::render(&timeline, config.fps))?;
                    println!("Timeline written to {:?}", out);
                }
                ExportFormat::Archive => {
                    let cancel = Arc::new(AtomicBool::new(false));
                    let flag = cancel.clone();
                    tokio::spawn(async move {
                        if tokio::signal::ctrl_c().await.is_ok() {
                            warn!("Cancelling archive export...");
                            flag.store(true, Ordering::SeqCst);
                        }
                    });

                    let fps = config.fps;
                    let report = tokio::task::spawn_blocking(move || {
                        archive::write(&timeline, &board.selections, &out, fps, &cancel)
                    })
                    .await??;
                    println!(
                        "Archive written to {:?} ({} videos, {} skipped)",
                        report.path,
                        report.videos,
                        report.skipped.len()
                    );
                }
                ExportFormat::Transcript => {}
            }
        }
        Commands::Serve { port } => {
            let catalog = catalog::open(&env)?;
            let state = Arc::new(AppState {
                catalog,
                engine: StoryboardEngine::new(config),
                asset_dir: env.asset_dir.clone(),
            });
            server::start_server(port, state).await?;
        }
    }

    Ok(())
}

async fn narration_asset(path: &Path, duration: Option<f64>) -> anyhow::Result<ResolvedAsset> {
    if !path.is_file() {
        bail!("narration audio {:?} not found", path);
    }
    let duration = match duration {
        Some(d) if d > 0.0 => d,
        _ => probe_duration(path)
            .await
            .map_err(|e| anyhow::anyhow!("probing narration {:?}: {}", path, e))?,
    };
    Ok(ResolvedAsset::new(path, duration))
}
