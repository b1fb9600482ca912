//! Inspect AdLib Tracker 2 modules.
//!
//! Prints a summary of each module (or JSON with `--json`), optionally the
//! instrument table and the contents of one pattern.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use adtrack2::{load_file, Event, Song, SongSummary};

#[derive(Parser)]
#[command(name = "a2m-info")]
#[command(about = "Show information about AdLib Tracker 2 modules (A2M/A2T)")]
struct Args {
    /// Module files to inspect
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Emit a JSON summary per file
    #[arg(long)]
    json: bool,

    /// Pretty print JSON output
    #[arg(long, requires = "json")]
    pretty: bool,

    /// List named or non-empty instruments
    #[arg(short, long)]
    instruments: bool,

    /// Dump one pattern (index into the track grid)
    #[arg(short, long)]
    pattern: Option<usize>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let mut failed = 0;
    for path in &args.files {
        let song = match load_file(path) {
            Ok(song) => song,
            Err(e) => {
                log::error!("{}: {e}", path.display());
                failed += 1;
                continue;
            }
        };

        if args.json {
            let summary = SongSummary::from_song(&song);
            let text = if args.pretty {
                serde_json::to_string_pretty(&summary)?
            } else {
                serde_json::to_string(&summary)?
            };
            println!("{text}");
        } else {
            print_summary(path, &song);
        }

        if args.instruments {
            print_instruments(&song);
        }
        if let Some(pattern) = args.pattern {
            print_pattern(&song, pattern)
                .with_context(|| format!("{}: pattern {pattern}", path.display()))?;
        }
    }

    if failed > 0 {
        bail!("{failed} of {} file(s) could not be decoded", args.files.len());
    }
    Ok(())
}

fn print_summary(path: &std::path::Path, song: &Song) {
    let tracks = song.tracks();
    println!("{}", path.display());
    println!("  Format:      {:?} v{}", song.container(), song.version());
    println!("  Title:       {}", song.title());
    println!("  Author:      {}", song.author());
    println!(
        "  Tempo/Speed: {} / {} ({:.1} Hz)",
        song.tempo(),
        song.speed(),
        song.refresh_rate()
    );
    println!(
        "  Patterns:    {} declared, {} in order list",
        song.pattern_count(),
        song.used_order().count()
    );
    println!(
        "  Grid:        {} tracks, {} channels x {} rows",
        tracks.track_count(),
        tracks.channels(),
        tracks.rows()
    );
    println!("  Flags:       {:?}", song.flags());
}

fn print_instruments(song: &Song) {
    for (i, inst) in song.instruments().iter().enumerate() {
        if inst.name.is_empty() && inst.is_empty() {
            continue;
        }
        let regs: Vec<String> = inst.data.iter().map(|b| format!("{b:02X}")).collect();
        println!("  {:3} {:<42} {}", i + 1, inst.name, regs.join(" "));
    }
}

fn print_pattern(song: &Song, pattern: usize) -> Result<()> {
    let tracks = song.tracks();
    if pattern >= tracks.pattern_count() {
        bail!("out of range (grid holds {})", tracks.pattern_count());
    }
    for row in 0..tracks.rows() {
        let cells: Vec<String> = (0..tracks.channels())
            .filter_map(|c| tracks.event(pattern, c, row))
            .map(format_event)
            .collect();
        println!("  {row:02X} | {}", cells.join(" | "));
    }
    Ok(())
}

fn format_event(event: &Event) -> String {
    if event.is_empty() {
        return "... .. ...".to_string();
    }
    format!(
        "{:3} {:02X} {:02X}{:X}{:X}",
        event.note, event.instrument, event.command, event.param1, event.param2
    )
}
