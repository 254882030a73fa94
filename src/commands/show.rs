use crate::metadata::{TagHandle, TrackMetadata};
use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::path::Path;

pub fn run(path: &Path, json: bool, quiet: bool) -> Result<()> {
    if !path.is_file() {
        bail!("File not found: {}", path.display());
    }

    let handle = TagHandle::open(path)
        .with_context(|| format!("Failed to read tags from {}", path.display()))?;
    let mut metadata = handle.read_core();
    metadata.cover_art = handle.extract_cover_art();

    if json {
        print_json(&metadata)?;
    } else {
        print_pretty(&metadata, path, handle.supports_metadata(), quiet);
    }

    Ok(())
}

fn print_json(metadata: &TrackMetadata) -> Result<()> {
    let json = serde_json::to_string_pretty(metadata)?;
    println!("{}", json);
    Ok(())
}

fn print_pretty(metadata: &TrackMetadata, path: &Path, tagged: bool, quiet: bool) {
    if !quiet {
        println!("{}", path.display().to_string().bold());
        println!("{}", "─".repeat(40));
    }

    if !tagged {
        println!("{}", "This format carries no tags".yellow());
        return;
    }

    print_field("Artist", &metadata.artist);
    print_field("Title", &metadata.title);
    print_field("Album", &metadata.album);
    print_field("Year", &metadata.year);
    print_field("Genre", &metadata.genre);

    if let Some(rg) = &metadata.replay_gain {
        print_field(
            "ReplayGain",
            &format!("{} (peak {})", rg.gain_text(), rg.peak_text()),
        );
    }

    if let Some(cover) = &metadata.cover_art {
        print_field("Cover", &cover.summary());
    }
}

fn print_field(label: &str, value: &str) {
    if !value.is_empty() {
        println!("{:>12}: {}", label.cyan(), value);
    }
}
