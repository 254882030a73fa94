//! Canonical "Artist - Title" file names

use std::io;
use std::path::{Path, PathBuf};

use crate::metadata::{extension_of, TrackMetadata};

/// Characters that are unsafe in file names on at least one common platform
pub const FORBIDDEN_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Suffix YouTube-sourced uploads append to artist names
const TOPIC_SUFFIX: &str = " - Topic";

/// Replace forbidden characters with `replacement` and trim the result
pub fn sanitize(text: &str, replacement: &str) -> String {
    let replacement: String = replacement
        .chars()
        .filter(|c| !FORBIDDEN_CHARS.contains(c))
        .collect();

    text.chars()
        .fold(String::with_capacity(text.len()), |mut out, c| {
            if FORBIDDEN_CHARS.contains(&c) {
                out.push_str(&replacement);
            } else {
                out.push(c);
            }
            out
        })
        .trim()
        .to_string()
}

pub fn clean_artist(artist: &str) -> String {
    let artist = sanitize(artist, "");
    match artist.strip_suffix(TOPIC_SUFFIX) {
        Some(stripped) => stripped.trim_end().to_string(),
        None => artist,
    }
}

/// "Artist - Title" stem, safe to use as a file name
pub fn canonical_name(artist: &str, title: &str) -> String {
    format!("{} - {}", clean_artist(artist), sanitize(title, ""))
}

/// Canonical audio path next to `path`, keeping its (lowercased) extension
pub fn audio_target(path: &Path, meta: &TrackMetadata) -> PathBuf {
    let stem = canonical_name(&meta.artist, &meta.title);
    let ext = extension_of(path);
    let name = if ext.is_empty() {
        stem
    } else {
        format!("{}.{}", stem, ext)
    };
    sibling(path, name)
}

/// Canonical artwork path next to `path`; artwork is always named `.png`
pub fn artwork_target(path: &Path, meta: &TrackMetadata) -> PathBuf {
    sibling(path, format!("{}.png", canonical_name(&meta.artist, &meta.title)))
}

fn sibling(path: &Path, name: String) -> PathBuf {
    path.parent()
        .map(|parent| parent.join(&name))
        .unwrap_or_else(|| PathBuf::from(name))
}

/// Result of a rename attempt that did not fail outright
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rename {
    Renamed,
    AlreadyNamed,
    SourceMissing,
    TargetExists,
}

/// Rename unless the source is missing or the target is already taken
pub fn rename_if_free(from: &Path, to: &Path) -> io::Result<Rename> {
    if from == to {
        return Ok(Rename::AlreadyNamed);
    }
    if !from.exists() {
        return Ok(Rename::SourceMissing);
    }
    if to.exists() {
        return Ok(Rename::TargetExists);
    }
    std::fs::rename(from, to)?;
    Ok(Rename::Renamed)
}

pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
