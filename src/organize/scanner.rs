use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::metadata::is_audio_file;

/// Sidecar image extensions, in lookup order
pub const ARTWORK_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// One audio file to process, with its sidecar artwork if present
#[derive(Debug, Clone, PartialEq)]
pub struct BatchItem {
    pub source: PathBuf,
    pub artwork: Option<PathBuf>,
}

impl BatchItem {
    pub fn stem(&self) -> String {
        self.source
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    pub fn file_name(&self) -> String {
        self.source
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// List supported audio files directly inside `dir` (no recursion), sorted by path
pub fn discover(dir: &Path) -> Result<Vec<BatchItem>> {
    let mut items = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to list {}", dir.display()))?;
        let path = entry.path();

        if entry.file_type().is_file() && is_audio_file(path) {
            items.push(BatchItem {
                source: path.to_path_buf(),
                artwork: find_sidecar_artwork(path),
            });
        }
    }

    items.sort_by(|a, b| a.source.cmp(&b.source));
    Ok(items)
}

/// For "song.mp3", the first of "song.png", "song.jpg", "song.jpeg" that exists
fn find_sidecar_artwork(audio_path: &Path) -> Option<PathBuf> {
    let parent = audio_path.parent()?;
    let stem = audio_path.file_stem()?.to_string_lossy();

    ARTWORK_EXTENSIONS
        .iter()
        .map(|ext| parent.join(format!("{}.{}", stem, ext)))
        .find(|candidate| candidate.is_file())
}
