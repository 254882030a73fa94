//! Uniform tag access over ID3v2, MP4 atoms, Vorbis comments and untagged WAV

mod atom;
mod comment;
mod fields;
mod frame;

use std::path::{Path, PathBuf};
use thiserror::Error;

pub use atom::AtomTags;
pub use comment::CommentTags;
pub use fields::{CoverArt, ReplayGain, TrackMetadata};
pub use frame::FrameTags;

/// Extensions the tag layer (and the batch) understands
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "flac", "m4a", "opus", "ogg", "wav", "aac"];

#[derive(Debug, Error)]
pub enum TagError {
    #[error("Unsupported format: .{0}")]
    UnsupportedFormat(String),

    #[error("{} does not support metadata", .0.display())]
    MetadataUnsupported(PathBuf),

    #[error("ID3 error: {0}")]
    Id3(#[from] id3::Error),

    #[error("MP4 error: {0}")]
    Mp4(#[from] mp4ameta::Error),

    #[error("Tag error: {0}")]
    Lofty(#[from] lofty::error::LoftyError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Operations every tag family implements
pub trait TagContainer {
    /// Extract the core text fields, substituting defaults when absent
    fn read_core(&self) -> TrackMetadata;

    /// The embedded front cover, if any
    fn extract_cover_art(&self) -> Option<CoverArt>;

    /// Replace album/year/genre/replay-gain (and the front cover when `cover_path` exists)
    fn write_core(&mut self, meta: &TrackMetadata, cover_path: Option<&Path>) -> Result<(), TagError>;

    /// Persist pending mutations in the format's native layout
    fn save(&mut self) -> Result<(), TagError>;
}

/// WAV files carry no tags we write
#[derive(Debug)]
pub struct NoTags {
    path: PathBuf,
}

impl TagContainer for NoTags {
    fn read_core(&self) -> TrackMetadata {
        TrackMetadata::default()
    }

    fn extract_cover_art(&self) -> Option<CoverArt> {
        None
    }

    fn write_core(&mut self, _meta: &TrackMetadata, _cover_path: Option<&Path>) -> Result<(), TagError> {
        Err(TagError::MetadataUnsupported(self.path.clone()))
    }

    fn save(&mut self) -> Result<(), TagError> {
        Err(TagError::MetadataUnsupported(self.path.clone()))
    }
}

/// An open tag container for one file, selected by extension
pub enum TagHandle {
    Frame(FrameTags),
    Atom(AtomTags),
    Comment(CommentTags),
    NoTags(NoTags),
}

impl TagHandle {
    /// Open the tag container for `path`, choosing the family by file extension
    pub fn open(path: &Path) -> Result<Self, TagError> {
        let ext = extension_of(path);
        match ext.as_str() {
            "mp3" => Ok(Self::Frame(FrameTags::open(path)?)),
            "m4a" | "aac" => Ok(Self::Atom(AtomTags::open(path)?)),
            "flac" | "opus" | "ogg" => Ok(Self::Comment(CommentTags::open(path)?)),
            "wav" => Ok(Self::NoTags(NoTags {
                path: path.to_path_buf(),
            })),
            _ => Err(TagError::UnsupportedFormat(ext)),
        }
    }

    /// Whether this file can hold metadata at all
    pub fn supports_metadata(&self) -> bool {
        !matches!(self, Self::NoTags(_))
    }

    fn container(&self) -> &dyn TagContainer {
        match self {
            Self::Frame(t) => t,
            Self::Atom(t) => t,
            Self::Comment(t) => t,
            Self::NoTags(t) => t,
        }
    }

    fn container_mut(&mut self) -> &mut dyn TagContainer {
        match self {
            Self::Frame(t) => t,
            Self::Atom(t) => t,
            Self::Comment(t) => t,
            Self::NoTags(t) => t,
        }
    }

    pub fn read_core(&self) -> TrackMetadata {
        self.container().read_core()
    }

    pub fn extract_cover_art(&self) -> Option<CoverArt> {
        self.container().extract_cover_art()
    }

    pub fn write_core(&mut self, meta: &TrackMetadata, cover_path: Option<&Path>) -> Result<(), TagError> {
        self.container_mut().write_core(meta, cover_path)
    }

    pub fn save(&mut self) -> Result<(), TagError> {
        self.container_mut().save()
    }
}

/// Lowercased extension without the dot ("" when there is none)
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Check if a path has one of the supported audio extensions
pub fn is_audio_file(path: &Path) -> bool {
    AUDIO_EXTENSIONS.contains(&extension_of(path).as_str())
}

/// Whether files with this extension can hold tags (WAV cannot)
pub fn carries_tags(path: &Path) -> bool {
    is_audio_file(path) && extension_of(path) != "wav"
}

/// Read the cover image that `write_core` should embed, if the path exists
fn read_cover(cover_path: Option<&Path>) -> Result<Option<CoverArt>, TagError> {
    match cover_path {
        Some(path) if path.exists() => Ok(Some(CoverArt::from_bytes(std::fs::read(path)?))),
        _ => Ok(None),
    }
}
