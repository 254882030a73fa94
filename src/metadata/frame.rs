use id3::frame::{ExtendedText, Picture, PictureType};
use id3::{ErrorKind, Tag, TagLike, Version};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{read_cover, CoverArt, ReplayGain, TagContainer, TagError, TrackMetadata};

/// ID3v2 frames on an MP3 file
pub struct FrameTags {
    path: PathBuf,
    tag: Tag,
}

impl FrameTags {
    /// Read the ID3v2 tag; a file without one gets an empty tag instead of an error
    pub fn open(path: &Path) -> Result<Self, TagError> {
        let tag = match Tag::read_from_path(path) {
            Ok(tag) => tag,
            Err(e) if matches!(e.kind, ErrorKind::NoTag) => {
                debug!("No ID3 header in {}, starting from an empty tag", path.display());
                Tag::new()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path: path.to_path_buf(),
            tag,
        })
    }

    fn text(&self, id: &str) -> Option<&str> {
        self.tag.get(id).and_then(|frame| frame.content().text())
    }

    fn extended_text(&self, description: &str) -> Option<&str> {
        self.tag
            .extended_texts()
            .find(|t| t.description == description)
            .map(|t| t.value.as_str())
    }
}

impl TagContainer for FrameTags {
    fn read_core(&self) -> TrackMetadata {
        let mut meta = TrackMetadata::from_raw(
            self.text("TPE1"),
            self.text("TIT2"),
            self.text("TALB"),
            self.text("TDRC").or_else(|| self.text("TYER")),
            self.text("TCON"),
        );
        meta.replay_gain = ReplayGain::parse(
            self.extended_text(ReplayGain::GAIN_KEY),
            self.extended_text(ReplayGain::PEAK_KEY),
        );
        meta
    }

    fn extract_cover_art(&self) -> Option<CoverArt> {
        self.tag
            .pictures()
            .find(|p| p.picture_type == PictureType::CoverFront)
            .map(|p| CoverArt {
                data: p.data.clone(),
                mime_type: p.mime_type.clone(),
            })
    }

    fn write_core(&mut self, meta: &TrackMetadata, cover_path: Option<&Path>) -> Result<(), TagError> {
        let cover = read_cover(cover_path)?;

        for id in ["TALB", "TDRC", "TYER", "TCON"] {
            self.tag.remove(id);
        }
        self.tag.remove_extended_text(Some(ReplayGain::GAIN_KEY), None);
        self.tag.remove_extended_text(Some(ReplayGain::PEAK_KEY), None);

        for (id, value) in [
            ("TPE1", &meta.artist),
            ("TIT2", &meta.title),
            ("TALB", &meta.album),
            ("TDRC", &meta.year),
            ("TCON", &meta.genre),
        ] {
            if !value.is_empty() {
                self.tag.set_text(id, value.as_str());
            }
        }

        if let Some(rg) = meta.replay_gain {
            self.tag.add_frame(ExtendedText {
                description: ReplayGain::GAIN_KEY.to_string(),
                value: rg.gain_text(),
            });
            self.tag.add_frame(ExtendedText {
                description: ReplayGain::PEAK_KEY.to_string(),
                value: rg.peak_text(),
            });
        }

        if let Some(cover) = cover {
            self.tag.remove_picture_by_type(PictureType::CoverFront);
            self.tag.add_frame(Picture {
                mime_type: cover.mime_type,
                picture_type: PictureType::CoverFront,
                description: "Cover".to_string(),
                data: cover.data,
            });
        }

        Ok(())
    }

    fn save(&mut self) -> Result<(), TagError> {
        self.tag.write_to_path(&self.path, Version::Id3v24)?;
        Ok(())
    }
}
