use lofty::config::{ParseOptions, WriteOptions};
use lofty::picture::{MimeType, Picture, PictureType};
use lofty::prelude::*;
use lofty::probe::Probe;
use lofty::tag::{ItemKey, Tag, TagType};
use std::path::{Path, PathBuf};

use super::{read_cover, CoverArt, ReplayGain, TagContainer, TagError, TrackMetadata};

/// Vorbis comments on FLAC, Opus and Ogg Vorbis files.
///
/// FLAC pictures are stored in native PICTURE blocks; Ogg containers have no
/// picture slot, so lofty writes them as base64 `METADATA_BLOCK_PICTURE` comments.
pub struct CommentTags {
    path: PathBuf,
    tag: Tag,
}

impl CommentTags {
    pub fn open(path: &Path) -> Result<Self, TagError> {
        let mut tagged_file = Probe::open(path)?
            .options(ParseOptions::new().read_properties(false))
            .read()?;

        let tag = tagged_file
            .remove(TagType::VorbisComments)
            .unwrap_or_else(|| Tag::new(TagType::VorbisComments));

        Ok(Self {
            path: path.to_path_buf(),
            tag,
        })
    }
}

impl TagContainer for CommentTags {
    fn read_core(&self) -> TrackMetadata {
        let year = self
            .tag
            .get_string(ItemKey::RecordingDate)
            .or_else(|| self.tag.get_string(ItemKey::Year));

        let mut meta = TrackMetadata::from_raw(
            self.tag.artist().as_deref(),
            self.tag.title().as_deref(),
            self.tag.album().as_deref(),
            year,
            self.tag.genre().as_deref(),
        );
        meta.replay_gain = ReplayGain::parse(
            self.tag.get_string(ItemKey::ReplayGainTrackGain),
            self.tag.get_string(ItemKey::ReplayGainTrackPeak),
        );
        meta
    }

    fn extract_cover_art(&self) -> Option<CoverArt> {
        self.tag
            .pictures()
            .iter()
            .find(|p| p.pic_type() == PictureType::CoverFront)
            .map(|p| {
                let mut art = CoverArt::from_bytes(p.data().to_vec());
                if let Some(mime) = p.mime_type() {
                    art.mime_type = mime.as_str().to_string();
                }
                art
            })
    }

    fn write_core(&mut self, meta: &TrackMetadata, cover_path: Option<&Path>) -> Result<(), TagError> {
        let cover = read_cover(cover_path)?;

        for key in [
            ItemKey::AlbumTitle,
            ItemKey::RecordingDate,
            ItemKey::Year,
            ItemKey::Genre,
            ItemKey::ReplayGainTrackGain,
            ItemKey::ReplayGainTrackPeak,
        ] {
            self.tag.remove_key(key);
        }

        for (key, value) in [
            (ItemKey::TrackArtist, &meta.artist),
            (ItemKey::TrackTitle, &meta.title),
            (ItemKey::AlbumTitle, &meta.album),
            (ItemKey::RecordingDate, &meta.year),
            (ItemKey::Genre, &meta.genre),
        ] {
            if !value.is_empty() {
                self.tag.insert_text(key, value.clone());
            }
        }

        if let Some(rg) = meta.replay_gain {
            self.tag
                .insert_text(ItemKey::ReplayGainTrackGain, rg.gain_text());
            self.tag
                .insert_text(ItemKey::ReplayGainTrackPeak, rg.peak_text());
        }

        if let Some(cover) = cover {
            let picture = Picture::unchecked(cover.data)
                .pic_type(PictureType::CoverFront)
                .mime_type(MimeType::from_str(&cover.mime_type))
                .build();
            self.tag.remove_picture_type(PictureType::CoverFront);
            self.tag.push_picture(picture);
        }

        Ok(())
    }

    fn save(&mut self) -> Result<(), TagError> {
        self.tag.save_to_path(&self.path, WriteOptions::default())?;
        Ok(())
    }
}
