use mp4ameta::{Data, FreeformIdent, Img, ImgFmt, Tag};
use std::path::{Path, PathBuf};

use super::{read_cover, CoverArt, ReplayGain, TagContainer, TagError, TrackMetadata};

const ITUNES_MEAN: &str = "com.apple.iTunes";
const GAIN_NAME: &str = "replaygain_track_gain";
const PEAK_NAME: &str = "replaygain_track_peak";

/// MP4 ilst atoms on an m4a/aac file
pub struct AtomTags {
    path: PathBuf,
    tag: Tag,
}

impl AtomTags {
    pub fn open(path: &Path) -> Result<Self, TagError> {
        let tag = Tag::read_from_path(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            tag,
        })
    }

    fn freeform(&self, name: &str) -> Option<String> {
        let ident = FreeformIdent::new(ITUNES_MEAN, name);
        let value = self.tag.strings_of(&ident).next().map(String::from);
        value
    }
}

impl TagContainer for AtomTags {
    fn read_core(&self) -> TrackMetadata {
        let mut meta = TrackMetadata::from_raw(
            self.tag.artist(),
            self.tag.title(),
            self.tag.album(),
            self.tag.year(),
            self.tag.genre(),
        );
        meta.replay_gain = ReplayGain::parse(
            self.freeform(GAIN_NAME).as_deref(),
            self.freeform(PEAK_NAME).as_deref(),
        );
        meta
    }

    fn extract_cover_art(&self) -> Option<CoverArt> {
        self.tag.artwork().map(|art| {
            let mime_type = match art.fmt {
                ImgFmt::Jpeg => "image/jpeg",
                ImgFmt::Png => "image/png",
                ImgFmt::Bmp => "image/bmp",
            };
            CoverArt {
                data: art.data.to_vec(),
                mime_type: mime_type.to_string(),
            }
        })
    }

    fn write_core(&mut self, meta: &TrackMetadata, cover_path: Option<&Path>) -> Result<(), TagError> {
        let cover = read_cover(cover_path)?;
        let gain_ident = FreeformIdent::new(ITUNES_MEAN, GAIN_NAME);
        let peak_ident = FreeformIdent::new(ITUNES_MEAN, PEAK_NAME);

        self.tag.remove_album();
        self.tag.remove_year();
        self.tag.remove_genres();
        self.tag.remove_data_of(&gain_ident);
        self.tag.remove_data_of(&peak_ident);

        if !meta.artist.is_empty() {
            self.tag.set_artist(&meta.artist);
        }
        if !meta.title.is_empty() {
            self.tag.set_title(&meta.title);
        }
        if !meta.album.is_empty() {
            self.tag.set_album(&meta.album);
        }
        if !meta.year.is_empty() {
            self.tag.set_year(&meta.year);
        }
        if !meta.genre.is_empty() {
            self.tag.set_genre(&meta.genre);
        }

        if let Some(rg) = meta.replay_gain {
            self.tag.set_data(gain_ident, Data::Utf8(rg.gain_text()));
            self.tag.set_data(peak_ident, Data::Utf8(rg.peak_text()));
        }

        if let Some(cover) = cover {
            let fmt = match cover.mime_type.as_str() {
                "image/jpeg" => ImgFmt::Jpeg,
                "image/bmp" => ImgFmt::Bmp,
                _ => ImgFmt::Png,
            };
            self.tag.set_artwork(Img::new(fmt, cover.data));
        }

        Ok(())
    }

    fn save(&mut self) -> Result<(), TagError> {
        self.tag.write_to_path(&self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn atom(name: &[u8; 4], content: &[u8]) -> Vec<u8> {
        let mut bytes = ((content.len() + 8) as u32).to_be_bytes().to_vec();
        bytes.extend_from_slice(name);
        bytes.extend_from_slice(content);
        bytes
    }

    /// An `ftyp` brand and an empty `moov`; enough for an ilst to be added
    fn minimal_m4a(dir: &TempDir) -> PathBuf {
        let mut bytes = atom(b"ftyp", b"M4A \0\0\0\0M4A isom");
        bytes.extend(atom(b"moov", &[]));

        let path = dir.path().join("track.m4a");
        std::fs::write(&path, bytes).unwrap();
        path
    }

    fn sample_metadata() -> TrackMetadata {
        TrackMetadata {
            artist: "Björk".to_string(),
            title: "Hyperballad".to_string(),
            album: "Post".to_string(),
            year: "1995".to_string(),
            genre: "Electronic".to_string(),
            cover_art: None,
            replay_gain: Some(ReplayGain {
                gain_db: -4.5,
                peak_db: -0.75,
            }),
        }
    }

    #[test]
    fn test_untagged_m4a_reads_defaults() {
        let temp = TempDir::new().unwrap();
        let tags = AtomTags::open(&minimal_m4a(&temp)).unwrap();
        assert_eq!(tags.read_core(), TrackMetadata::default());
        assert!(tags.extract_cover_art().is_none());
    }

    #[test]
    fn test_saved_atoms_survive_reopen() {
        let temp = TempDir::new().unwrap();
        let path = minimal_m4a(&temp);
        let cover = temp.path().join("cover.png");
        std::fs::write(&cover, [0x89, b'P', b'N', b'G', 0x0D, 0x0A]).unwrap();

        let mut tags = AtomTags::open(&path).unwrap();
        tags.write_core(&sample_metadata(), Some(&cover)).unwrap();
        assert_eq!(tags.read_core(), sample_metadata());
        tags.save().unwrap();

        let reopened = AtomTags::open(&path).unwrap();
        assert_eq!(reopened.read_core(), sample_metadata());
        let art = reopened.extract_cover_art().unwrap();
        assert_eq!(art.mime_type, "image/png");
    }

    #[test]
    fn test_rewrite_clears_album_and_gain() {
        let temp = TempDir::new().unwrap();
        let mut tags = AtomTags::open(&minimal_m4a(&temp)).unwrap();
        tags.write_core(&sample_metadata(), None).unwrap();

        let mut second = sample_metadata();
        second.album = String::new();
        second.replay_gain = None;
        tags.write_core(&second, None).unwrap();

        let meta = tags.read_core();
        assert!(meta.album.is_empty());
        assert!(meta.replay_gain.is_none());
        assert_eq!(meta.title, "Hyperballad");
    }

    #[test]
    fn test_open_nonexistent_file_returns_error() {
        let result = AtomTags::open(Path::new("/nonexistent/file.m4a"));
        assert!(result.is_err());
    }

    #[test]
    fn test_open_non_mp4_content_returns_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("raw.aac");
        std::fs::write(&path, [0xFF, 0xF1, 0x50, 0x80, 0x02, 0x1F, 0xFC]).unwrap();
        assert!(AtomTags::open(&path).is_err());
    }
}
