use serde::{Deserialize, Serialize};

pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Format-independent track metadata, normalized from whatever tag family a file carries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackMetadata {
    pub artist: String,
    pub title: String,
    pub album: String,
    /// Four-digit year, or empty
    pub year: String,
    pub genre: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_art: Option<CoverArt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replay_gain: Option<ReplayGain>,
}

impl Default for TrackMetadata {
    fn default() -> Self {
        Self {
            artist: UNKNOWN_ARTIST.to_string(),
            title: UNKNOWN_TITLE.to_string(),
            album: String::new(),
            year: String::new(),
            genre: String::new(),
            cover_art: None,
            replay_gain: None,
        }
    }
}

impl TrackMetadata {
    /// Build metadata from raw tag values, applying defaults and normalization
    pub fn from_raw(
        artist: Option<&str>,
        title: Option<&str>,
        album: Option<&str>,
        year: Option<&str>,
        genre: Option<&str>,
    ) -> Self {
        Self {
            artist: non_empty(artist).unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
            title: non_empty(title).unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            album: non_empty(album).unwrap_or_default(),
            year: year.map(normalize_year).unwrap_or_default(),
            genre: non_empty(genre).unwrap_or_default(),
            cover_art: None,
            replay_gain: None,
        }
    }
}

/// Embedded picture bytes and their MIME type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverArt {
    #[serde(skip)]
    pub data: Vec<u8>,
    pub mime_type: String,
}

impl CoverArt {
    /// Wrap raw image bytes, sniffing the MIME type from the file signature
    pub fn from_bytes(data: Vec<u8>) -> Self {
        let mime_type = sniff_mime(&data).to_string();
        Self { data, mime_type }
    }

    /// Human-readable summary used by `show`
    pub fn summary(&self) -> String {
        format!("embedded ({} bytes, {})", self.data.len(), self.mime_type)
    }
}

/// Track gain relative to the -18 LUFS reference, and true peak
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReplayGain {
    pub gain_db: f64,
    pub peak_db: f64,
}

impl ReplayGain {
    pub const GAIN_KEY: &'static str = "REPLAYGAIN_TRACK_GAIN";
    pub const PEAK_KEY: &'static str = "REPLAYGAIN_TRACK_PEAK";

    /// Tag value for the gain field, e.g. "5.00 dB"
    pub fn gain_text(&self) -> String {
        format!("{:.2} dB", self.gain_db)
    }

    /// Tag value for the peak field
    pub fn peak_text(&self) -> String {
        format!("{:.2}", self.peak_db)
    }

    /// Parse the two stored tag values back; both must be present and finite
    pub fn parse(gain: Option<&str>, peak: Option<&str>) -> Option<Self> {
        let gain_db: f64 = gain?
            .trim()
            .trim_end_matches("dB")
            .trim()
            .parse()
            .ok()?;
        let peak_db: f64 = peak?.trim().parse().ok()?;
        (gain_db.is_finite() && peak_db.is_finite()).then_some(Self { gain_db, peak_db })
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// Reduce a date-ish string ("2019-04-05", "2019") to its first run of four digits
pub fn normalize_year(value: &str) -> String {
    let mut digits = String::with_capacity(4);
    for c in value.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            if digits.len() == 4 {
                return digits;
            }
        } else {
            digits.clear();
        }
    }
    String::new()
}

fn sniff_mime(data: &[u8]) -> &'static str {
    if data.starts_with(&[0x89, b'P', b'N', b'G']) {
        "image/png"
    } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else if data.starts_with(b"BM") {
        "image/bmp"
    } else {
        "image/png"
    }
}
