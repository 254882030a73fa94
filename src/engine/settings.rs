//! Output format and encoder parameters for the transcoding engine

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const SAMPLE_RATES: &[u32] = &[
    8000, 11025, 16000, 22050, 32000, 44100, 48000, 88200, 96000, 176000, 192000, 352000, 384000,
];
pub const BITRATES: &[&str] = &["64k", "96k", "128k", "192k", "256k", "320k"];

pub const DEFAULT_SAMPLE_RATE: u32 = 48000;
pub const DEFAULT_CHANNELS: u8 = 2;
pub const DEFAULT_BITRATE: &str = "192k";

/// Audio formats the batch can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Mp3,
    Flac,
    M4a,
    Opus,
    Ogg,
    Wav,
    Aac,
}

impl OutputFormat {
    /// File extension and user-facing name
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Mp3 => "mp3",
            OutputFormat::Flac => "flac",
            OutputFormat::M4a => "m4a",
            OutputFormat::Opus => "opus",
            OutputFormat::Ogg => "ogg",
            OutputFormat::Wav => "wav",
            OutputFormat::Aac => "aac",
        }
    }

    /// Parse a format name, case-insensitively
    pub fn parse(name: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(name.trim(), true).ok()
    }

    /// ffmpeg encoder for this format
    pub fn codec(&self) -> &'static str {
        match self {
            OutputFormat::Mp3 => "libmp3lame",
            OutputFormat::Flac => "flac",
            OutputFormat::M4a | OutputFormat::Aac => "aac",
            OutputFormat::Opus => "libopus",
            OutputFormat::Ogg => "libvorbis",
            OutputFormat::Wav => "pcm_s16le",
        }
    }

    /// ffmpeg muxer name (`-f`)
    pub fn container(&self) -> &'static str {
        match self {
            OutputFormat::M4a => "mp4",
            other => other.as_str(),
        }
    }

    /// AAC encodes use a VBR quality factor instead of a fixed bitrate
    pub fn uses_quality_factor(&self) -> bool {
        matches!(self, OutputFormat::M4a | OutputFormat::Aac)
    }
}

/// Validated encoder parameters for one batch run
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionSettings {
    pub format: OutputFormat,
    pub sample_rate: u32,
    pub channels: u8,
    pub bitrate: String,
    /// Carry the source's metadata into the transcoded file
    pub preserve_metadata: bool,
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            sample_rate: DEFAULT_SAMPLE_RATE,
            channels: DEFAULT_CHANNELS,
            bitrate: DEFAULT_BITRATE.to_string(),
            preserve_metadata: true,
        }
    }
}

impl ConversionSettings {
    /// Build settings, replacing out-of-range values with the defaults
    pub fn new(
        format: OutputFormat,
        sample_rate: u32,
        channels: u8,
        bitrate: &str,
        preserve_metadata: bool,
    ) -> Self {
        let sample_rate = if SAMPLE_RATES.contains(&sample_rate) {
            sample_rate
        } else {
            warn!(
                "Invalid sample rate {}, defaulting to {} Hz",
                sample_rate, DEFAULT_SAMPLE_RATE
            );
            DEFAULT_SAMPLE_RATE
        };

        let channels = if matches!(channels, 1 | 2) {
            channels
        } else {
            warn!("Invalid channel count {}, defaulting to stereo", channels);
            DEFAULT_CHANNELS
        };

        let bitrate = if BITRATES.contains(&bitrate) {
            bitrate.to_string()
        } else {
            warn!("Invalid bitrate {:?}, defaulting to {}", bitrate, DEFAULT_BITRATE);
            DEFAULT_BITRATE.to_string()
        };

        Self {
            format,
            sample_rate,
            channels,
            bitrate,
            preserve_metadata,
        }
    }

    /// Output arguments placed between the input and output paths
    pub fn output_args(&self) -> Vec<String> {
        let mut args = vec![
            "-vn".to_string(),
            "-map".to_string(),
            "0:a:0".to_string(),
            "-ar".to_string(),
            self.sample_rate.to_string(),
            "-ac".to_string(),
            self.channels.to_string(),
            "-acodec".to_string(),
            self.format.codec().to_string(),
        ];

        if self.format.uses_quality_factor() {
            args.extend(["-q:a".to_string(), "2".to_string()]);
        } else {
            args.extend(["-b:a".to_string(), self.bitrate.clone()]);
        }

        if !self.preserve_metadata {
            args.extend(["-map_metadata".to_string(), "-1".to_string()]);
        }

        args.extend(["-f".to_string(), self.format.container().to_string()]);
        args
    }
}
