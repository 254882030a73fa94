use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::engine::settings::{DEFAULT_BITRATE, DEFAULT_CHANNELS, DEFAULT_SAMPLE_RATE};
use crate::engine::OutputFormat;
use crate::lookup::api::DEFAULT_BASE_URL;
use crate::pipeline::DEFAULT_ARTWORK_SIZE;

/// Application configuration loaded from ~/.config/batchtag/config.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub conversion: ConversionConfig,
    #[serde(default)]
    pub steps: StepsConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub lookup: LookupConfig,
}

/// Encoder parameters; out-of-range values fall back to defaults with a warning
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConversionConfig {
    pub format: OutputFormat,
    pub sample_rate: u32,
    pub bitrate: String,
    pub channels: u8,
    pub preserve_metadata: bool,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            sample_rate: DEFAULT_SAMPLE_RATE,
            bitrate: DEFAULT_BITRATE.to_string(),
            channels: DEFAULT_CHANNELS,
            preserve_metadata: true,
        }
    }
}

/// Which per-file steps run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StepsConfig {
    pub convert_artwork: bool,
    pub rename: bool,
    pub modify_metadata: bool,
    /// Copy files instead of transcoding
    pub bypass: bool,
}

impl Default for StepsConfig {
    fn default() -> Self {
        Self {
            convert_artwork: true,
            rename: true,
            modify_metadata: true,
            bypass: false,
        }
    }
}

/// Output locations, relative paths resolved against the input directory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PathsConfig {
    pub output_dir: PathBuf,
    pub artwork_dir: PathBuf,
    pub cache_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("Output"),
            artwork_dir: PathBuf::from("Artwork"),
            cache_file: PathBuf::from("mb_cache.json"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// ffmpeg binary, looked up on PATH when not absolute
    pub ffmpeg: PathBuf,
    /// Edge length of the square artwork
    pub artwork_size: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            artwork_size: DEFAULT_ARTWORK_SIZE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LookupConfig {
    /// Query MusicBrainz; when false only cached recordings are used
    pub enabled: bool,
    /// Contact URL or e-mail sent in the User-Agent
    pub contact: String,
    /// Candidates requested per search
    pub limit: usize,
    pub base_url: String,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            contact: "https://github.com/batchtag/batchtag".to_string(),
            limit: 5,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default path (~/.config/batchtag/config.toml)
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;

        toml::from_str(&content).with_context(|| format!("Failed to parse {:?}", path))
    }

    /// Get the default config file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(config_dir.join("batchtag").join("config.toml"))
    }

    /// Output format, with CLI override taking precedence
    pub fn format(&self, cli_override: Option<OutputFormat>) -> OutputFormat {
        cli_override.unwrap_or(self.conversion.format)
    }

    /// Sample rate, with CLI override taking precedence
    pub fn sample_rate(&self, cli_override: Option<u32>) -> u32 {
        cli_override.unwrap_or(self.conversion.sample_rate)
    }

    /// Bitrate, with CLI override taking precedence
    pub fn bitrate(&self, cli_override: Option<&str>) -> String {
        cli_override
            .map(String::from)
            .unwrap_or_else(|| self.conversion.bitrate.clone())
    }

    /// Channel count, with CLI override taking precedence
    pub fn channels(&self, cli_override: Option<u8>) -> u8 {
        cli_override.unwrap_or(self.conversion.channels)
    }

    /// Resolve a configured path against the input directory
    pub fn resolve(input_dir: &Path, configured: &Path) -> PathBuf {
        if configured.is_absolute() {
            configured.to_path_buf()
        } else {
            input_dir.join(configured)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.conversion.format, OutputFormat::Mp3);
        assert_eq!(config.paths.cache_file, PathBuf::from("mb_cache.json"));
        assert_eq!(config.engine.artwork_size, 1000);
        assert_eq!(config.lookup.limit, 5);
    }

    #[test]
    fn test_load_partial_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[conversion]
format = "flac"
sample_rate = 44100

[steps]
bypass = true

[lookup]
contact = "me@example.com"
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.conversion.format, OutputFormat::Flac);
        assert_eq!(config.conversion.sample_rate, 44100);
        // Unset keys keep their defaults
        assert_eq!(config.conversion.bitrate, "192k");
        assert!(config.steps.bypass);
        assert!(config.steps.rename);
        assert_eq!(config.lookup.contact, "me@example.com");
        assert!(config.lookup.enabled);
    }

    #[test]
    fn test_invalid_format_is_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[conversion]\nformat = \"mp4\"\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        config.conversion.format = OutputFormat::Opus;
        config.conversion.bitrate = "128k".to_string();

        // CLI override takes precedence
        assert_eq!(config.format(Some(OutputFormat::Ogg)), OutputFormat::Ogg);
        assert_eq!(config.bitrate(Some("320k")), "320k");
        assert_eq!(config.sample_rate(Some(96000)), 96000);
        assert_eq!(config.channels(Some(1)), 1);

        // Falls back to config when no CLI override
        assert_eq!(config.format(None), OutputFormat::Opus);
        assert_eq!(config.bitrate(None), "128k");
        assert_eq!(config.sample_rate(None), 48000);
        assert_eq!(config.channels(None), 2);
    }

    #[test]
    fn test_resolve_paths() {
        let input = Path::new("/music/inbox");
        assert_eq!(
            Config::resolve(input, Path::new("Output")),
            PathBuf::from("/music/inbox/Output")
        );
        assert_eq!(
            Config::resolve(input, Path::new("/srv/cache.json")),
            PathBuf::from("/srv/cache.json")
        );
    }
}
