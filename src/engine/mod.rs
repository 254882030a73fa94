//! ffmpeg subprocess boundary: transcoding, loudness measurement, artwork resizing

pub mod loudness;
pub mod settings;

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use thiserror::Error;
use tracing::debug;

use crate::metadata::ReplayGain;
pub use settings::{ConversionSettings, OutputFormat};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
}

/// The external tool that re-encodes audio, measures loudness and resizes artwork
pub trait MediaEngine {
    /// Re-encode `input` into `output` using the given settings
    fn transcode(&self, input: &Path, output: &Path, settings: &ConversionSettings) -> Result<(), EngineError>;

    /// Measure integrated loudness and true peak; `None` when the report has no result
    fn measure_loudness(&self, input: &Path) -> Result<Option<ReplayGain>, EngineError>;

    /// Scale and center-crop an image into a `size`×`size` square
    fn resize_artwork(&self, input: &Path, output: &Path, size: u32) -> Result<(), EngineError>;
}

/// Runs the ffmpeg binary as a blocking subprocess
#[derive(Debug, Clone)]
pub struct Ffmpeg {
    binary: PathBuf,
}

impl Ffmpeg {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn program(&self) -> String {
        self.binary.display().to_string()
    }

    fn output(&self, args: &[OsString]) -> Result<Output, EngineError> {
        debug!("Running {} {:?}", self.program(), args);
        Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| EngineError::Spawn {
                program: self.program(),
                source,
            })
    }

    /// Run to completion, turning a non-zero exit into an error carrying stderr
    fn run(&self, args: &[OsString]) -> Result<(), EngineError> {
        let output = self.output(args)?;
        if output.status.success() {
            Ok(())
        } else {
            Err(EngineError::Failed {
                program: self.program(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

impl Default for Ffmpeg {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl MediaEngine for Ffmpeg {
    fn transcode(&self, input: &Path, output: &Path, settings: &ConversionSettings) -> Result<(), EngineError> {
        let mut args: Vec<OsString> = ["-y", "-loglevel", "error", "-i"]
            .iter()
            .map(OsString::from)
            .collect();
        args.push(input.into());
        args.extend(settings.output_args().into_iter().map(OsString::from));
        args.push(output.into());
        self.run(&args)
    }

    fn measure_loudness(&self, input: &Path) -> Result<Option<ReplayGain>, EngineError> {
        let mut args: Vec<OsString> = ["-hide_banner", "-nostats", "-i"]
            .iter()
            .map(OsString::from)
            .collect();
        args.push(input.into());
        args.extend(
            ["-filter:a", "ebur128=peak=true", "-f", "null", "-"]
                .iter()
                .map(OsString::from),
        );

        // The summary is printed on stderr whatever the exit status
        let output = self.output(&args)?;
        let report = String::from_utf8_lossy(&output.stderr);
        Ok(loudness::analyze_report(&report))
    }

    fn resize_artwork(&self, input: &Path, output: &Path, size: u32) -> Result<(), EngineError> {
        let filter = format!(
            "scale={size}:{size}:force_original_aspect_ratio=increase,crop={size}:{size}"
        );
        let mut args: Vec<OsString> = ["-y", "-loglevel", "error", "-i"]
            .iter()
            .map(OsString::from)
            .collect();
        args.push(input.into());
        args.extend(
            ["-vf", filter.as_str(), "-frames:v", "1", "-f", "image2"]
                .iter()
                .map(OsString::from),
        );
        args.push(output.into());
        self.run(&args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary_is_spawn_error() {
        let engine = Ffmpeg::new("/nonexistent/bin/ffmpeg");
        let result = engine.measure_loudness(Path::new("/nonexistent/song.mp3"));
        assert!(matches!(result, Err(EngineError::Spawn { .. })));

        let result = engine.transcode(
            Path::new("/nonexistent/in.flac"),
            Path::new("/nonexistent/out.mp3"),
            &ConversionSettings::default(),
        );
        assert!(matches!(result, Err(EngineError::Spawn { .. })));
    }
}
