use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::engine::OutputFormat;

#[derive(Parser)]
#[command(name = "batchtag")]
#[command(about = "Batch-convert audio files and normalize their tags, artwork, loudness and file names")]
#[command(version)]
pub struct Cli {
    /// Runs the interactive menu when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Increase output verbosity
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose settings from a numbered menu, then run the batch in the current directory
    Menu,

    /// Convert and tag every audio file in a directory
    Convert(ConvertArgs),

    /// Display the normalized metadata of an audio file
    Show {
        /// Path to the audio file
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a config file interactively
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Flags for `convert`; anything not given comes from the config file
#[derive(Args, Debug, Default)]
pub struct ConvertArgs {
    /// Directory containing the audio files (not searched recursively)
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Output sample rate in Hz
    #[arg(long)]
    pub sample_rate: Option<u32>,

    /// Output bitrate, e.g. 192k (ignored for m4a/aac)
    #[arg(long)]
    pub bitrate: Option<String>,

    /// Output channel count (1 or 2)
    #[arg(long)]
    pub channels: Option<u8>,

    /// Drop the source's metadata while transcoding
    #[arg(long)]
    pub no_preserve_metadata: bool,

    /// Keep artwork at its original size
    #[arg(long)]
    pub no_artwork_convert: bool,

    /// Keep output file names as they are
    #[arg(long)]
    pub no_rename: bool,

    /// Skip loudness analysis, lookups and tag writing
    #[arg(long)]
    pub no_metadata: bool,

    /// Only query the lookup cache, never MusicBrainz
    #[arg(long)]
    pub offline: bool,

    /// Copy files as they are instead of transcoding
    #[arg(long)]
    pub bypass: bool,
}
