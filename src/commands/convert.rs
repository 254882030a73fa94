use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use tracing::warn;

use crate::cli::ConvertArgs;
use crate::config::{Config, StepsConfig};
use crate::engine::{ConversionSettings, Ffmpeg};
use crate::lookup::{Enricher, LookupCache, MusicBrainzClient};
use crate::organize::naming::display_name;
use crate::pipeline::{run_batch, BatchOptions, BatchReport, FileReport, StepOutcome};

/// Run the convert command with config values overridden by CLI flags
pub fn run(args: &ConvertArgs, quiet: bool) -> Result<()> {
    let config = Config::load()?;

    let settings = ConversionSettings::new(
        config.format(args.format),
        config.sample_rate(args.sample_rate),
        config.channels(args.channels),
        &config.bitrate(args.bitrate.as_deref()),
        config.conversion.preserve_metadata && !args.no_preserve_metadata,
    );

    let steps = StepsConfig {
        convert_artwork: config.steps.convert_artwork && !args.no_artwork_convert,
        rename: config.steps.rename && !args.no_rename,
        modify_metadata: config.steps.modify_metadata && !args.no_metadata,
        bypass: config.steps.bypass || args.bypass,
    };

    execute(&args.dir, &config, settings, &steps, args.offline, quiet)?;
    Ok(())
}

/// Run one batch over `dir`; shared by `convert` and the interactive menu
pub fn execute(
    dir: &Path,
    config: &Config,
    settings: ConversionSettings,
    steps: &StepsConfig,
    offline: bool,
    quiet: bool,
) -> Result<BatchReport> {
    let input_dir = dir
        .canonicalize()
        .with_context(|| format!("Cannot open directory {}", dir.display()))?;

    let mut options = BatchOptions::new(&input_dir, settings);
    options.output_dir = Config::resolve(&input_dir, &config.paths.output_dir);
    options.artwork_dir = Config::resolve(&input_dir, &config.paths.artwork_dir);
    options.artwork_size = config.engine.artwork_size;
    options.bypass = steps.bypass;
    options.convert_artwork = steps.convert_artwork;
    options.rename = steps.rename;
    options.modify_metadata = steps.modify_metadata;

    let engine = Ffmpeg::new(&config.engine.ffmpeg);

    let source = if steps.modify_metadata && config.lookup.enabled && !offline {
        match MusicBrainzClient::new(&config.lookup.base_url, &config.lookup.contact) {
            Ok(client) => Some(client),
            Err(e) => {
                warn!("MusicBrainz lookups disabled: {}", e);
                None
            }
        }
    } else {
        None
    };
    let cache = LookupCache::load(Config::resolve(&input_dir, &config.paths.cache_file));
    let mut enricher = Enricher::new(source, cache, config.lookup.limit);

    if !quiet {
        print_header(&input_dir, &options);
    }

    let report = run_batch(&engine, &mut enricher, &options, |file, index, total| {
        print_file(file, index, total, quiet)
    })?;

    if report.is_empty() {
        println!("{}", "No compatible audio files found to work with.".yellow());
        return Ok(report);
    }

    print_summary(&report, quiet);
    Ok(report)
}

fn print_header(input_dir: &Path, options: &BatchOptions) {
    let settings = &options.settings;
    println!("{} {}", "Batch:".bold(), input_dir.display());
    if options.bypass {
        println!("  {}", "conversion bypassed, copying sources".dimmed());
    } else {
        println!(
            "  {} {} Hz, {} ch, {}",
            settings.format.as_str().cyan(),
            settings.sample_rate,
            settings.channels,
            if settings.format.uses_quality_factor() {
                "VBR".to_string()
            } else {
                settings.bitrate.clone()
            }
        );
    }
    println!();
}

fn print_file(file: &FileReport, index: usize, total: usize, quiet: bool) {
    for (step, outcome) in &file.steps {
        let line = match outcome {
            StepOutcome::Done(msg) if !quiet => format!("{} {}", "✓".green(), msg),
            StepOutcome::Skipped(msg) if !quiet => format!("{} {}", "-".yellow(), msg.dimmed()),
            StepOutcome::Failed(msg) => format!("{} {}", "✗".red(), msg.red()),
            _ => continue,
        };
        println!("  {:>10}: {}", step.label().cyan(), line);
    }

    let percent = index as f64 / total as f64 * 100.0;
    println!(
        "[{}/{}] {} ({:.1}%)",
        index,
        total,
        display_name(&file.source).bold(),
        percent
    );
}

fn print_summary(report: &BatchReport, quiet: bool) {
    println!();
    let failed = report.failed_files();
    let outputs = report.outputs();
    if failed == 0 {
        println!(
            "{} Batch finished: {} file(s) processed, {} output(s) produced",
            "✓".green(),
            report.files.len(),
            outputs.len()
        );
    } else {
        println!(
            "{} Batch finished: {} file(s) processed, {} output(s) produced, {} with errors",
            "!".yellow(),
            report.files.len(),
            outputs.len(),
            failed
        );
    }

    if !quiet {
        for output in outputs {
            println!("  {}", output.display());
        }
    }
}
