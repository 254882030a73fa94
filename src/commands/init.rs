use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use colored::Colorize;
use std::io::{self, Write};

use crate::config::{Config, LookupConfig};
use crate::engine::OutputFormat;

/// Run the init command - interactively create a config file
pub fn run(force: bool) -> Result<()> {
    let config_path = Config::config_path()?;

    // Check if config already exists
    if config_path.exists() && !force {
        eprintln!(
            "{}: Config already exists at {}",
            "Error".red().bold(),
            config_path.display()
        );
        eprintln!();
        eprintln!("Use {} to overwrite.", "--force".cyan());
        bail!("Config file already exists");
    }

    println!("{}", "batchtag configuration".bold());
    println!();
    println!(
        "This will create a config file at: {}",
        config_path.display().to_string().cyan()
    );
    println!();

    let format = prompt_format()?;
    let contact = prompt_contact()?;

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {:?}", parent))?;
    }

    std::fs::write(&config_path, render_config(format, &contact))
        .with_context(|| format!("Failed to write {:?}", config_path))?;

    println!();
    println!(
        "{} Config written to {}",
        "✓".green(),
        config_path.display()
    );
    println!();
    println!("You can now use:");
    println!(
        "  {} - convert and tag every audio file in a directory",
        "batchtag convert --dir <dir>".cyan()
    );
    println!(
        "  {} - pick settings from a menu first",
        "batchtag".cyan()
    );

    Ok(())
}

/// The config file text, with every key spelled out at its default
fn render_config(format: OutputFormat, contact: &str) -> String {
    let defaults = Config::default();
    format!(
        r#"# batchtag configuration
# Relative paths are resolved against the directory being converted.

[conversion]
# mp3, flac, m4a, opus, ogg, wav or aac
format = "{format}"
sample_rate = {sample_rate}
# ignored for m4a/aac, which use a VBR quality factor
bitrate = "{bitrate}"
channels = {channels}
preserve_metadata = {preserve}

[steps]
convert_artwork = {convert_artwork}
rename = {rename}
modify_metadata = {modify_metadata}
bypass = {bypass}

[paths]
output_dir = "{output_dir}"
artwork_dir = "{artwork_dir}"
cache_file = "{cache_file}"

[engine]
ffmpeg = "{ffmpeg}"
artwork_size = {artwork_size}

[lookup]
enabled = {enabled}
# MusicBrainz asks every client to identify itself
contact = "{contact}"
limit = {limit}
base_url = "{base_url}"
"#,
        format = format.as_str(),
        sample_rate = defaults.conversion.sample_rate,
        bitrate = defaults.conversion.bitrate,
        channels = defaults.conversion.channels,
        preserve = defaults.conversion.preserve_metadata,
        convert_artwork = defaults.steps.convert_artwork,
        rename = defaults.steps.rename,
        modify_metadata = defaults.steps.modify_metadata,
        bypass = defaults.steps.bypass,
        output_dir = defaults.paths.output_dir.display(),
        artwork_dir = defaults.paths.artwork_dir.display(),
        cache_file = defaults.paths.cache_file.display(),
        ffmpeg = defaults.engine.ffmpeg.display(),
        artwork_size = defaults.engine.artwork_size,
        enabled = defaults.lookup.enabled,
        contact = contact.replace('\\', "\\\\").replace('"', "\\\""),
        limit = defaults.lookup.limit,
        base_url = defaults.lookup.base_url,
    )
}

fn prompt_format() -> Result<OutputFormat> {
    println!("{}", "Step 1: Choose the default output format".bold());
    println!();

    let names: Vec<&str> = OutputFormat::value_variants()
        .iter()
        .map(OutputFormat::as_str)
        .collect();
    println!("Available formats: {}", names.join(", ").cyan());
    println!();

    let default = OutputFormat::default();
    loop {
        print!("Enter output format [{}]: ", default.as_str().green());
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim();

        if input.is_empty() {
            println!();
            return Ok(default);
        }
        match OutputFormat::parse(input) {
            Some(format) => {
                println!();
                return Ok(format);
            }
            None => println!("{}: unknown format {:?}", "Note".yellow(), input),
        }
    }
}

fn prompt_contact() -> Result<String> {
    println!("{}", "Step 2: MusicBrainz contact".bold());
    println!();
    println!("MusicBrainz asks clients to send a contact URL or e-mail address.");
    println!();

    let default = LookupConfig::default().contact;
    print!("Enter contact [{}]: ", default.green());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    Ok(if input.is_empty() {
        default
    } else {
        input.to_string()
    })
}
