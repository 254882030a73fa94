use anyhow::{bail, Result};
use clap::ValueEnum;
use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::config::{Config, StepsConfig};
use crate::engine::settings::{BITRATES, SAMPLE_RATES};
use crate::engine::{ConversionSettings, OutputFormat};

use super::convert;

/// Settings the menu edits before starting a batch
#[derive(Debug, Clone, PartialEq)]
struct MenuSettings {
    format: OutputFormat,
    sample_rate: u32,
    bitrate: String,
    channels: u8,
    preserve_metadata: bool,
    convert_artwork: bool,
    rename: bool,
    modify_metadata: bool,
}

impl MenuSettings {
    fn from_config(config: &Config) -> Self {
        Self {
            format: config.conversion.format,
            sample_rate: config.conversion.sample_rate,
            bitrate: config.conversion.bitrate.clone(),
            channels: config.conversion.channels,
            preserve_metadata: config.conversion.preserve_metadata,
            convert_artwork: config.steps.convert_artwork,
            rename: config.steps.rename,
            modify_metadata: config.steps.modify_metadata,
        }
    }
}

/// What the user picked at the top-level prompt
#[derive(Debug, PartialEq)]
enum MenuAction {
    Continue,
    Start { bypass: bool },
    Exit,
}

/// Run the interactive menu against the current directory
pub fn run(quiet: bool) -> Result<()> {
    let config = Config::load()?;
    let mut settings = MenuSettings::from_config(&config);
    let stdin = io::stdin();
    let mut input = stdin.lock();

    println!("{}", "batchtag".bold());
    println!();

    loop {
        print_menu(&settings);

        match handle_choice(&mut input, &mut settings)? {
            MenuAction::Continue => {}
            MenuAction::Exit => return Ok(()),
            MenuAction::Start { bypass } => {
                let conversion = ConversionSettings::new(
                    settings.format,
                    settings.sample_rate,
                    settings.channels,
                    &settings.bitrate,
                    settings.preserve_metadata,
                );
                let steps = StepsConfig {
                    convert_artwork: settings.convert_artwork,
                    rename: settings.rename,
                    modify_metadata: settings.modify_metadata,
                    bypass,
                };
                println!();
                convert::execute(Path::new("."), &config, conversion, &steps, false, quiet)?;
                println!("Batch conversion finished.");
                return Ok(());
            }
        }
    }
}

fn print_menu(settings: &MenuSettings) {
    println!("{}", "Audio conversion".cyan());
    println!("  (1) Output format: {}", settings.format.as_str());
    println!("  (2) Sample rate: {}", settings.sample_rate);
    println!("  (3) Bitrate: {}", settings.bitrate);
    println!("  (4) Channels: {}", settings.channels);
    println!("  (5) Preserve metadata: {}", settings.preserve_metadata);
    println!();
    println!("{}", "Metadata".cyan());
    println!("  (6) Convert artwork: {}", settings.convert_artwork);
    println!("  (7) Auto file renaming: {}", settings.rename);
    println!("  (8) Change metadata: {}", settings.modify_metadata);
    println!();
    println!("  (9) Start batch conversion");
    println!("  (0) Exit");
    println!();
}

/// Read one top-level choice and apply it; end of input exits
fn handle_choice<R: BufRead>(input: &mut R, settings: &mut MenuSettings) -> Result<MenuAction> {
    let Some(option) = prompt(input, "Select an option to change (0-9): ")? else {
        return Ok(MenuAction::Exit);
    };

    match option.as_str() {
        "0" => return Ok(MenuAction::Exit),
        "1" => {
            let names: Vec<&str> = OutputFormat::value_variants()
                .iter()
                .map(OutputFormat::as_str)
                .collect();
            let choice = ask(input, "Enter output format", &names)?;
            if let Some(format) = OutputFormat::parse(&choice) {
                settings.format = format;
            }
        }
        "2" => {
            let rates: Vec<String> = SAMPLE_RATES.iter().map(u32::to_string).collect();
            let rates: Vec<&str> = rates.iter().map(String::as_str).collect();
            let choice = ask(input, "Enter sample rate", &rates)?;
            if let Ok(rate) = choice.parse() {
                settings.sample_rate = rate;
            }
        }
        "3" => settings.bitrate = ask(input, "Enter bitrate", BITRATES)?,
        "4" => {
            let choice = ask(input, "Enter number of channels (1 mono, 2 stereo)", &["1", "2"])?;
            if let Ok(channels) = choice.parse() {
                settings.channels = channels;
            }
        }
        "5" => settings.preserve_metadata = ask_yes_no(input, "Keep metadata after conversion?")?,
        "6" => settings.convert_artwork = ask_yes_no(input, "Convert artwork into a square PNG?")?,
        "7" => settings.rename = ask_yes_no(input, "Automatically rename files?")?,
        "8" => {
            settings.modify_metadata =
                ask_yes_no(input, "Apply metadata changes and look up new ones on MusicBrainz?")?
        }
        "9" => {
            let bypass = ask_yes_no(
                input,
                "Bypass conversion? Answer y to only work on metadata.",
            )?;
            return Ok(MenuAction::Start { bypass });
        }
        _ => println!("{}", "Invalid option.".red()),
    }

    Ok(MenuAction::Continue)
}

/// Print a prompt and read one trimmed, lowercased line; `None` at end of input
fn prompt<R: BufRead>(input: &mut R, message: &str) -> Result<Option<String>> {
    print!("{}", message);
    io::stdout().flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_lowercase()))
}

/// Prompt until the answer is one of `valid`
fn ask<R: BufRead>(input: &mut R, question: &str, valid: &[&str]) -> Result<String> {
    let message = format!("{} [{}]: ", question, valid.join(", "));
    loop {
        let Some(answer) = prompt(input, &message)? else {
            bail!("Input closed while waiting for an answer");
        };
        if valid.contains(&answer.as_str()) {
            return Ok(answer);
        }
        println!(
            "Invalid input. Please enter one of the following: {}",
            valid.join(", ")
        );
    }
}

fn ask_yes_no<R: BufRead>(input: &mut R, question: &str) -> Result<bool> {
    Ok(ask(input, question, &["y", "n"])? == "y")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn settings() -> MenuSettings {
        MenuSettings::from_config(&Config::default())
    }

    #[test]
    fn test_change_format_after_invalid_answer() {
        let mut input = Cursor::new("1\nmp4\nFLAC\n");
        let mut s = settings();
        assert_eq!(handle_choice(&mut input, &mut s).unwrap(), MenuAction::Continue);
        assert_eq!(s.format, OutputFormat::Flac);
    }

    #[test]
    fn test_numeric_settings() {
        let mut input = Cursor::new("2\n44100\n4\n3\n1\n3\n320k\n");
        let mut s = settings();
        for _ in 0..3 {
            handle_choice(&mut input, &mut s).unwrap();
        }
        assert_eq!(s.sample_rate, 44100);
        assert_eq!(s.channels, 1);
        assert_eq!(s.bitrate, "320k");
    }

    #[test]
    fn test_toggles_and_start() {
        let mut input = Cursor::new("7\nn\n9\ny\n");
        let mut s = settings();
        handle_choice(&mut input, &mut s).unwrap();
        assert!(!s.rename);
        assert_eq!(
            handle_choice(&mut input, &mut s).unwrap(),
            MenuAction::Start { bypass: true }
        );
    }

    #[test]
    fn test_exit_and_end_of_input() {
        let mut s = settings();
        assert_eq!(handle_choice(&mut Cursor::new("0\n"), &mut s).unwrap(), MenuAction::Exit);
        assert_eq!(handle_choice(&mut Cursor::new(""), &mut s).unwrap(), MenuAction::Exit);
        assert_eq!(handle_choice(&mut Cursor::new("x\n"), &mut s).unwrap(), MenuAction::Continue);
        assert!(handle_choice(&mut Cursor::new("5\n"), &mut s).is_err());
    }
}
