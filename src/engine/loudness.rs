//! ReplayGain from ffmpeg's ebur128 summary

use std::path::Path;
use tracing::{debug, warn};

use super::MediaEngine;
use crate::metadata::ReplayGain;

/// ReplayGain reference loudness
pub const REFERENCE_LUFS: f64 = -18.0;

const LOUDNESS_MARKER: &str = "Integrated loudness:";
const PEAK_MARKER: &str = "Peak:";

/// Measure a file and derive its ReplayGain; failures and silent input yield `None`
pub fn analyze(engine: &dyn MediaEngine, path: &Path) -> Option<ReplayGain> {
    match engine.measure_loudness(path) {
        Ok(Some(rg)) => {
            debug!(
                "Loudness for {}: gain {} dB, peak {} dBFS",
                path.display(),
                rg.gain_db,
                rg.peak_db
            );
            Some(rg)
        }
        Ok(None) => None,
        Err(e) => {
            warn!("Loudness analysis failed for {}: {}", path.display(), e);
            None
        }
    }
}

/// Parse the textual ebur128 report into gain and peak, rounded to 2 decimals
pub fn analyze_report(report: &str) -> Option<ReplayGain> {
    let loudness = integrated_loudness(report)?;
    let peak = true_peak(report)?;
    Some(ReplayGain {
        gain_db: round2(gain_for(loudness)),
        peak_db: round2(peak),
    })
}

/// Gain needed to bring `loudness` to the reference level
pub fn gain_for(loudness: f64) -> f64 {
    REFERENCE_LUFS - loudness
}

fn integrated_loudness(report: &str) -> Option<f64> {
    let start = report.rfind(LOUDNESS_MARKER)? + LOUDNESS_MARKER.len();
    let section = &report[start..];
    let value_start = section.find("I:")? + 2;
    number_before(&section[value_start..], "LUFS")
}

fn true_peak(report: &str) -> Option<f64> {
    let start = report.rfind(PEAK_MARKER)? + PEAK_MARKER.len();
    number_before(&report[start..], "dBFS")
}

/// Parse the number sitting between here and the next `unit`; `-inf` (silence) is no number
fn number_before(text: &str, unit: &str) -> Option<f64> {
    let end = text.find(unit)?;
    text[..end]
        .trim()
        .parse()
        .ok()
        .filter(|value: &f64| value.is_finite())
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
