//! The batch: discover files, then transcode, gather artwork, tag and rename each one

mod report;

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::engine::{loudness, ConversionSettings, MediaEngine};
use crate::lookup::{self, Enricher, RecordingSource};
use crate::metadata::{carries_tags, extension_of, TagHandle, TrackMetadata};
use crate::organize::naming::display_name;
use crate::organize::{artwork_target, audio_target, discover, rename_if_free, BatchItem, Rename};

pub use report::{BatchReport, FileReport, Step, StepOutcome};

pub const DEFAULT_ARTWORK_SIZE: u32 = 1000;

/// Which steps run and where their results go
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub artwork_dir: PathBuf,
    pub settings: ConversionSettings,
    /// Copy sources instead of transcoding them
    pub bypass: bool,
    pub convert_artwork: bool,
    pub artwork_size: u32,
    pub modify_metadata: bool,
    pub rename: bool,
}

impl BatchOptions {
    /// All steps enabled, with `Output/` and `Artwork/` under `input_dir`
    pub fn new(input_dir: &Path, settings: ConversionSettings) -> Self {
        Self {
            input_dir: input_dir.to_path_buf(),
            output_dir: input_dir.join("Output"),
            artwork_dir: input_dir.join("Artwork"),
            settings,
            bypass: false,
            convert_artwork: true,
            artwork_size: DEFAULT_ARTWORK_SIZE,
            modify_metadata: true,
            rename: true,
        }
    }

    fn output_path(&self, item: &BatchItem) -> PathBuf {
        let ext = if self.bypass {
            extension_of(&item.source)
        } else {
            self.settings.format.as_str().to_string()
        };
        self.output_dir.join(format!("{}.{}", item.stem(), ext))
    }

    fn artwork_path(&self, item: &BatchItem) -> PathBuf {
        let name = item
            .artwork
            .as_deref()
            .and_then(Path::file_name)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(format!("{}.png", item.stem())));
        self.artwork_dir.join(name)
    }
}

/// Process every audio file in the input directory, one at a time.
///
/// `on_file` is called after each file with its report, its 1-based index and
/// the total count. Per-file failures are recorded in the report and never
/// stop the batch.
pub fn run_batch<S, F>(
    engine: &dyn MediaEngine,
    enricher: &mut Enricher<S>,
    options: &BatchOptions,
    mut on_file: F,
) -> Result<BatchReport>
where
    S: RecordingSource,
    F: FnMut(&FileReport, usize, usize),
{
    let items = discover(&options.input_dir)?;
    if items.is_empty() {
        info!("No audio files in {}", options.input_dir.display());
        return Ok(BatchReport::default());
    }

    for dir in [&options.output_dir, &options.artwork_dir] {
        std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let total = items.len();
    let mut report = BatchReport::default();
    // Outputs of this run; only files left by an earlier run count as already converted
    let mut produced = HashSet::new();
    for (index, item) in items.iter().enumerate() {
        debug!("Processing {}", item.source.display());
        let file_report = process_item(engine, enricher, options, item, &produced);
        produced.extend(file_report.output.iter().cloned());
        produced.extend(file_report.artwork.iter().cloned());
        on_file(&file_report, index + 1, total);
        report.files.push(file_report);
    }

    enricher.persist();
    Ok(report)
}

fn process_item<S: RecordingSource>(
    engine: &dyn MediaEngine,
    enricher: &mut Enricher<S>,
    options: &BatchOptions,
    item: &BatchItem,
    produced: &HashSet<PathBuf>,
) -> FileReport {
    let mut report = FileReport::new(&item.source);

    let source = match TagHandle::open(&item.source) {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Failed to read tags from {}: {}", item.source.display(), e);
            None
        }
    };
    let tagged = source.as_ref().is_some_and(TagHandle::supports_metadata);
    let meta = source
        .as_ref()
        .map(TagHandle::read_core)
        .unwrap_or_default();

    let output = options.output_path(item);
    let renames = options.rename && tagged && carries_tags(&output);

    // Transcode or copy, unless a previous run already produced the file
    let renamed_output = audio_target(&output, &meta);
    let mut audio_path = output.clone();
    let outcome = if output.exists() {
        StepOutcome::Skipped(format!("{} already exists", display_name(&output)))
    } else if renames && renamed_output.exists() && !produced.contains(&renamed_output) {
        audio_path = renamed_output;
        StepOutcome::Skipped(format!("{} already exists", display_name(&audio_path)))
    } else if options.bypass {
        match std::fs::copy(&item.source, &output) {
            Ok(_) => StepOutcome::Done(format!("copied to {}", display_name(&output))),
            Err(e) => StepOutcome::Failed(format!("Failed to copy {}: {}", item.file_name(), e)),
        }
    } else {
        match engine.transcode(&item.source, &output, &options.settings) {
            Ok(()) => StepOutcome::Done(format!("converted to {}", options.settings.format.as_str())),
            Err(e) => {
                warn!("Transcoding {} failed: {}", item.source.display(), e);
                StepOutcome::Failed(e.to_string())
            }
        }
    };
    report.record(Step::Transcode, outcome);

    let canonical_art = renames
        .then(|| artwork_target(&options.artwork_path(item), &meta))
        .filter(|p| !produced.contains(p));
    let (mut artwork, outcome) = resolve_artwork(options, item, source.as_ref(), canonical_art.as_deref());
    let fresh_artwork = outcome.is_done();
    report.record(Step::ArtworkResolve, outcome);

    if options.convert_artwork {
        let outcome = match &artwork {
            Some(path) if fresh_artwork => normalize_artwork(engine, path, options.artwork_size),
            Some(_) => StepOutcome::Skipped("artwork already in place".to_string()),
            None => StepOutcome::Skipped("no artwork to resize".to_string()),
        };
        report.record(Step::ArtworkNormalize, outcome);
    }

    let mut meta = meta;
    if options.modify_metadata {
        let outcome = if tagged {
            write_metadata(engine, enricher, &audio_path, &mut meta, artwork.as_deref())
        } else {
            StepOutcome::Skipped(format!("{} has no metadata", item.file_name()))
        };
        report.record(Step::MetadataEnrich, outcome);
    }

    if options.rename {
        if renames {
            let target = audio_target(&audio_path, &meta);
            let outcome = rename_step(&audio_path, &target);
            if outcome.is_done() {
                audio_path = target;
            }
            report.record(Step::RenameAudio, outcome);

            if let Some(path) = artwork.as_mut() {
                let target = artwork_target(path, &meta);
                let outcome = rename_step(path, &target);
                if outcome.is_done() {
                    *path = target;
                }
                report.record(Step::RenameArtwork, outcome);
            }
        } else {
            report.record(
                Step::RenameAudio,
                StepOutcome::Skipped(format!("{} has no metadata to name it by", item.file_name())),
            );
        }
    }

    report.output = Some(audio_path).filter(|p| p.exists());
    report.artwork = artwork.filter(|p| p.exists());
    report
}

fn rename_step(from: &Path, to: &Path) -> StepOutcome {
    match rename_if_free(from, to) {
        Ok(Rename::Renamed) => StepOutcome::Done(format!(
            "{} renamed to {}",
            display_name(from),
            display_name(to)
        )),
        Ok(Rename::AlreadyNamed) => {
            StepOutcome::Skipped(format!("{} already has its canonical name", display_name(to)))
        }
        Ok(Rename::SourceMissing) => StepOutcome::Skipped(format!("{} not found", display_name(from))),
        Ok(Rename::TargetExists) => {
            warn!("Not renaming {}: {} already exists", from.display(), display_name(to));
            StepOutcome::Skipped(format!("{} already exists", display_name(to)))
        }
        Err(e) => StepOutcome::Failed(format!("Failed to rename {}: {}", display_name(from), e)),
    }
}

/// Copy the sidecar image or extract the embedded front cover into the artwork directory
fn resolve_artwork(
    options: &BatchOptions,
    item: &BatchItem,
    source: Option<&TagHandle>,
    canonical: Option<&Path>,
) -> (Option<PathBuf>, StepOutcome) {
    if let Some(existing) = canonical.filter(|p| p.exists()) {
        return (
            Some(existing.to_path_buf()),
            StepOutcome::Skipped(format!("{} already exists", display_name(existing))),
        );
    }

    let target = options.artwork_path(item);

    if let Some(sidecar) = &item.artwork {
        return match std::fs::copy(sidecar, &target) {
            Ok(_) => (
                Some(target),
                StepOutcome::Done(format!("copied {}", display_name(sidecar))),
            ),
            Err(e) => (
                None,
                StepOutcome::Failed(format!("Failed to copy {}: {}", display_name(sidecar), e)),
            ),
        };
    }

    match source.and_then(TagHandle::extract_cover_art) {
        Some(cover) => match std::fs::write(&target, &cover.data) {
            Ok(()) => (
                Some(target),
                StepOutcome::Done(format!("extracted embedded cover ({})", cover.mime_type)),
            ),
            Err(e) => (
                None,
                StepOutcome::Failed(format!("Failed to write {}: {}", display_name(&target), e)),
            ),
        },
        None => (None, StepOutcome::Skipped("no artwork found".to_string())),
    }
}

/// Resize into a sibling temp file, then swap it in; the original survives any failure
fn normalize_artwork(engine: &dyn MediaEngine, path: &Path, size: u32) -> StepOutcome {
    let temp = temp_sibling(path);

    let result = engine
        .resize_artwork(path, &temp, size)
        .map_err(|e| e.to_string())
        .and_then(|()| std::fs::rename(&temp, path).map_err(|e| e.to_string()));

    match result {
        Ok(()) => StepOutcome::Done(format!("resized to {}x{}", size, size)),
        Err(e) => {
            if temp.exists() {
                if let Err(cleanup) = std::fs::remove_file(&temp) {
                    debug!("Could not remove {}: {}", temp.display(), cleanup);
                }
            }
            StepOutcome::Failed(format!("Failed to resize {}: {}", display_name(path), e))
        }
    }
}

/// "cover.jpg" -> "cover_temp.jpg"; the extension tells ffmpeg which image encoder to use
fn temp_sibling(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{}_temp.{}", stem, ext.to_string_lossy().to_lowercase()),
        None => format!("{}_temp", stem),
    };
    path.with_file_name(name)
}

/// Measure loudness, merge looked-up fields and rewrite the output's tags
fn write_metadata<S: RecordingSource>(
    engine: &dyn MediaEngine,
    enricher: &mut Enricher<S>,
    path: &Path,
    meta: &mut TrackMetadata,
    cover: Option<&Path>,
) -> StepOutcome {
    let mut handle = match TagHandle::open(path) {
        Ok(handle) => handle,
        Err(e) => return StepOutcome::Failed(format!("Failed to open {}: {}", display_name(path), e)),
    };
    if !handle.supports_metadata() {
        return StepOutcome::Skipped(format!("{} does not support metadata", display_name(path)));
    }

    // Gain always describes the output file, never the source
    meta.replay_gain = loudness::analyze(engine, path);

    let enrichment = enricher.enrich(&meta.artist, &meta.title);
    lookup::merge(meta, &enrichment);

    match handle.write_core(meta, cover).and_then(|()| handle.save()) {
        Ok(()) => {
            let mut summary = if enrichment.is_empty() {
                "tags written, no lookup match".to_string()
            } else {
                format!(
                    "tags written (album: {}, year: {}, genre: {})",
                    or_dash(&meta.album),
                    or_dash(&meta.year),
                    or_dash(&meta.genre)
                )
            };
            if let Some(rg) = meta.replay_gain {
                summary.push_str(&format!(", gain {}", rg.gain_text()));
            }
            StepOutcome::Done(summary)
        }
        Err(e) => StepOutcome::Failed(format!("Failed to write tags to {}: {}", display_name(path), e)),
    }
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineError;
    use crate::lookup::api::LookupError;
    use crate::lookup::LookupCache;
    use crate::metadata::ReplayGain;
    use serde_json::{json, Value};
    use std::cell::Cell;
    use std::rc::Rc;
    use tempfile::TempDir;

    /// Copies files instead of running ffmpeg
    #[derive(Default)]
    struct StubEngine {
        fail_transcode: bool,
        silent: bool,
        transcodes: Cell<usize>,
        resizes: Cell<usize>,
    }

    fn stub_error(e: std::io::Error) -> EngineError {
        EngineError::Spawn {
            program: "stub".to_string(),
            source: e,
        }
    }

    impl MediaEngine for StubEngine {
        fn transcode(&self, input: &Path, output: &Path, _: &ConversionSettings) -> Result<(), EngineError> {
            self.transcodes.set(self.transcodes.get() + 1);
            if self.fail_transcode {
                return Err(stub_error(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "ffmpeg not installed",
                )));
            }
            std::fs::copy(input, output).map(|_| ()).map_err(stub_error)
        }

        fn measure_loudness(&self, _: &Path) -> Result<Option<ReplayGain>, EngineError> {
            if self.silent {
                return Ok(None);
            }
            Ok(Some(ReplayGain {
                gain_db: 5.0,
                peak_db: -1.0,
            }))
        }

        fn resize_artwork(&self, input: &Path, output: &Path, _: u32) -> Result<(), EngineError> {
            self.resizes.set(self.resizes.get() + 1);
            std::fs::copy(input, output).map(|_| ()).map_err(stub_error)
        }
    }

    struct FakeSource {
        calls: Rc<Cell<usize>>,
    }

    impl RecordingSource for FakeSource {
        fn search_recordings(&mut self, _: &str, _: &str, _: usize) -> Result<Vec<Value>, LookupError> {
            self.calls.set(self.calls.get() + 1);
            Ok(vec![json!({
                "id": "rec-1",
                "score": 100,
                "releases": [{
                    "title": "Discovery",
                    "status": "Official",
                    "date": "2001-03-12",
                    "release-group": {"primary-type": "Album"}
                }],
                "tags": [{"name": "house", "count": 4}]
            })])
        }
    }

    fn enricher(dir: &Path, calls: &Rc<Cell<usize>>) -> Enricher<FakeSource> {
        Enricher::new(
            Some(FakeSource {
                calls: Rc::clone(calls),
            }),
            LookupCache::load(dir.join("mb_cache.json")),
            5,
        )
    }

    fn tagged_mp3(dir: &Path, name: &str, artist: &str, title: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, [0xFF, 0xFB, 0x90, 0x64, 0x00, 0x00, 0x00, 0x00]).unwrap();
        let mut handle = TagHandle::open(&path).unwrap();
        let meta = TrackMetadata {
            artist: artist.to_string(),
            title: title.to_string(),
            ..Default::default()
        };
        handle.write_core(&meta, None).unwrap();
        handle.save().unwrap();
        path
    }

    fn no_progress(_: &FileReport, _: usize, _: usize) {}

    #[test]
    fn test_empty_directory_is_empty_batch() {
        let temp = TempDir::new().unwrap();
        let calls = Rc::new(Cell::new(0));
        let options = BatchOptions::new(temp.path(), ConversionSettings::default());

        let report = run_batch(&StubEngine::default(), &mut enricher(temp.path(), &calls), &options, no_progress).unwrap();

        assert!(report.is_empty());
        assert!(!temp.path().join("Output").exists());
    }

    #[test]
    fn test_full_batch_tags_and_renames() {
        let temp = TempDir::new().unwrap();
        tagged_mp3(temp.path(), "track01.mp3", "Daft Punk", "One More Time");
        let calls = Rc::new(Cell::new(0));
        let engine = StubEngine::default();
        let options = BatchOptions::new(temp.path(), ConversionSettings::default());

        let report = run_batch(&engine, &mut enricher(temp.path(), &calls), &options, no_progress).unwrap();

        let file = &report.files[0];
        assert!(file.outcome(Step::Transcode).unwrap().is_done());
        assert!(file.outcome(Step::ArtworkResolve).unwrap().is_skipped());
        assert!(file.outcome(Step::MetadataEnrich).unwrap().is_done());
        assert!(file.outcome(Step::RenameAudio).unwrap().is_done());
        assert!(!file.has_failures());

        let renamed = temp.path().join("Output").join("Daft Punk - One More Time.mp3");
        assert_eq!(report.outputs(), vec![renamed.as_path()]);
        assert!(!temp.path().join("Output").join("track01.mp3").exists());

        // Missing artwork still leaves the text fields written
        let meta = TagHandle::open(&renamed).unwrap().read_core();
        assert_eq!(meta.artist, "Daft Punk");
        assert_eq!(meta.album, "Discovery");
        assert_eq!(meta.year, "2001");
        assert_eq!(meta.genre, "House");
        assert_eq!(meta.replay_gain.unwrap().gain_db, 5.0);
        assert_eq!(std::fs::read_dir(temp.path().join("Artwork")).unwrap().count(), 0);

        assert!(temp.path().join("mb_cache.json").exists());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_second_run_skips_existing_outputs() {
        let temp = TempDir::new().unwrap();
        tagged_mp3(temp.path(), "track01.mp3", "Daft Punk", "One More Time");
        let calls = Rc::new(Cell::new(0));
        let engine = StubEngine::default();
        let options = BatchOptions::new(temp.path(), ConversionSettings::default());
        let mut enricher = enricher(temp.path(), &calls);

        run_batch(&engine, &mut enricher, &options, no_progress).unwrap();
        let renamed = temp.path().join("Output").join("Daft Punk - One More Time.mp3");
        let first_meta = TagHandle::open(&renamed).unwrap().read_core();

        let report = run_batch(&engine, &mut enricher, &options, no_progress).unwrap();
        let file = &report.files[0];
        assert!(file.outcome(Step::Transcode).unwrap().is_skipped());
        assert!(file.outcome(Step::RenameAudio).unwrap().is_skipped());
        assert_eq!(engine.transcodes.get(), 1);
        assert_eq!(calls.get(), 1);

        assert_eq!(std::fs::read_dir(temp.path().join("Output")).unwrap().count(), 1);
        assert_eq!(TagHandle::open(&renamed).unwrap().read_core(), first_meta);
    }

    #[test]
    fn test_wav_source_in_bypass_mode() {
        let temp = TempDir::new().unwrap();
        let wav = b"RIFF\x04\x00\x00\x00WAVE".to_vec();
        std::fs::write(temp.path().join("take.wav"), &wav).unwrap();
        let calls = Rc::new(Cell::new(0));
        let engine = StubEngine::default();
        let mut options = BatchOptions::new(temp.path(), ConversionSettings::default());
        options.bypass = true;

        let report = run_batch(&engine, &mut enricher(temp.path(), &calls), &options, no_progress).unwrap();

        let file = &report.files[0];
        assert!(file.outcome(Step::Transcode).unwrap().is_done());
        assert!(file.outcome(Step::MetadataEnrich).unwrap().is_skipped());
        assert!(file.outcome(Step::RenameAudio).unwrap().is_skipped());
        assert!(!file.has_failures());
        assert_eq!(std::fs::read(temp.path().join("Output").join("take.wav")).unwrap(), wav);
        assert_eq!(engine.transcodes.get(), 0);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_sidecar_artwork_is_resized_embedded_and_renamed() {
        let temp = TempDir::new().unwrap();
        tagged_mp3(temp.path(), "song.mp3", "Daft Punk", "One More Time");
        std::fs::write(temp.path().join("song.jpg"), [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10]).unwrap();
        let calls = Rc::new(Cell::new(0));
        let engine = StubEngine::default();
        let options = BatchOptions::new(temp.path(), ConversionSettings::default());

        let report = run_batch(&engine, &mut enricher(temp.path(), &calls), &options, no_progress).unwrap();

        let file = &report.files[0];
        assert!(file.outcome(Step::ArtworkResolve).unwrap().is_done());
        assert!(file.outcome(Step::ArtworkNormalize).unwrap().is_done());
        assert!(file.outcome(Step::RenameArtwork).unwrap().is_done());
        assert_eq!(engine.resizes.get(), 1);

        let artwork = temp.path().join("Artwork");
        assert_eq!(file.artwork, Some(artwork.join("Daft Punk - One More Time.png")));
        assert!(!artwork.join("song.jpg").exists());
        assert!(!artwork.join("song_temp.jpg").exists());

        let output = temp.path().join("Output").join("Daft Punk - One More Time.mp3");
        let cover = TagHandle::open(&output).unwrap().extract_cover_art().unwrap();
        assert_eq!(cover.mime_type, "image/jpeg");
    }

    #[test]
    fn test_transcode_failure_does_not_abort_batch() {
        let temp = TempDir::new().unwrap();
        tagged_mp3(temp.path(), "a.mp3", "Artist", "First");
        tagged_mp3(temp.path(), "b.mp3", "Artist", "Second");
        let calls = Rc::new(Cell::new(0));
        let engine = StubEngine {
            fail_transcode: true,
            ..Default::default()
        };
        let mut options = BatchOptions::new(temp.path(), ConversionSettings::default());
        options.convert_artwork = false;

        let mut progress = Vec::new();
        let report = run_batch(&engine, &mut enricher(temp.path(), &calls), &options, |_, i, n| {
            progress.push((i, n))
        })
        .unwrap();

        assert_eq!(progress, vec![(1, 2), (2, 2)]);
        assert_eq!(report.files.len(), 2);
        assert_eq!(report.failed_files(), 2);
        for file in &report.files {
            assert!(file.outcome(Step::Transcode).unwrap().is_failed());
            assert!(file.outcome(Step::MetadataEnrich).unwrap().is_failed());
            assert!(file.outcome(Step::ArtworkNormalize).is_none());
        }
        assert!(report.outputs().is_empty());
    }

    #[test]
    fn test_unmeasured_output_drops_source_gain() {
        let temp = TempDir::new().unwrap();
        let path = tagged_mp3(temp.path(), "quiet.mp3", "Artist", "Quiet");
        let mut handle = TagHandle::open(&path).unwrap();
        let mut meta = handle.read_core();
        meta.replay_gain = Some(ReplayGain {
            gain_db: -9.99,
            peak_db: 0.5,
        });
        handle.write_core(&meta, None).unwrap();
        handle.save().unwrap();

        let calls = Rc::new(Cell::new(0));
        let engine = StubEngine {
            silent: true,
            ..Default::default()
        };
        let options = BatchOptions::new(temp.path(), ConversionSettings::default());

        let report = run_batch(&engine, &mut enricher(temp.path(), &calls), &options, no_progress).unwrap();

        let file = &report.files[0];
        assert!(file.outcome(Step::MetadataEnrich).unwrap().is_done());
        let output = temp.path().join("Output").join("Artist - Quiet.mp3");
        let written = TagHandle::open(&output).unwrap().read_core();
        assert!(written.replay_gain.is_none());
        assert_eq!(written.album, "Discovery");
    }

    #[test]
    fn test_same_tags_keep_both_outputs() {
        let temp = TempDir::new().unwrap();
        tagged_mp3(temp.path(), "a.mp3", "Same", "Song");
        tagged_mp3(temp.path(), "b.mp3", "Same", "Song");
        let calls = Rc::new(Cell::new(0));
        let engine = StubEngine::default();
        let mut options = BatchOptions::new(temp.path(), ConversionSettings::default());
        options.convert_artwork = false;

        let report = run_batch(&engine, &mut enricher(temp.path(), &calls), &options, no_progress).unwrap();

        let out = temp.path().join("Output");
        let renamed = out.join("Same - Song.mp3");
        let kept = out.join("b.mp3");
        assert_eq!(engine.transcodes.get(), 2);
        assert_eq!(report.outputs(), vec![renamed.as_path(), kept.as_path()]);

        let second = &report.files[1];
        assert!(second.outcome(Step::Transcode).unwrap().is_done());
        assert!(second.outcome(Step::MetadataEnrich).unwrap().is_done());
        let rename = second.outcome(Step::RenameAudio).unwrap();
        assert!(matches!(rename, StepOutcome::Skipped(msg) if msg.contains("already exists")));

        // A rerun recognises both files as already converted
        let report = run_batch(&engine, &mut enricher(temp.path(), &calls), &options, no_progress).unwrap();
        assert_eq!(engine.transcodes.get(), 2);
        for file in &report.files {
            assert!(file.outcome(Step::Transcode).unwrap().is_skipped());
        }
        assert_eq!(std::fs::read_dir(&out).unwrap().count(), 2);
    }

    #[test]
    fn test_temp_sibling_keeps_extension() {
        assert_eq!(
            temp_sibling(Path::new("Artwork/cover.JPG")),
            PathBuf::from("Artwork/cover_temp.jpg")
        );
    }
}
