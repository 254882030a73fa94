use std::path::{Path, PathBuf};

/// The per-file stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Transcode,
    ArtworkResolve,
    ArtworkNormalize,
    MetadataEnrich,
    RenameAudio,
    RenameArtwork,
}

impl Step {
    pub fn label(&self) -> &'static str {
        match self {
            Step::Transcode => "convert",
            Step::ArtworkResolve => "artwork",
            Step::ArtworkNormalize => "resize",
            Step::MetadataEnrich => "metadata",
            Step::RenameAudio => "rename",
            Step::RenameArtwork => "rename art",
        }
    }
}

/// What happened to one step of one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Done(String),
    Skipped(String),
    Failed(String),
}

impl StepOutcome {
    pub fn is_done(&self) -> bool {
        matches!(self, StepOutcome::Done(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, StepOutcome::Skipped(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, StepOutcome::Failed(_))
    }
}

/// Everything that happened to one input file
#[derive(Debug, Clone)]
pub struct FileReport {
    pub source: PathBuf,
    /// Final location of the output audio, if it exists
    pub output: Option<PathBuf>,
    /// Final location of the artwork, if any was produced
    pub artwork: Option<PathBuf>,
    pub steps: Vec<(Step, StepOutcome)>,
}

impl FileReport {
    pub fn new(source: &Path) -> Self {
        Self {
            source: source.to_path_buf(),
            output: None,
            artwork: None,
            steps: Vec::new(),
        }
    }

    pub fn record(&mut self, step: Step, outcome: StepOutcome) {
        self.steps.push((step, outcome));
    }

    /// Outcome of the first occurrence of `step`
    pub fn outcome(&self, step: Step) -> Option<&StepOutcome> {
        self.steps
            .iter()
            .find(|(s, _)| *s == step)
            .map(|(_, outcome)| outcome)
    }

    pub fn has_failures(&self) -> bool {
        self.steps.iter().any(|(_, outcome)| outcome.is_failed())
    }
}

#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
}

impl BatchReport {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Output audio files that exist after the batch
    pub fn outputs(&self) -> Vec<&Path> {
        self.files
            .iter()
            .filter_map(|f| f.output.as_deref())
            .collect()
    }

    pub fn failed_files(&self) -> usize {
        self.files.iter().filter(|f| f.has_failures()).count()
    }
}
