pub mod api;
pub mod cache;
mod enricher;
pub mod merge;
pub mod recording;

pub use api::{MusicBrainzClient, RecordingSource};
pub use cache::LookupCache;
pub use enricher::Enricher;
pub use merge::merge;
pub use recording::{extract, select_best, Enrichment};
