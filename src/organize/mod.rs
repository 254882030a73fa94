pub mod naming;
pub mod scanner;

pub use naming::{artwork_target, audio_target, rename_if_free, Rename};
pub use scanner::{discover, BatchItem};
