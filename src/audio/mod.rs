//! Audio subsystem: mixer boundary and the crossfade director.

mod fade;
mod mixer;

pub use fade::AudioDirector;
pub use mixer::{ClipId, FADE_TICK, FULL_DB, FadeChannel, Mixer, SILENT_DB, SoftwareMixer};
