#![forbid(unsafe_code)]

mod chunk;
mod companion;
mod error;
mod groundfx;
mod io;
mod table;
mod transcode;

pub use companion::{companion_path, rewrite_companion, rewrite_companion_file};
pub use error::{AdtError, AdtResult};
pub use groundfx::{GroundEffectClassifier, GROUND_EFFECT_MAP_LEN};
pub use transcode::{transcode_tex, Transcoded};
