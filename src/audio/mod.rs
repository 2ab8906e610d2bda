// Audio - Playback capability consumed by the scheduler
// The mixing graph and buffer decoding live behind this trait

pub mod player;

pub use player::{SoundPlayer, SilentPlayer};

use crate::config::BeatStatus;
use thiserror::Error;

/// Errors reported by a `SoundPlayer`
///
/// The scheduler never propagates these: they are logged and the beat is
/// treated as silent.
#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("Audio engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("No {status} sound in sound set '{sound_set}'")]
    MissingSound {
        sound_set: String,
        status: BeatStatus,
    },

    #[error("Audio device error: {0}")]
    Device(String),
}

pub type PlaybackResult<T> = Result<T, PlaybackError>;
