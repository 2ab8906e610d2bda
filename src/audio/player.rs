// SoundPlayer trait - Fire-and-forget playback of accent sounds

use super::PlaybackResult;
use crate::config::BeatStatus;

/// Black-box audio collaborator
///
/// Implementations must return quickly: `play_sound` is called on the timing
/// thread and should only enqueue the sound for the audio device.
pub trait SoundPlayer: Send + Sync {
    /// Make sure the output device is running before the first beat
    fn ensure_engine_running(&self) -> PlaybackResult<()>;

    /// Play the sound bound to `status` in the given sound set
    fn play_sound(&self, sound_set: &str, status: BeatStatus) -> PlaybackResult<()>;
}

/// Player that accepts everything and plays nothing
/// Useful for visual-only metronomes and headless runs
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentPlayer;

impl SoundPlayer for SilentPlayer {
    fn ensure_engine_running(&self) -> PlaybackResult<()> {
        Ok(())
    }

    fn play_sound(&self, _sound_set: &str, _status: BeatStatus) -> PlaybackResult<()> {
        Ok(())
    }
}
