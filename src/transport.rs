//! Media-transport collaborator seam
//!
//! Decode and playback primitives are provided by the host; the session
//! only needs to start, stop, and mute them. Progress flows the other
//! way, through [`AudioSession::tick`](crate::session::AudioSession::tick)
//! and `notify_ended`.

use crate::error::Result;

/// Playback primitives consumed from the host media element.
pub trait MediaTransport {
    /// Start or resume decoding. A refusal (autoplay policy, decode
    /// error) is reported as `PlaybackFailed`; retry is the user's
    /// explicit action.
    fn play(&mut self) -> Result<()>;

    /// Stop pulling samples; position is retained.
    fn pause(&mut self);

    fn set_muted(&mut self, muted: bool);

    /// Ask the rendering pipeline to pick up pending parameter changes.
    ///
    /// Some platforms need a forced refresh after a reconfiguration;
    /// which ones, and how, is implementation-defined. The default does
    /// nothing.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Transport that decodes nothing and always accepts play requests.
/// Suitable for offline rendering and headless hosts.
#[derive(Debug, Default)]
pub struct SilentTransport {
    playing: bool,
    muted: bool,
}

impl SilentTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }
}

impl MediaTransport for SilentTransport {
    fn play(&mut self) -> Result<()> {
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }
}
