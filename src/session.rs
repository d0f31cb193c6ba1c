//! Audio session façade
//!
//! Orchestrates playback state, curve selection, and graph
//! reconfiguration. The external UI talks to this type and nothing else:
//! numeric inputs come in (slider position, toggles), numeric outputs go
//! back out (effective gain, chart curves, playback progress).

use crate::curve::{self, CurveMode, CurveSamples, DEFAULT_CURVE_POINTS};
use crate::eq::{self, EqConfig, DEFAULT_RESPONSE_POINTS};
use crate::error::{Result, VoluxError};
use crate::graph::SignalGraph;
use crate::platform::AudioPlatform;
use crate::transport::MediaTransport;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Playback states driven by play/pause and transport notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackState::Stopped => write!(f, "Stopped"),
            PlaybackState::Playing => write!(f, "Playing"),
            PlaybackState::Paused => write!(f, "Paused"),
        }
    }
}

/// Everything the UI binds to, in one serializable snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub playback_state: PlaybackState,
    pub current_time: f64,
    pub duration: f64,
    pub slider_value: f64,
    pub output_gain: f64,
    pub muted: bool,
    pub eq_enabled: bool,
    pub curve_mode: CurveMode,
}

/// One audio session: created once per mounted UI, destroyed on unmount.
///
/// Owns exactly one [`SignalGraph`]; the graph struct exists from
/// construction but its real-time resources are only allocated by the
/// idempotent initialization reachable from both [`prepare`](Self::prepare)
/// and the first [`play`](Self::play).
pub struct AudioSession {
    playback_state: PlaybackState,
    muted: bool,
    slider_value: f64,
    output_gain: f64,
    curve_mode: CurveMode,
    eq_config: EqConfig,
    current_time: f64,
    duration: f64,
    transport: Box<dyn MediaTransport>,
    graph: SignalGraph,
    /// Why processing is unavailable, when graph initialization failed
    processing_error: Option<VoluxError>,
}

/// Default slider position for a fresh session
const DEFAULT_SLIDER: f64 = 0.5;

impl AudioSession {
    pub fn new(transport: Box<dyn MediaTransport>, platform: Box<dyn AudioPlatform>) -> Self {
        let curve_mode = CurveMode::default();
        let eq_config = EqConfig::default();
        let graph = SignalGraph::new(eq_config.clone(), platform);
        // The default position is always in domain
        let output_gain = curve::gain(DEFAULT_SLIDER, curve_mode).unwrap_or(DEFAULT_SLIDER);
        Self {
            playback_state: PlaybackState::Stopped,
            muted: false,
            slider_value: DEFAULT_SLIDER,
            output_gain,
            curve_mode,
            eq_config,
            current_time: 0.0,
            duration: 0.0,
            transport,
            graph,
            processing_error: None,
        }
    }

    // ------------------------------------------------------------------
    // Graph lifecycle
    // ------------------------------------------------------------------

    /// Eager initialization trigger (e.g. on mount). Shares the same
    /// idempotent entry point as the lazy trigger in [`play`](Self::play).
    pub fn prepare(&mut self) -> Result<()> {
        self.ensure_graph()?;
        Ok(())
    }

    fn ensure_graph(&mut self) -> Result<()> {
        match self.graph.initialize(self.eq_config.enabled) {
            Ok(_) => {
                self.processing_error = None;
                self.apply_gain()
            }
            Err(e) => {
                self.processing_error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// The reason processing is unavailable, if graph initialization
    /// failed and playback is running unprocessed
    pub fn processing_error(&self) -> Option<&VoluxError> {
        self.processing_error.as_ref()
    }

    // ------------------------------------------------------------------
    // Inbound UI operations
    // ------------------------------------------------------------------

    /// Store a new slider position and re-apply the mapped gain.
    /// Out-of-range input is rejected and changes nothing.
    pub fn set_slider_value(&mut self, x: f64) -> Result<()> {
        let gain = curve::gain(x, self.curve_mode)?;
        self.slider_value = x;
        self.output_gain = gain;
        self.forward_gain()
    }

    /// Switch the mapping function and re-derive the gain from the
    /// current slider position. Never causes a topology change.
    pub fn set_curve_mode(&mut self, mode: CurveMode) -> Result<()> {
        self.curve_mode = mode;
        self.apply_gain()
    }

    /// Flip the equalizer, reconfiguring the graph topology.
    ///
    /// Returns the new enabled state. On an uninitialized graph this is
    /// `GraphNotReady` and the flag stays put. A transport flush failure
    /// after the swap is logged, not returned.
    pub fn toggle_eq(&mut self) -> Result<bool> {
        let target = !self.eq_config.enabled;
        // Hosts may have suspended the context while idle
        self.graph.ensure_running()?;
        self.graph.set_eq_enabled(target)?;
        self.eq_config.enabled = target;
        // The toggle is committed; a flush refusal must not mask that
        if let Err(e) = self.transport.flush() {
            warn!("[SESSION] Transport flush failed after EQ toggle: {e}");
        }
        debug!("[SESSION] EQ {}", if target { "enabled" } else { "disabled" });
        Ok(target)
    }

    /// Start playback. The first call initializes the signal graph; if
    /// the platform cannot allocate a context, playback falls back to the
    /// unprocessed transport and the failure stays readable via
    /// [`processing_error`](Self::processing_error). A transport refusal
    /// is `PlaybackFailed` and leaves the session stopped.
    pub fn play(&mut self) -> Result<()> {
        if self.playback_state == PlaybackState::Playing {
            return Ok(());
        }

        match self.ensure_graph() {
            Ok(()) => {
                if let Err(e) = self.graph.ensure_running() {
                    warn!("[SESSION] Could not resume processing context: {e}");
                    self.processing_error = Some(e);
                }
            }
            Err(e) => {
                warn!("[SESSION] Signal graph unavailable, playing unprocessed: {e}");
            }
        }

        self.transport.play()?;
        self.playback_state = PlaybackState::Playing;
        debug!("[SESSION] Playing");
        Ok(())
    }

    /// Pause playback; a no-op unless currently playing
    pub fn pause(&mut self) {
        if self.playback_state == PlaybackState::Playing {
            self.transport.pause();
            self.playback_state = PlaybackState::Paused;
            debug!("[SESSION] Paused at {:.3}s", self.current_time);
        }
    }

    /// Flip the mute flag and forward it to the transport
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.transport.set_muted(self.muted);
        self.muted
    }

    // ------------------------------------------------------------------
    // Transport notifications
    // ------------------------------------------------------------------

    /// Progress report from the media transport; stored for UI
    /// consumption, no processing logic here
    pub fn tick(&mut self, current_time: f64, duration: f64) {
        self.current_time = current_time;
        self.duration = duration;
    }

    /// End-of-stream notification from the transport
    pub fn notify_ended(&mut self) {
        self.playback_state = PlaybackState::Stopped;
        self.current_time = 0.0;
        debug!("[SESSION] Stream ended");
    }

    // ------------------------------------------------------------------
    // Rendering timeline
    // ------------------------------------------------------------------

    /// Host pull for the rendering timeline; delegates to the graph
    pub fn process_block(&mut self, samples: &mut [f32]) {
        self.graph.process_block(samples);
    }

    // ------------------------------------------------------------------
    // Outbound accessors
    // ------------------------------------------------------------------

    pub fn playback_state(&self) -> PlaybackState {
        self.playback_state
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn slider_value(&self) -> f64 {
        self.slider_value
    }

    /// The effective gain currently applied to the main path
    pub fn output_gain(&self) -> f64 {
        self.output_gain
    }

    pub fn curve_mode(&self) -> CurveMode {
        self.curve_mode
    }

    pub fn eq_enabled(&self) -> bool {
        self.eq_config.enabled
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn graph(&self) -> &SignalGraph {
        &self.graph
    }

    /// Chart points for a volume curve
    pub fn curve_samples(&self, mode: CurveMode) -> Result<CurveSamples> {
        curve::curve_samples(mode, DEFAULT_CURVE_POINTS)
    }

    /// Chart points for the equalizer's displayed frequency response,
    /// driven by the same config the graph applies
    pub fn frequency_response(&self) -> Result<Vec<(f64, f64)>> {
        eq::frequency_response(&self.eq_config, DEFAULT_RESPONSE_POINTS)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            playback_state: self.playback_state,
            current_time: self.current_time,
            duration: self.duration,
            slider_value: self.slider_value,
            output_gain: self.output_gain,
            muted: self.muted,
            eq_enabled: self.eq_config.enabled,
            curve_mode: self.curve_mode,
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Recompute the gain from stored state and forward it
    fn apply_gain(&mut self) -> Result<()> {
        self.output_gain = curve::gain(self.slider_value, self.curve_mode)?;
        self.forward_gain()
    }

    /// Push the cached gain to the graph; a graph that is not built yet
    /// simply picks the value up at initialization
    fn forward_gain(&mut self) -> Result<()> {
        match self.graph.set_gain(self.output_gain) {
            Ok(()) | Err(VoluxError::GraphNotReady) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

impl Drop for AudioSession {
    fn drop(&mut self) {
        // Scoped-resource discipline: the graph's context is released on
        // every exit path of the owning session
        self.graph.dispose();
    }
}

impl fmt::Debug for AudioSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioSession")
            .field("playback_state", &self.playback_state)
            .field("slider_value", &self.slider_value)
            .field("output_gain", &self.output_gain)
            .field("curve_mode", &self.curve_mode)
            .field("eq_enabled", &self.eq_config.enabled)
            .field("muted", &self.muted)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::OfflinePlatform;
    use crate::transport::SilentTransport;
    use approx::assert_relative_eq;

    fn session() -> AudioSession {
        AudioSession::new(
            Box::new(SilentTransport::new()),
            Box::new(OfflinePlatform::default()),
        )
    }

    /// Transport whose pipeline refresh always fails
    struct NoFlushTransport;

    impl crate::transport::MediaTransport for NoFlushTransport {
        fn play(&mut self) -> Result<()> {
            Ok(())
        }

        fn pause(&mut self) {}

        fn set_muted(&mut self, _muted: bool) {}

        fn flush(&mut self) -> Result<()> {
            Err(VoluxError::PlaybackFailed {
                reason: "pipeline refresh unavailable".to_string(),
            })
        }
    }

    #[test]
    fn test_fresh_session_defaults() {
        let session = session();
        assert_eq!(session.playback_state(), PlaybackState::Stopped);
        assert_eq!(session.slider_value(), DEFAULT_SLIDER);
        assert_eq!(session.curve_mode(), CurveMode::Exponential);
        assert!(!session.eq_enabled());
        assert!(!session.is_muted());
        assert!(!session.graph().is_initialized());
    }

    #[test]
    fn test_slider_maps_through_curve() {
        let mut session = session();
        session.set_slider_value(0.5).unwrap();
        let expected = (2.0_f64.exp() - 1.0) / (4.0_f64.exp() - 1.0);
        assert_relative_eq!(session.output_gain(), expected, max_relative = 1e-12);

        session.set_curve_mode(CurveMode::Linear).unwrap();
        assert_eq!(session.output_gain(), 0.5);
    }

    #[test]
    fn test_invalid_slider_rejected_and_state_unchanged() {
        let mut session = session();
        let before = session.slider_value();
        let err = session.set_slider_value(1.2).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_ARGUMENT");
        assert_eq!(session.slider_value(), before);
    }

    #[test]
    fn test_toggle_eq_before_play_is_not_ready() {
        let mut session = session();
        let err = session.toggle_eq().unwrap_err();
        assert_eq!(err, VoluxError::GraphNotReady);
        assert!(!session.eq_enabled());
    }

    #[test]
    fn test_play_initializes_and_applies_gain() {
        let mut session = session();
        session.set_slider_value(0.5).unwrap();
        session.play().unwrap();

        assert_eq!(session.playback_state(), PlaybackState::Playing);
        assert!(session.graph().is_initialized());
        assert!(session.processing_error().is_none());
        assert_relative_eq!(
            session.graph().main_gain().unwrap(),
            session.output_gain(),
            max_relative = 1e-12
        );

        // Double play is a no-op
        session.play().unwrap();
        assert_eq!(session.playback_state(), PlaybackState::Playing);
    }

    #[test]
    fn test_tick_and_ended() {
        let mut session = session();
        session.play().unwrap();
        session.tick(12.5, 180.0);
        assert_eq!(session.current_time(), 12.5);
        assert_eq!(session.duration(), 180.0);

        session.notify_ended();
        assert_eq!(session.playback_state(), PlaybackState::Stopped);
        assert_eq!(session.current_time(), 0.0);
    }

    #[test]
    fn test_pause_only_from_playing() {
        let mut session = session();
        session.pause();
        assert_eq!(session.playback_state(), PlaybackState::Stopped);

        session.play().unwrap();
        session.pause();
        assert_eq!(session.playback_state(), PlaybackState::Paused);
    }

    #[test]
    fn test_toggle_mute() {
        let mut session = session();
        assert!(session.toggle_mute());
        assert!(session.is_muted());
        assert!(!session.toggle_mute());
    }

    #[test]
    fn test_toggle_eq_commits_despite_flush_failure() {
        let mut session = AudioSession::new(
            Box::new(NoFlushTransport),
            Box::new(OfflinePlatform::default()),
        );
        session.play().unwrap();

        // The topology swap succeeded, so the toggle reports success even
        // though the transport could not refresh its pipeline
        assert!(session.toggle_eq().unwrap());
        assert!(session.eq_enabled());
        assert_eq!(session.graph().state(), crate::graph::GraphState::Equalized);

        assert!(!session.toggle_eq().unwrap());
        assert!(!session.eq_enabled());
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut session = session();
        session.set_slider_value(0.8).unwrap();
        session.play().unwrap();
        session.tick(3.0, 60.0);

        let snapshot = session.snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: SessionSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, snapshot);
        assert_eq!(restored.playback_state, PlaybackState::Playing);
        assert_eq!(restored.slider_value, 0.8);
        // The exponential gain at 0.8 has no short decimal form; the parse
        // must restore the exact bits, not the nearest within 1 ULP
        assert_eq!(restored.output_gain.to_bits(), snapshot.output_gain.to_bits());
    }
}
