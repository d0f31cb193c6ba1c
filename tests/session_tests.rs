//! Session scenario tests
//!
//! End-to-end flows across the session façade, signal graph, and the
//! collaborator seams: lazy initialization, topology round trips, the
//! unprocessed-playback fallback, and the rendered audio itself.

use approx::assert_relative_eq;
use pretty_assertions::assert_eq as assert_eq_pretty;

use volux::curve::CurveMode;
use volux::error::{Result, VoluxError};
use volux::graph::{GraphState, PREAMP_ACTIVE_GAIN};
use volux::platform::{AudioPlatform, Context, OfflinePlatform};
use volux::session::{AudioSession, PlaybackState, SessionSnapshot};
use volux::transport::{MediaTransport, SilentTransport};

fn session() -> AudioSession {
    AudioSession::new(
        Box::new(SilentTransport::new()),
        Box::new(OfflinePlatform::default()),
    )
}

/// Platform whose context allocation always fails
struct DeafPlatform;

impl AudioPlatform for DeafPlatform {
    fn create_context(&mut self) -> Result<Context> {
        Err(VoluxError::GraphInitFailed {
            reason: "platform refused a processing context".to_string(),
        })
    }
}

/// Transport that refuses to start, the autoplay-policy case
#[derive(Default)]
struct BlockedTransport {
    attempts: usize,
}

impl MediaTransport for BlockedTransport {
    fn play(&mut self) -> Result<()> {
        self.attempts += 1;
        Err(VoluxError::PlaybackFailed {
            reason: "autoplay blocked until user gesture".to_string(),
        })
    }

    fn pause(&mut self) {}

    fn set_muted(&mut self, _muted: bool) {}
}

#[test]
fn lazy_graph_then_full_toggle_round_trip() {
    let mut session = session();
    assert!(!session.graph().is_initialized());

    // First play builds the graph on the direct path
    session.play().unwrap();
    assert_eq!(session.graph().state(), GraphState::Direct);
    let initial_edges = session.graph().edges().to_vec();
    assert_eq!(initial_edges.len(), 3);

    // Enable: equalized chain of six filters
    assert!(session.toggle_eq().unwrap());
    assert_eq!(session.graph().state(), GraphState::Equalized);
    assert_eq!(session.graph().edge_count(), 8);

    // Let the ramps land, then verify the loudness compensation
    let mut block = vec![0.0_f32; 48_000];
    session.process_block(&mut block);
    assert_relative_eq!(
        session.graph().preamp_gain().unwrap(),
        PREAMP_ACTIVE_GAIN,
        epsilon = 1e-4
    );

    // Disable: the initial direct edge set comes back exactly
    assert!(!session.toggle_eq().unwrap());
    assert_eq!(session.graph().edges(), initial_edges.as_slice());

    session.process_block(&mut block);
    assert_relative_eq!(session.graph().preamp_gain().unwrap(), 1.0, epsilon = 1e-4);
    for db in session.graph().filter_gains_db() {
        assert!(db.abs() < 1e-4, "filter gain not restored: {db}");
    }
}

#[test]
fn toggle_eq_on_uninitialized_graph_is_not_ready() {
    let mut session = session();
    let err = session.toggle_eq().unwrap_err();
    assert_eq!(err, VoluxError::GraphNotReady);
    assert!(!session.eq_enabled());
    // A later play still works normally
    session.play().unwrap();
    assert!(session.toggle_eq().unwrap());
}

#[test]
fn graph_init_failure_falls_back_to_unprocessed_playback() {
    let mut session = AudioSession::new(
        Box::new(SilentTransport::new()),
        Box::new(DeafPlatform),
    );

    // Playback itself still starts
    session.play().unwrap();
    assert_eq!(session.playback_state(), PlaybackState::Playing);
    assert!(!session.graph().is_initialized());

    // The failure is surfaced, not swallowed
    let err = session.processing_error().expect("failure should be readable");
    assert_eq!(err.error_code(), "GRAPH_INIT_FAILED");
    assert!(err.is_recoverable());

    // EQ remains unavailable in the fallback
    assert_eq!(session.toggle_eq().unwrap_err(), VoluxError::GraphNotReady);
}

#[test]
fn transport_refusal_leaves_session_stopped() {
    let mut session = AudioSession::new(
        Box::new(BlockedTransport::default()),
        Box::new(OfflinePlatform::default()),
    );

    let err = session.play().unwrap_err();
    assert_eq!(err.error_code(), "PLAYBACK_FAILED");
    assert_eq!(session.playback_state(), PlaybackState::Stopped);

    // No automatic retry happened; the next attempt is the user's call
    let err = session.play().unwrap_err();
    assert_eq!(err.error_code(), "PLAYBACK_FAILED");
    assert_eq!(session.playback_state(), PlaybackState::Stopped);
}

#[test]
fn prepare_and_play_share_one_initialization() {
    let mut session = session();

    session.prepare().unwrap();
    let nodes = session.graph().node_count();
    let edges = session.graph().edge_count();
    assert_eq!(nodes, 10);

    // The lazy trigger finds the graph already built
    session.play().unwrap();
    session.prepare().unwrap();
    assert_eq!(session.graph().node_count(), nodes);
    assert_eq!(session.graph().edge_count(), edges);
}

#[test]
fn direct_path_scales_audio_by_mapped_gain() {
    let mut session = session();
    session.set_curve_mode(CurveMode::Linear).unwrap();
    session.set_slider_value(0.25).unwrap();
    session.play().unwrap();

    let mut block = vec![1.0_f32; 512];
    session.process_block(&mut block);
    assert_relative_eq!(block[511] as f64, 0.25, epsilon = 1e-6);
}

#[test]
fn equalized_path_boosts_band_center_tone() {
    let sample_rate = 48_000.0;
    let mut session = session();
    session.set_curve_mode(CurveMode::Linear).unwrap();
    session.set_slider_value(1.0).unwrap();
    session.play().unwrap();
    session.toggle_eq().unwrap();

    // Tone at the 2181 Hz band center (+3.7 dB). The neighboring bands
    // are narrow and more than an octave away, so they barely leak here.
    let band_freq = 2181.0;
    let total = 96_000;
    let mut input_sq = 0.0;
    let mut output_sq = 0.0;
    let mut block = vec![0.0_f32; 512];
    let mut rendered = 0;
    while rendered < total {
        let len = block.len().min(total - rendered);
        for (i, sample) in block[..len].iter_mut().enumerate() {
            let t = (rendered + i) as f64 / sample_rate;
            *sample = (2.0 * std::f64::consts::PI * band_freq * t).sin() as f32 * 0.1;
        }
        let before: f64 = block[..len].iter().map(|s| (*s as f64).powi(2)).sum();
        session.process_block(&mut block[..len]);
        let after: f64 = block[..len].iter().map(|s| (*s as f64).powi(2)).sum();
        rendered += len;
        // Skip the first second while ramps settle
        if rendered > 48_000 {
            input_sq += before;
            output_sq += after;
        }
    }
    let gain_db = 10.0 * (output_sq / input_sq).log10();
    assert_relative_eq!(gain_db, 3.7, epsilon = 0.3);
}

#[test]
fn snapshot_reflects_session_and_survives_json() {
    let mut session = session();
    session.set_slider_value(0.5).unwrap();
    session.play().unwrap();
    session.toggle_eq().unwrap();
    session.toggle_mute();
    session.tick(42.0, 240.0);

    let snapshot = session.snapshot();
    let json = serde_json::to_string(&snapshot).unwrap();
    let restored: SessionSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq_pretty!(restored, snapshot);

    assert_eq!(restored.playback_state, PlaybackState::Playing);
    assert!(restored.eq_enabled);
    assert!(restored.muted);
    assert_eq!(restored.current_time, 42.0);
    let expected = (2.0_f64.exp() - 1.0) / (4.0_f64.exp() - 1.0);
    assert_relative_eq!(restored.output_gain, expected, max_relative = 1e-12);
}

#[test]
fn chart_outputs_match_component_contracts() {
    let mut session = session();

    // Flat response while the EQ is off
    for (_, db) in session.frequency_response().unwrap() {
        assert_eq!(db, 0.0);
    }

    session.play().unwrap();
    session.toggle_eq().unwrap();
    let response = session.frequency_response().unwrap();
    assert_eq!(response.len(), 101);
    assert!(response.iter().any(|(_, db)| *db != 0.0));

    let samples: Vec<_> = session.curve_samples(CurveMode::Linear).unwrap().collect();
    assert_eq!(samples.len(), 101);
    for (x, gain) in samples {
        assert_eq!(x, gain);
    }
}
