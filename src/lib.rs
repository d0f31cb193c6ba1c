//! Volux - Perceptual Volume & Signal-Path Controller
//!
//! Volux maps a linear UI control value to an audible gain, manages a
//! real-time audio graph whose topology changes at runtime (direct path
//! vs. equalized path), and produces a simplified analytic model of the
//! equalizer's frequency response for visualization.
//!
//! # Architecture
//!
//! Data flows in one direction:
//! - UI reports a slider position → [`session::AudioSession`] →
//!   [`curve`] computes the gain → [`graph::SignalGraph`] applies it to
//!   the active path.
//! - UI toggles the EQ → the session reconfigures the graph topology and
//!   ramps filter/preamp gains → [`eq`] recomputes the display curve for
//!   the chart.
//!
//! The host platform supplies the rendering timeline
//! ([`platform::AudioPlatform`]) and the decode transport
//! ([`transport::MediaTransport`]); everything else lives here.

pub mod curve;
pub mod dsp;
pub mod eq;
pub mod error;
pub mod graph;
pub mod platform;
pub mod session;
pub mod transport;

pub use error::{Result, VoluxError};
