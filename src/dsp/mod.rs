//! Real-time DSP building blocks
//!
//! The signal graph is assembled from these pieces: true peaking biquads
//! for the equalized path and one-pole parameter ramps for click-free
//! gain changes.

mod biquad;
mod smoother;

pub use biquad::{BiquadCoeffs, BiquadState};
pub use smoother::{ParamRamp, RAMP_TIME_CONSTANT_SECS};
