//! Equalizer model
//!
//! Band definitions for the fixed six-band equalizer and the analytic
//! frequency-response approximation that drives the UI chart.
//!
//! The response model is a closed-form bell-curve approximation of a
//! peaking filter's magnitude response. It is deliberately not the true
//! biquad transfer function that the real-time graph applies (see
//! `dsp::biquad`); it only has to track the same band table and the same
//! `enabled` flag so chart and audio never disagree about state.

use crate::error::{Result, VoluxError};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Number of bands in the equalizer chain
pub const BAND_COUNT: usize = 6;

/// Lower edge of the audible range covered by the chart
pub const MIN_FREQUENCY_HZ: f64 = 20.0;

/// Upper edge of the audible range covered by the chart
pub const MAX_FREQUENCY_HZ: f64 = 20_000.0;

/// Default number of chart samples produced by [`frequency_response`]
pub const DEFAULT_RESPONSE_POINTS: usize = 101;

/// A single peaking-filter band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EqBand {
    /// Center frequency in Hz (20–20000)
    pub frequency_hz: f64,
    /// Boost or cut at the center frequency in dB
    pub gain_db: f64,
    /// Q factor; higher is narrower (> 0)
    pub q: f64,
}

/// The fixed band table. Ordering matters only for connection order in
/// the filter chain, not for the response math.
pub const DEFAULT_BANDS: [EqBand; BAND_COUNT] = [
    EqBand { frequency_hz: 50.0, gain_db: 12.1, q: 8.2 },
    EqBand { frequency_hz: 100.0, gain_db: -5.2, q: 9.2 },
    EqBand { frequency_hz: 326.6, gain_db: 4.0, q: 6.3 },
    EqBand { frequency_hz: 793.7, gain_db: -5.0, q: 9.0 },
    EqBand { frequency_hz: 2181.0, gain_db: 3.7, q: 5.6 },
    EqBand { frequency_hz: 7781.0, gain_db: 7.8, q: 8.5 },
];

impl EqBand {
    /// Validate band parameters
    pub fn validate(&self) -> Result<()> {
        if !self.q.is_finite() || self.q <= 0.0 {
            return Err(VoluxError::InvalidArgument {
                param: "q",
                value: self.q,
                expected: "> 0",
            });
        }
        if !(MIN_FREQUENCY_HZ..=MAX_FREQUENCY_HZ).contains(&self.frequency_hz) {
            return Err(VoluxError::InvalidArgument {
                param: "frequency_hz",
                value: self.frequency_hz,
                expected: "20.0..=20000.0",
            });
        }
        Ok(())
    }

    /// Analytic contribution of this band at `freq_hz`, in dB.
    ///
    /// `octave_width = 1/q`; within two widths of the center the band
    /// contributes `gain_db · cos²(π·d / (2·w))` where `d` is the distance
    /// in octaves, outside it contributes nothing.
    pub fn contribution_db(&self, freq_hz: f64) -> f64 {
        let octave_width = 1.0 / self.q;
        let octave_distance = (freq_hz / self.frequency_hz).log2().abs();
        if octave_distance < 2.0 * octave_width {
            let attenuation = (PI * octave_distance / (2.0 * octave_width)).cos();
            self.gain_db * attenuation * attenuation
        } else {
            0.0
        }
    }
}

/// Equalizer configuration: the fixed band table plus the enabled flag.
///
/// Bands are immutable for the lifetime of a session; only `enabled`
/// toggles. This struct is the single source of truth consumed by both
/// the chart model and the signal graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EqConfig {
    pub bands: [EqBand; BAND_COUNT],
    pub enabled: bool,
}

impl Default for EqConfig {
    fn default() -> Self {
        Self {
            bands: DEFAULT_BANDS,
            enabled: false,
        }
    }
}

impl EqConfig {
    /// Create a configuration from a custom band table
    pub fn new(bands: [EqBand; BAND_COUNT], enabled: bool) -> Result<Self> {
        for band in &bands {
            band.validate()?;
        }
        Ok(Self { bands, enabled })
    }
}

/// Log-spaced chart frequencies: `f(t) = 20 · (20000/20)^t`, `t = i/(n−1)`.
fn chart_frequency(index: usize, n_points: usize) -> f64 {
    let t = index as f64 / (n_points - 1) as f64;
    MIN_FREQUENCY_HZ * (MAX_FREQUENCY_HZ / MIN_FREQUENCY_HZ).powf(t)
}

/// Compute the displayed frequency response as `(frequency_hz, db)` pairs,
/// log-spaced from 20 Hz to 20 kHz inclusive.
///
/// Band contributions sum independently; a disabled configuration yields
/// the flat 0 dB reference at every point.
pub fn frequency_response(config: &EqConfig, n_points: usize) -> Result<Vec<(f64, f64)>> {
    if n_points < 2 {
        return Err(VoluxError::InvalidArgument {
            param: "n_points",
            value: n_points as f64,
            expected: ">= 2",
        });
    }
    for band in &config.bands {
        band.validate()?;
    }

    let mut points = Vec::with_capacity(n_points);
    for i in 0..n_points {
        let freq = chart_frequency(i, n_points);
        let db = if config.enabled {
            config.bands.iter().map(|b| b.contribution_db(freq)).sum()
        } else {
            0.0
        };
        points.push((freq, db));
    }
    Ok(points)
}
