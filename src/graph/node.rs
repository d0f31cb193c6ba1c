//! Node roles and per-node rendering state

use crate::dsp::{BiquadCoeffs, BiquadState, ParamRamp};
use crate::eq::EqBand;
use std::fmt;

/// Fixed roster of node roles in the signal graph.
///
/// Roles exist for the whole life of an initialized graph; topology only
/// decides which of them sit on the live path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRole {
    Source,
    Preamp,
    /// One of the six peaking filters, by chain index
    Filter(usize),
    MainGain,
    Destination,
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRole::Source => write!(f, "source"),
            NodeRole::Preamp => write!(f, "preamp"),
            NodeRole::Filter(i) => write!(f, "filter{}", i + 1),
            NodeRole::MainGain => write!(f, "main-gain"),
            NodeRole::Destination => write!(f, "destination"),
        }
    }
}

/// A peaking filter node whose boost/cut ramps between 0 dB (inactive)
/// and its band's configured gain.
#[derive(Debug, Clone)]
pub struct FilterNode {
    band: EqBand,
    gain_db: ParamRamp,
    coeffs: BiquadCoeffs,
    /// Gain the cached coefficients were computed for
    coeffs_gain_db: f64,
    state: BiquadState,
    sample_rate: f64,
}

/// Coefficient refresh threshold; below this the ramp has not moved audibly
const COEFF_EPSILON_DB: f64 = 0.01;

impl FilterNode {
    /// Build an inactive (0 dB) filter for one band
    pub fn new(band: EqBand, sample_rate: f64) -> Self {
        Self {
            band,
            gain_db: ParamRamp::new(0.0, sample_rate),
            coeffs: BiquadCoeffs::peaking(sample_rate, band.frequency_hz, 0.0, band.q),
            coeffs_gain_db: 0.0,
            state: BiquadState::default(),
            sample_rate,
        }
    }

    pub fn band(&self) -> &EqBand {
        &self.band
    }

    pub fn gain_db(&self) -> f64 {
        self.gain_db.value()
    }

    pub fn target_gain_db(&self) -> f64 {
        self.gain_db.target()
    }

    /// Ramp toward the band's configured gain (activating)
    pub fn ramp_to_band_gain(&mut self) {
        self.gain_db.set_target(self.band.gain_db);
    }

    /// Ramp toward 0 dB (deactivating)
    pub fn ramp_to_unity(&mut self) {
        self.gain_db.set_target(0.0);
    }

    /// Jump straight to a gain, pre-audio setup only
    pub fn set_gain_immediate(&mut self, gain_db: f64) {
        self.gain_db.set_immediate(gain_db);
        self.refresh_coeffs();
    }

    /// Clear the delay line, e.g. when the node rejoins the live path
    pub fn reset(&mut self) {
        self.state.reset();
    }

    fn refresh_coeffs(&mut self) {
        let db = self.gain_db.value();
        self.coeffs =
            BiquadCoeffs::peaking(self.sample_rate, self.band.frequency_hz, db, self.band.q);
        self.coeffs_gain_db = db;
    }

    /// Filter one sample, advancing the gain ramp
    pub fn process(&mut self, input: f64) -> f64 {
        let db = self.gain_db.advance();
        if (db - self.coeffs_gain_db).abs() > COEFF_EPSILON_DB {
            self.refresh_coeffs();
        }
        self.state.process(input, &self.coeffs)
    }

    /// Keep the ramp moving while the node is off the live path
    pub fn advance_idle(&mut self) {
        self.gain_db.advance();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn test_band() -> EqBand {
        EqBand {
            frequency_hz: 1000.0,
            gain_db: 6.0,
            q: 4.0,
        }
    }

    #[test]
    fn test_new_filter_is_transparent() {
        let mut node = FilterNode::new(test_band(), 48_000.0);
        assert_eq!(node.gain_db(), 0.0);
        for i in 0..32 {
            let input = (i as f64 / 32.0) - 0.5;
            assert_relative_eq!(node.process(input), input, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_ramp_targets() {
        let mut node = FilterNode::new(test_band(), 48_000.0);
        node.ramp_to_band_gain();
        assert_eq!(node.target_gain_db(), 6.0);
        node.ramp_to_unity();
        assert_eq!(node.target_gain_db(), 0.0);
    }

    #[test]
    fn test_idle_advance_converges() {
        let mut node = FilterNode::new(test_band(), 48_000.0);
        node.set_gain_immediate(6.0);
        node.ramp_to_unity();
        for _ in 0..48_000 {
            node.advance_idle();
        }
        assert!(node.gain_db().abs() < 1e-4);
    }

    #[test]
    fn test_role_display() {
        assert_eq!(NodeRole::Filter(0).to_string(), "filter1");
        assert_eq!(NodeRole::MainGain.to_string(), "main-gain");
    }
}
