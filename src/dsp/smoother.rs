//! One-pole parameter smoothing
//!
//! All topology-change gain moves go through a smoothed ramp so the
//! rendering timeline never sees an instantaneous jump ("click"). The
//! control timeline only retargets ramps; a newer target simply
//! supersedes an in-flight one.

/// Time constant for topology-change gain ramps, in seconds
pub const RAMP_TIME_CONSTANT_SECS: f64 = 0.02;

/// A gain parameter that approaches its target exponentially,
/// advanced once per rendered sample.
#[derive(Debug, Clone, Copy)]
pub struct ParamRamp {
    current: f64,
    target: f64,
    /// Per-sample smoothing coefficient derived from the time constant
    coeff: f64,
}

impl ParamRamp {
    pub fn new(initial: f64, sample_rate: f64) -> Self {
        let coeff = 1.0 - (-1.0 / (RAMP_TIME_CONSTANT_SECS * sample_rate)).exp();
        Self {
            current: initial,
            target: initial,
            coeff,
        }
    }

    /// Retarget the ramp; the current value keeps moving from wherever it is
    pub fn set_target(&mut self, target: f64) {
        self.target = target;
    }

    /// Jump to a value with no ramp (pre-audio setup only)
    pub fn set_immediate(&mut self, value: f64) {
        self.current = value;
        self.target = value;
    }

    /// Advance by one sample and return the new value
    pub fn advance(&mut self) -> f64 {
        self.current += (self.target - self.current) * self.coeff;
        self.current
    }

    pub fn value(&self) -> f64 {
        self.current
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    /// True once the ramp is audibly at its target
    pub fn is_settled(&self) -> bool {
        (self.current - self.target).abs() < 1e-4
    }
}
