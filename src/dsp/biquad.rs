//! Peaking biquad filter
//!
//! Audio EQ Cookbook coefficients for the constant-Q peaking filter used
//! by the equalized signal path. At 0 dB the transfer function collapses
//! to unity, which is what lets a band fade out by ramping its gain to
//! zero instead of being disconnected.
//!
//! Reference: https://www.w3.org/2011/audio/audio-eq-cookbook.html

use std::f64::consts::PI;

/// Biquad filter coefficients, normalized by a0.
/// Transfer function: H(z) = (b0 + b1*z^-1 + b2*z^-2) / (1 + a1*z^-1 + a2*z^-2)
#[derive(Debug, Clone, Copy, Default)]
pub struct BiquadCoeffs {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

impl BiquadCoeffs {
    /// Calculate peaking-EQ coefficients.
    ///
    /// Frequency is clamped below Nyquist and Q to a stable range; these
    /// are rendering-side safety clamps, not input validation (the model
    /// layer rejects out-of-domain bands before they get here).
    pub fn peaking(sample_rate: f64, frequency: f64, gain_db: f64, q: f64) -> Self {
        let freq = frequency.clamp(20.0, sample_rate / 2.0 - 1.0);
        let q = q.clamp(0.1, 10.0);

        let w0 = 2.0 * PI * freq / sample_rate;
        let cos_w0 = w0.cos();
        let sin_w0 = w0.sin();
        let alpha = sin_w0 / (2.0 * q);
        let a = (10.0_f64).powf(gain_db / 40.0);

        let b0 = 1.0 + alpha * a;
        let b1 = -2.0 * cos_w0;
        let b2 = 1.0 - alpha * a;
        let a0 = 1.0 + alpha / a;
        let a1 = -2.0 * cos_w0;
        let a2 = 1.0 - alpha / a;

        BiquadCoeffs {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        }
    }
}

/// Biquad delay-line state for one channel
#[derive(Debug, Clone, Copy, Default)]
pub struct BiquadState {
    x1: f64, // x[n-1]
    x2: f64, // x[n-2]
    y1: f64, // y[n-1]
    y2: f64, // y[n-2]
}

impl BiquadState {
    /// Process a single sample (Direct Form I)
    pub fn process(&mut self, input: f64, coeffs: &BiquadCoeffs) -> f64 {
        let output = coeffs.b0 * input + coeffs.b1 * self.x1 + coeffs.b2 * self.x2
            - coeffs.a1 * self.y1
            - coeffs.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output
    }

    /// Clear the delay line
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
