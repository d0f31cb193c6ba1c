//! Volume curve mapping
//!
//! Maps a linear UI control position in [0,1] to an audible gain in [0,1].
//! The exponential curve approximates perceptual loudness: low slider
//! positions map to disproportionately low output, giving finer control
//! where hearing is most sensitive.

use crate::error::{Result, VoluxError};
use serde::{Deserialize, Serialize};

/// Steepness constant `a` for the exponential curve
pub const EXP_STEEPNESS: f64 = 4.0;

/// Default number of chart samples produced by [`curve_samples`]
pub const DEFAULT_CURVE_POINTS: usize = 101;

/// Which gain curve maps slider position to output volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveMode {
    /// Straight passthrough: output equals slider position
    Linear,
    /// `(e^{a·x} − 1) / (e^a − 1)` with `a = 4`; perceptual loudness matching
    #[default]
    Exponential,
}

impl std::fmt::Display for CurveMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CurveMode::Linear => write!(f, "linear"),
            CurveMode::Exponential => write!(f, "exponential"),
        }
    }
}

/// Map a slider position to a gain value.
///
/// Both curves are monotonic on [0,1] with `gain(0) = 0` and `gain(1) = 1`
/// exactly. Out-of-range input (including NaN) is a caller contract
/// violation and fails with [`VoluxError::InvalidArgument`] rather than
/// clamping silently.
pub fn gain(x: f64, mode: CurveMode) -> Result<f64> {
    if !(0.0..=1.0).contains(&x) {
        return Err(VoluxError::InvalidArgument {
            param: "slider",
            value: x,
            expected: "0.0..=1.0",
        });
    }
    Ok(apply(x, mode))
}

/// Curve math for an already-validated position
fn apply(x: f64, mode: CurveMode) -> f64 {
    match mode {
        CurveMode::Linear => x,
        CurveMode::Exponential => {
            ((EXP_STEEPNESS * x).exp() - 1.0) / (EXP_STEEPNESS.exp() - 1.0)
        }
    }
}

/// Lazily-generated sequence of `(position, gain)` chart points.
///
/// Carries no hidden state: it is `Clone`, and a fresh call to
/// [`curve_samples`] always restarts from position 0.
#[derive(Debug, Clone)]
pub struct CurveSamples {
    mode: CurveMode,
    n_points: usize,
    index: usize,
}

impl Iterator for CurveSamples {
    type Item = (f64, f64);

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.n_points {
            return None;
        }
        let x = self.index as f64 / (self.n_points - 1) as f64;
        self.index += 1;
        Some((x, apply(x, self.mode)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.n_points - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CurveSamples {}

/// Sample a curve at `n_points` evenly spaced positions over [0,1],
/// endpoints included. Used purely for chart rendering.
///
/// `n_points < 2` cannot include both endpoints and is rejected.
pub fn curve_samples(mode: CurveMode, n_points: usize) -> Result<CurveSamples> {
    if n_points < 2 {
        return Err(VoluxError::InvalidArgument {
            param: "n_points",
            value: n_points as f64,
            expected: ">= 2",
        });
    }
    Ok(CurveSamples {
        mode,
        n_points,
        index: 0,
    })
}
