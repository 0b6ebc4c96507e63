//! Numeric floors and caps shared by every component.
//!
//! `Tolerances` is the single place where guard constants live. Each
//! component takes a copy at construction; the defaults reproduce the
//! behavior of the legacy log-processing toolkit.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Floor applied to neighbor distances before weighting.
pub const DEFAULT_MIN_DISTANCE: f64 = 1e-6;
/// Floor applied to the total absolute-distance mass of a window.
pub const DEFAULT_MIN_WEIGHT_MASS: f64 = 1e-6;
/// Upper bound on window doubling passes.
pub const DEFAULT_MAX_WINDOW_ITERATIONS: u32 = 20;
/// Smallest sample accepted by logarithmic and harmonic averaging.
pub const DEFAULT_MIN_POSITIVE_VALUE: f64 = 1e-6;
/// Floor applied to a file's sampling step.
pub const DEFAULT_MIN_STEP: f64 = 1e-3;
/// Dogleg angle (radians) below which the ratio factor is 1.
pub const DEFAULT_MIN_DOGLEG: f64 = 1e-5;
/// Measured-depth course length dogleg severity is expressed over.
pub const DEFAULT_DOGLEG_COURSE_LENGTH: f64 = 30.0;

/// Overridable numeric guards.
///
/// Missing fields in a JSON document take their defaults, so a partial
/// override such as `{"min_step": 0.01}` is valid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerances {
    /// Floor for `ResamplePoint` absolute distances. Default: 1e-6.
    pub min_distance: f64,
    /// Floor for the summed absolute distance of a window. Default: 1e-6.
    pub min_weight_mass: f64,
    /// Cap on window doubling passes in `ResampleMap`. Default: 20.
    pub max_window_iterations: u32,
    /// Values at or below this are skipped by log/harmonic averages. Default: 1e-6.
    pub min_positive_value: f64,
    /// Floor for the merger's file step. Default: 0.001.
    pub min_step: f64,
    /// Dogleg threshold for the minimum curvature ratio factor. Default: 1e-5.
    pub min_dogleg: f64,
    /// Dogleg severity scale. Default: 30.
    pub dogleg_course_length: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            min_distance: DEFAULT_MIN_DISTANCE,
            min_weight_mass: DEFAULT_MIN_WEIGHT_MASS,
            max_window_iterations: DEFAULT_MAX_WINDOW_ITERATIONS,
            min_positive_value: DEFAULT_MIN_POSITIVE_VALUE,
            min_step: DEFAULT_MIN_STEP,
            min_dogleg: DEFAULT_MIN_DOGLEG,
            dogleg_course_length: DEFAULT_DOGLEG_COURSE_LENGTH,
        }
    }
}

impl Tolerances {
    /// Parse and validate a JSON tolerance document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tolerances: Self = serde_json::from_str(json)?;
        tolerances.validate()?;
        Ok(tolerances)
    }

    /// Reject floors that would reintroduce division by zero or stall loops.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let floors = [
            ("min_distance", self.min_distance),
            ("min_weight_mass", self.min_weight_mass),
            ("min_step", self.min_step),
            ("dogleg_course_length", self.dogleg_course_length),
        ];
        for (field, value) in floors {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: "must be finite and positive",
                });
            }
        }

        let thresholds = [
            ("min_positive_value", self.min_positive_value),
            ("min_dogleg", self.min_dogleg),
        ];
        for (field, value) in thresholds {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: "must be finite and non-negative",
                });
            }
        }

        if self.max_window_iterations == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_window_iterations",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}
