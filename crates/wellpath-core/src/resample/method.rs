//! Resampling method selection.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a destination sample is derived from its source neighbors.
///
/// Serialized as the legacy integer code (0–10). Unknown codes map to
/// [`ClosestPoint`](Self::ClosestPoint).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum ResampleMethod {
    /// Blend of the nearest neighbors on each side.
    #[default]
    LinearInterpolate,
    /// Window mean weighted by `1/d`.
    InverseDistanceAverage,
    /// Window mean weighted by `1/d²`.
    InverseSquareDistanceAverage,
    /// Window mean weighted by `exp(−d²)`.
    GaussianAverage,
    /// Linear blend of angles in degrees, wrapped into `[0, 360)`.
    LinearInterpolateAngle,
    /// Running circular mean of angles in degrees.
    AverageAngle,
    /// Value of the nearest neighbor.
    ClosestPoint,
    /// Value of the nearest neighbor with non-positive distance.
    StepFromAbove,
    /// Value of the nearest neighbor with non-negative distance.
    StepFromBelow,
    /// Geometric mean, for resistivities.
    LogarithmicAverage,
    /// Harmonic mean, for conductivities.
    HarmonicAverage,
}

impl ResampleMethod {
    /// Legacy integer code.
    pub const fn code(self) -> i32 {
        match self {
            Self::LinearInterpolate => 0,
            Self::InverseDistanceAverage => 1,
            Self::InverseSquareDistanceAverage => 2,
            Self::GaussianAverage => 3,
            Self::LinearInterpolateAngle => 4,
            Self::AverageAngle => 5,
            Self::ClosestPoint => 6,
            Self::StepFromAbove => 7,
            Self::StepFromBelow => 8,
            Self::LogarithmicAverage => 9,
            Self::HarmonicAverage => 10,
        }
    }

    /// Method for a legacy integer code; unmatched codes fall back to
    /// closest-point lookup.
    pub const fn from_code(code: i32) -> Self {
        match code {
            0 => Self::LinearInterpolate,
            1 => Self::InverseDistanceAverage,
            2 => Self::InverseSquareDistanceAverage,
            3 => Self::GaussianAverage,
            4 => Self::LinearInterpolateAngle,
            5 => Self::AverageAngle,
            7 => Self::StepFromAbove,
            8 => Self::StepFromBelow,
            9 => Self::LogarithmicAverage,
            10 => Self::HarmonicAverage,
            _ => Self::ClosestPoint,
        }
    }

    /// Pick a method from a channel's mnemonic and unit.
    ///
    /// - name contains `az` or `ti` and unit starts with `deg` → angle interpolation
    /// - unit is `m`, `ft`, `ms` or `s` → linear interpolation
    /// - unit starts with `ohm` → logarithmic average
    /// - unit starts with `mho` → harmonic average
    /// - otherwise `default`
    pub fn for_channel(name: &str, unit: &str, default: Self) -> Self {
        let name = name.to_ascii_lowercase();
        let unit = unit.trim().to_ascii_lowercase();

        if (name.contains("az") || name.contains("ti")) && unit.starts_with("deg") {
            Self::LinearInterpolateAngle
        } else if matches!(unit.as_str(), "m" | "ft" | "ms" | "s") {
            Self::LinearInterpolate
        } else if unit.starts_with("ohm") {
            Self::LogarithmicAverage
        } else if unit.starts_with("mho") {
            Self::HarmonicAverage
        } else {
            default
        }
    }

    /// Every method, in code order.
    pub fn all() -> &'static [Self] {
        const ALL: [ResampleMethod; 11] = [
            ResampleMethod::LinearInterpolate,
            ResampleMethod::InverseDistanceAverage,
            ResampleMethod::InverseSquareDistanceAverage,
            ResampleMethod::GaussianAverage,
            ResampleMethod::LinearInterpolateAngle,
            ResampleMethod::AverageAngle,
            ResampleMethod::ClosestPoint,
            ResampleMethod::StepFromAbove,
            ResampleMethod::StepFromBelow,
            ResampleMethod::LogarithmicAverage,
            ResampleMethod::HarmonicAverage,
        ];
        &ALL
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::LinearInterpolate => "Linear interpolation",
            Self::InverseDistanceAverage => "Inverse distance average",
            Self::InverseSquareDistanceAverage => "Inverse square distance average",
            Self::GaussianAverage => "Gaussian average",
            Self::LinearInterpolateAngle => "Angle interpolation",
            Self::AverageAngle => "Angle average",
            Self::ClosestPoint => "Closest point",
            Self::StepFromAbove => "Step from above",
            Self::StepFromBelow => "Step from below",
            Self::LogarithmicAverage => "Logarithmic average",
            Self::HarmonicAverage => "Harmonic average",
        }
    }
}

impl From<i32> for ResampleMethod {
    fn from(code: i32) -> Self {
        Self::from_code(code)
    }
}

impl From<ResampleMethod> for i32 {
    fn from(method: ResampleMethod) -> Self {
        method.code()
    }
}

impl fmt::Display for ResampleMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
