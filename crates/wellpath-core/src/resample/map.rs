//! Per-target neighbor search and weighted value accessors.
//!
//! A `ResampleMap` is built once for each destination index value and then
//! evaluated against any number of source data channels that share the
//! source index.
//!
//! # Algorithm
//! 1. Start with a half-width of `min_window` and double it while the doubled
//!    width stays within `max_window`, for at most `max_window_iterations`
//!    passes.
//! 2. Collect every non-NaN source index value within the final half-width
//!    and record its signed distance `target − source`.
//! 3. Normalize every point against `1 / max(Σ|d|, min_weight_mass)`.
//! 4. Pick `above` (nearest with `d ≤ 0`), `below` (nearest with `d ≥ 0`)
//!    and `closest` (the nearer of the two).
//!
//! The window always grows to its limit. There is no early exit once both
//! sides are covered.

use std::cmp::Ordering;

use super::method::ResampleMethod;
use super::point::ResamplePoint;
use crate::angle::{FULL_TURN, wrap_degrees};
use crate::config::Tolerances;

/// Neighbor list and distinguished neighbors for one target index value.
#[derive(Debug, Clone)]
pub struct ResampleMap {
    target: f64,
    window: f64,
    points: Vec<ResamplePoint>,
    above: Option<usize>,
    below: Option<usize>,
    closest: Option<usize>,
    min_positive_value: f64,
}

impl ResampleMap {
    /// Build the neighbor map for `target` over the source index samples.
    pub fn new(
        source_index: &[f64],
        target: f64,
        min_window: f64,
        max_window: f64,
        tolerances: &Tolerances,
    ) -> Self {
        let window = effective_window(min_window, max_window, tolerances.max_window_iterations);

        let mut points: Vec<ResamplePoint> = source_index
            .iter()
            .enumerate()
            .filter(|(_, depth)| !depth.is_nan())
            .filter_map(|(i, &depth)| {
                let distance = target - depth;
                (distance.abs() <= window).then(|| ResamplePoint::new(i, distance))
            })
            .collect();

        let mass: f64 = points.iter().map(|p| p.absolute_distance).sum();
        let weight = 1.0 / mass.max(tolerances.min_weight_mass);
        for point in &mut points {
            point.normalize(weight, tolerances.min_distance);
        }

        let above = nearest(&points, |d| d <= 0.0);
        let below = nearest(&points, |d| d >= 0.0);
        let closest = match (above, below) {
            (Some(a), Some(b)) => {
                if points[a].absolute_distance <= points[b].absolute_distance {
                    Some(a)
                } else {
                    Some(b)
                }
            }
            (a, b) => a.or(b),
        };

        Self {
            target,
            window,
            points,
            above,
            below,
            closest,
            min_positive_value: tolerances.min_positive_value,
        }
    }

    /// Destination index value this map resolves.
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Half-width the neighbor search settled on.
    pub fn window(&self) -> f64 {
        self.window
    }

    pub fn points(&self) -> &[ResamplePoint] {
        &self.points
    }

    /// Nearest neighbor with `distance ≤ 0`.
    pub fn above(&self) -> Option<&ResamplePoint> {
        self.above.map(|i| &self.points[i])
    }

    /// Nearest neighbor with `distance ≥ 0`.
    pub fn below(&self) -> Option<&ResamplePoint> {
        self.below.map(|i| &self.points[i])
    }

    /// Nearer of [`above`](Self::above) and [`below`](Self::below).
    pub fn closest(&self) -> Option<&ResamplePoint> {
        self.closest.map(|i| &self.points[i])
    }

    /// Evaluate `method` against the source data samples.
    pub fn evaluate(&self, method: ResampleMethod, data: &[f64]) -> f64 {
        match method {
            ResampleMethod::LinearInterpolate => self.linear_interpolate(data),
            ResampleMethod::InverseDistanceAverage => self.inverse_distance_average(data),
            ResampleMethod::InverseSquareDistanceAverage => {
                self.inverse_square_distance_average(data)
            }
            ResampleMethod::GaussianAverage => self.gaussian_average(data),
            ResampleMethod::LinearInterpolateAngle => self.linear_interpolate_angle(data),
            ResampleMethod::AverageAngle => self.average_angle(data),
            ResampleMethod::ClosestPoint => self.closest_point(data),
            ResampleMethod::StepFromAbove => self.step_from_above(data),
            ResampleMethod::StepFromBelow => self.step_from_below(data),
            ResampleMethod::LogarithmicAverage => self.logarithmic_average(data),
            ResampleMethod::HarmonicAverage => self.harmonic_average(data),
        }
    }

    /// Blend of `above` and `below`, each weighted by the other's distance.
    ///
    /// ```text
    /// v = (v_above × |d_below| + v_below × |d_above|) / (|d_above| + |d_below|)
    /// ```
    pub fn linear_interpolate(&self, data: &[f64]) -> f64 {
        let (Some(above), Some(below)) = (self.above(), self.below()) else {
            return f64::NAN;
        };
        let va = sample(data, above);
        let vb = sample(data, below);
        if va.is_nan() || vb.is_nan() {
            return f64::NAN;
        }
        if above.index == below.index {
            return va;
        }
        blend(va, above.absolute_distance, vb, below.absolute_distance)
    }

    pub fn inverse_distance_average(&self, data: &[f64]) -> f64 {
        self.weighted_mean(data, |p| p.inverse_distance_weight)
    }

    pub fn inverse_square_distance_average(&self, data: &[f64]) -> f64 {
        self.weighted_mean(data, |p| p.inverse_square_distance_weight)
    }

    pub fn gaussian_average(&self, data: &[f64]) -> f64 {
        self.weighted_mean(data, |p| p.gaussian_weight)
    }

    /// Linear blend of two angles in degrees.
    ///
    /// Both values are wrapped into `[0, 360)` first. The blend takes no
    /// shortest-path correction: 350° and 10° blend through 180°.
    pub fn linear_interpolate_angle(&self, data: &[f64]) -> f64 {
        let (Some(above), Some(below)) = (self.above(), self.below()) else {
            return f64::NAN;
        };
        let va = sample(data, above);
        let vb = sample(data, below);
        if va.is_nan() || vb.is_nan() {
            return f64::NAN;
        }
        let va = wrap_degrees(va);
        let vb = wrap_degrees(vb);
        if above.index == below.index || va == vb {
            return va;
        }
        wrap_degrees(blend(va, above.absolute_distance, vb, below.absolute_distance))
    }

    /// Running weighted circular mean in degrees.
    ///
    /// Points are folded in window order. A sample more than 180° away from
    /// the running mean is shifted by +180° before it is blended in, so the
    /// result depends on point order.
    pub fn average_angle(&self, data: &[f64]) -> f64 {
        let mut mean = f64::NAN;
        let mut mass = 0.0;
        for point in &self.points {
            let value = sample(data, point);
            if value.is_nan() {
                continue;
            }
            let mut value = wrap_degrees(value);
            let weight = point.inverse_distance_weight;

            if mass <= 0.0 {
                mean = value;
                mass = weight;
                continue;
            }
            if (mean - value).abs() > FULL_TURN / 2.0 {
                value += FULL_TURN / 2.0;
            }
            mean = wrap_degrees((mean * mass + value * weight) / (mass + weight));
            mass += weight;
        }
        mean
    }

    pub fn closest_point(&self, data: &[f64]) -> f64 {
        self.closest().map_or(f64::NAN, |p| sample(data, p))
    }

    pub fn step_from_above(&self, data: &[f64]) -> f64 {
        self.above().map_or(f64::NAN, |p| sample(data, p))
    }

    pub fn step_from_below(&self, data: &[f64]) -> f64 {
        self.below().map_or(f64::NAN, |p| sample(data, p))
    }

    /// Geometric mean: `10^(Σ w·log10(v) / Σ w)` over positive samples.
    pub fn logarithmic_average(&self, data: &[f64]) -> f64 {
        let mut sum = 0.0;
        let mut mass = 0.0;
        for (value, weight) in self.positive_samples(data) {
            sum += value.log10() * weight;
            mass += weight;
        }
        if mass <= 0.0 {
            return f64::NAN;
        }
        10.0_f64.powf(sum / mass)
    }

    /// Harmonic mean: `Σ w / Σ (w/v)` over positive samples.
    pub fn harmonic_average(&self, data: &[f64]) -> f64 {
        let mut reciprocal_sum = 0.0;
        let mut mass = 0.0;
        for (value, weight) in self.positive_samples(data) {
            reciprocal_sum += weight / value;
            mass += weight;
        }
        if mass <= 0.0 || reciprocal_sum <= 0.0 {
            return f64::NAN;
        }
        mass / reciprocal_sum
    }

    fn weighted_mean(&self, data: &[f64], weight: impl Fn(&ResamplePoint) -> f64) -> f64 {
        let mut sum = 0.0;
        let mut mass = 0.0;
        for point in &self.points {
            let value = sample(data, point);
            if value.is_nan() {
                continue;
            }
            let w = weight(point);
            sum += value * w;
            mass += w;
        }
        if mass <= 0.0 {
            return f64::NAN;
        }
        sum / mass
    }

    /// `(value, inverse-distance weight)` for samples above the positive floor.
    fn positive_samples<'a>(&'a self, data: &'a [f64]) -> impl Iterator<Item = (f64, f64)> + 'a {
        self.points.iter().filter_map(move |point| {
            let value = sample(data, point);
            (value > self.min_positive_value).then_some((value, point.inverse_distance_weight))
        })
    }
}

/// Largest `min_window × 2^k` within `max_window`, for `k < max_iterations`.
///
/// The first width is always `min_window`, even when it exceeds `max_window`.
fn effective_window(min_window: f64, max_window: f64, max_iterations: u32) -> f64 {
    let mut window = min_window;
    for _ in 1..max_iterations {
        let next = window * 2.0;
        match next.partial_cmp(&max_window) {
            Some(Ordering::Less | Ordering::Equal) => window = next,
            _ => break,
        }
    }
    window
}

/// Position in `points` of the smallest absolute distance whose signed
/// distance satisfies `side`. Ties keep the earliest point.
fn nearest(points: &[ResamplePoint], side: impl Fn(f64) -> bool) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, point) in points.iter().enumerate() {
        if !side(point.distance) {
            continue;
        }
        match best {
            Some(b) if points[b].absolute_distance <= point.absolute_distance => {}
            _ => best = Some(i),
        }
    }
    best
}

fn sample(data: &[f64], point: &ResamplePoint) -> f64 {
    data.get(point.index).copied().unwrap_or(f64::NAN)
}

/// Closer value gets more weight: each value is weighted by the other's distance.
fn blend(va: f64, da: f64, vb: f64, db: f64) -> f64 {
    (va * db + vb * da) / (da + db)
}
