//! A single neighbor candidate and its distance-derived weights.

/// One source sample considered for a target index value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResamplePoint {
    /// Position of the sample in the source arrays.
    pub index: usize,
    /// Signed distance `target − source`.
    pub distance: f64,
    /// `|distance|`, floored by [`normalize`](Self::normalize).
    pub absolute_distance: f64,
    pub inverse_distance_weight: f64,
    pub inverse_square_distance_weight: f64,
    pub gaussian_weight: f64,
}

impl ResamplePoint {
    /// Candidate at source position `index` with signed distance `distance`.
    /// Weights are zero until [`normalize`](Self::normalize) runs.
    pub fn new(index: usize, distance: f64) -> Self {
        Self {
            index,
            distance,
            absolute_distance: distance.abs(),
            inverse_distance_weight: 0.0,
            inverse_square_distance_weight: 0.0,
            gaussian_weight: 0.0,
        }
    }

    /// Compute weights against the window scale `weight`.
    ///
    /// ```text
    /// d    = max(|distance|, min_distance)
    /// idw  = weight / d
    /// isdw = idw²
    /// g    = exp(−d² · weight²)
    /// ```
    pub fn normalize(&mut self, weight: f64, min_distance: f64) {
        if self.absolute_distance < min_distance {
            self.absolute_distance = min_distance;
        }
        let d = self.absolute_distance;
        self.inverse_distance_weight = weight / d;
        self.inverse_square_distance_weight =
            self.inverse_distance_weight * self.inverse_distance_weight;
        self.gaussian_weight = (-(d * d) * weight * weight).exp();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn test_new_records_absolute_distance() {
        let point = ResamplePoint::new(3, -2.5);
        assert_eq!(point.index, 3);
        assert_eq!(point.distance, -2.5);
        assert_eq!(point.absolute_distance, 2.5);
    }

    #[test]
    fn test_normalize_computes_weights() {
        let mut point = ResamplePoint::new(0, 2.0);
        point.normalize(0.5, 1e-6);
        assert!((point.inverse_distance_weight - 0.25).abs() < EPSILON);
        assert!((point.inverse_square_distance_weight - 0.0625).abs() < EPSILON);
        assert!((point.gaussian_weight - (-1.0_f64).exp()).abs() < EPSILON);
    }

    #[test]
    fn test_normalize_zero_distance_is_finite() {
        let mut point = ResamplePoint::new(0, 0.0);
        point.normalize(1.0, 1e-6);
        assert_eq!(point.absolute_distance, 1e-6);
        assert!(point.inverse_distance_weight.is_finite());
        assert!((point.inverse_distance_weight - 1e6).abs() < 1e-3);
        assert!(point.inverse_square_distance_weight.is_finite());
        assert!((point.gaussian_weight - 1.0).abs() < 1e-9);
    }
}
