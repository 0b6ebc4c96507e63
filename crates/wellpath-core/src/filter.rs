//! Channel clean-up passes: trimmed moving average, gap filling, low despike.
//!
//! Every pass works between the channel's first and last valid sample. A
//! channel with no valid sample is left untouched.

use tracing::debug;

use crate::angle::wrap_degrees;
use crate::channel::ChannelFile;

/// Smallest number of samples kept after Gunning trimming is `2k + 5`.
const GUNNING_MIN_KEPT: usize = 5;

/// First and last valid (non-NaN) sample positions of a channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataBoundaries {
    pub first: usize,
    pub last: usize,
    /// Index value at `first`.
    pub first_index: f64,
    /// Index value at `last`.
    pub last_index: f64,
}

/// Locate the valid data span of `data`, or `None` when every sample is NaN.
pub fn locate_data_boundaries(data: &[f64], index: &[f64]) -> Option<DataBoundaries> {
    let first = data.iter().position(|v| !v.is_nan())?;
    let last = data.iter().rposition(|v| !v.is_nan())?;
    let index_at = |position: usize| index.get(position).copied().unwrap_or(f64::NAN);
    Some(DataBoundaries {
        first,
        last,
        first_index: index_at(first),
        last_index: index_at(last),
    })
}

/// Runs clean-up passes on channels of one file, addressed by name.
pub struct ChannelFilter<'a, F: ?Sized> {
    file: &'a mut F,
}

impl<'a, F: ChannelFile + ?Sized> ChannelFilter<'a, F> {
    pub fn new(file: &'a mut F) -> Self {
        Self { file }
    }

    /// Valid data span of the named channel.
    pub fn data_boundaries(&self, name: &str) -> Option<DataBoundaries> {
        let channel = self.file.channel(name)?;
        locate_data_boundaries(channel.data(), self.file.index().data())
    }

    /// Gunning filter: centered moving average of the `2n + 1` neighboring
    /// positions after dropping the `k` lowest and `k` highest values.
    ///
    /// Returns `false` when the channel is missing or holds no valid sample.
    pub fn filter_channel_gunning(&mut self, name: &str, n: usize, k: usize) -> bool {
        let Some(bounds) = self.locate(name) else {
            return false;
        };
        let Some(channel) = self.file.channel_mut(name) else {
            return false;
        };
        let filtered = gunning_filter(channel.data(), bounds, n, k);
        channel.set_data(filtered);
        true
    }

    /// Fill NaN gaps by linear interpolation over array positions.
    ///
    /// With `is_azimuth`, a gap between values on either side of north
    /// (one ≥ 270°, the other ≤ 90°) is bridged through 0°.
    pub fn interpolate_channel_raw(&mut self, name: &str, is_azimuth: bool) -> bool {
        let Some(bounds) = self.locate(name) else {
            return false;
        };
        let Some(channel) = self.file.channel_mut(name) else {
            return false;
        };
        interpolate_gaps(channel.data_mut(), bounds, is_azimuth);
        channel.refresh_statistics();
        true
    }

    /// Replace samples below `average × threshold` with the average of the
    /// samples that survive, and fill every in-span gap the same way.
    pub fn despike_from_low(&mut self, name: &str, threshold: f64) -> bool {
        let Some(bounds) = self.locate(name) else {
            return false;
        };
        let Some(channel) = self.file.channel_mut(name) else {
            return false;
        };
        channel.refresh_statistics();
        let cutoff = channel.average() * threshold;
        despike_low(channel.data_mut(), bounds, cutoff);
        channel.refresh_statistics();
        true
    }

    fn locate(&self, name: &str) -> Option<DataBoundaries> {
        let bounds = self.data_boundaries(name);
        if bounds.is_none() {
            debug!(channel = name, "filter skipped, no valid samples");
        }
        bounds
    }
}

/// Trimmed moving average over a snapshot of `data`.
///
/// Positions outside `bounds` come back NaN.
pub fn gunning_filter(data: &[f64], bounds: DataBoundaries, n: usize, k: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; data.len()];
    let mut window = Vec::with_capacity(2 * n + 1);
    for (i, slot) in out
        .iter_mut()
        .enumerate()
        .take(bounds.last + 1)
        .skip(bounds.first)
    {
        let lo = i.saturating_sub(n);
        let hi = i.saturating_add(n).min(data.len() - 1);
        window.clear();
        window.extend(data[lo..=hi].iter().copied().filter(|v| !v.is_nan()));
        *slot = trimmed_mean(&mut window, k);
    }
    out
}

/// Mean after sorting and dropping `k` values from each end. `k` shrinks
/// until at least `2k + 5` values are available.
fn trimmed_mean(values: &mut [f64], k: usize) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.sort_by(f64::total_cmp);

    let mut k = k;
    while k > 0 && values.len() < 2 * k + GUNNING_MIN_KEPT {
        k -= 1;
    }
    let kept = &values[k..values.len() - k];
    kept.iter().sum::<f64>() / kept.len() as f64
}

/// Linear gap filling between valid neighbors inside `bounds`.
pub fn interpolate_gaps(data: &mut [f64], bounds: DataBoundaries, is_azimuth: bool) {
    let valid: Vec<usize> = (bounds.first..=bounds.last)
        .filter(|&i| !data[i].is_nan())
        .collect();

    for pair in valid.windows(2) {
        let (lower, upper) = (pair[0], pair[1]);
        if upper - lower < 2 {
            continue;
        }
        let mut low_value = data[lower];
        let mut high_value = data[upper];
        if is_azimuth {
            if low_value >= 270.0 && high_value <= 90.0 {
                low_value -= 360.0;
            } else if high_value >= 270.0 && low_value <= 90.0 {
                high_value -= 360.0;
            }
        }

        let span = (upper - lower) as f64;
        for (i, slot) in data.iter_mut().enumerate().take(upper).skip(lower + 1) {
            let value = (low_value * (upper - i) as f64 + high_value * (i - lower) as f64) / span;
            *slot = if is_azimuth { wrap_degrees(value) } else { value };
        }
    }
}

/// Blank samples below `cutoff`, then fill in-span NaNs with the mean of
/// the in-span survivors.
pub fn despike_low(data: &mut [f64], bounds: DataBoundaries, cutoff: f64) {
    for value in data.iter_mut() {
        if *value < cutoff {
            *value = f64::NAN;
        }
    }

    let span = &mut data[bounds.first..=bounds.last];
    let (sum, count) = span
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    let replacement = if count == 0 { f64::NAN } else { sum / count as f64 };

    for value in span.iter_mut().filter(|v| v.is_nan()) {
        *value = replacement;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{Channel, LogFile};

    const EPSILON: f64 = 1e-9;
    const NAN: f64 = f64::NAN;

    fn make_file(values: Vec<f64>) -> LogFile {
        let index: Vec<f64> = (0..values.len()).map(|i| 1000.0 + i as f64 * 0.5).collect();
        LogFile::new(Channel::with_data("DEPT", "m", index))
            .with_channel(Channel::with_data("GR", "gAPI", values))
            .unwrap()
    }

    fn assert_slice_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
            if e.is_nan() {
                assert!(a.is_nan(), "sample {i}: expected NaN, got {a}");
            } else {
                assert!((a - e).abs() < EPSILON, "sample {i}: {a} vs {e}");
            }
        }
    }

    #[test]
    fn test_boundaries_skip_leading_and_trailing_nan() {
        let data = [NAN, 1.0, NAN, 2.0, NAN];
        let index = [10.0, 11.0, 12.0, 13.0, 14.0];
        let bounds = locate_data_boundaries(&data, &index).unwrap();
        assert_eq!((bounds.first, bounds.last), (1, 3));
        assert_eq!((bounds.first_index, bounds.last_index), (11.0, 13.0));
    }

    #[test]
    fn test_boundaries_all_nan_is_none() {
        assert!(locate_data_boundaries(&[NAN, NAN], &[0.0, 1.0]).is_none());
        assert!(locate_data_boundaries(&[], &[]).is_none());
    }

    #[test]
    fn test_gunning_without_trim_is_moving_average() {
        let data = [NAN, 1.0, 2.0, 6.0, NAN, 4.0, NAN];
        let bounds = locate_data_boundaries(&data, &[]).unwrap();
        let out = gunning_filter(&data, bounds, 1, 0);
        assert_slice_close(&out, &[NAN, 1.5, 3.0, 4.0, 5.0, 4.0, NAN]);
    }

    #[test]
    fn test_gunning_trims_extremes() {
        // Nine samples with one spike; n = 4, k = 2 keeps the middle five.
        let data = [1.0, 2.0, 3.0, 4.0, 100.0, 5.0, 6.0, 7.0, 8.0];
        let bounds = locate_data_boundaries(&data, &[]).unwrap();
        let out = gunning_filter(&data, bounds, 4, 2);
        // Sorted: 1 2 | 3 4 5 6 7 | 8 100
        assert!((out[4] - 5.0).abs() < EPSILON);
    }

    #[test]
    fn test_gunning_reduces_trim_for_small_windows() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let mut sorted = values;
        // 7 values: k = 3 needs 11, k = 2 needs 9, k = 1 needs 7.
        assert!((trimmed_mean(&mut sorted, 3) - 4.0).abs() < EPSILON);
        let mut few = [10.0, 1.0];
        assert!((trimmed_mean(&mut few, 2) - 5.5).abs() < EPSILON);
    }

    #[test]
    fn test_gunning_channel_operation() {
        let mut file = make_file(vec![NAN, 2.0, 4.0, 6.0]);
        let mut filter = ChannelFilter::new(&mut file);
        assert!(filter.filter_channel_gunning("GR", 1, 0));
        assert_slice_close(file.channel("GR").unwrap().data(), &[NAN, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_interpolate_fills_by_position() {
        let mut data = [NAN, 0.0, NAN, NAN, 3.0, NAN, 5.0, NAN];
        let bounds = locate_data_boundaries(&data, &[]).unwrap();
        interpolate_gaps(&mut data, bounds, false);
        assert_slice_close(&data, &[NAN, 0.0, 1.0, 2.0, 3.0, 4.0, 5.0, NAN]);
    }

    #[test]
    fn test_interpolate_azimuth_through_north() {
        let mut data = [350.0, NAN, NAN, NAN, 10.0];
        let bounds = locate_data_boundaries(&data, &[]).unwrap();
        interpolate_gaps(&mut data, bounds, true);
        assert_slice_close(&data, &[350.0, 355.0, 0.0, 5.0, 10.0]);

        let mut data = [20.0, NAN, 300.0];
        let bounds = locate_data_boundaries(&data, &[]).unwrap();
        interpolate_gaps(&mut data, bounds, true);
        assert!((data[1] - 340.0).abs() < EPSILON);
    }

    #[test]
    fn test_interpolate_azimuth_without_straddle_is_linear() {
        let mut data = [100.0, NAN, 200.0];
        let bounds = locate_data_boundaries(&data, &[]).unwrap();
        interpolate_gaps(&mut data, bounds, true);
        assert!((data[1] - 150.0).abs() < EPSILON);
    }

    #[test]
    fn test_despike_replaces_low_samples_with_survivor_mean() {
        let mut file = make_file(vec![NAN, 10.0, 1.0, 12.0, NAN, 14.0, NAN]);
        let mut filter = ChannelFilter::new(&mut file);
        // Average 9.25, cutoff 4.625: the 1.0 goes, survivors average 12.
        assert!(filter.despike_from_low("GR", 0.5));
        let channel = file.channel("GR").unwrap();
        assert_slice_close(channel.data(), &[NAN, 10.0, 12.0, 12.0, 12.0, 14.0, NAN]);
        assert!((channel.average() - 12.0).abs() < EPSILON);
    }

    #[test]
    fn test_all_nan_channel_is_untouched() {
        let mut file = make_file(vec![NAN, NAN, NAN]);
        let mut filter = ChannelFilter::new(&mut file);
        assert!(!filter.filter_channel_gunning("GR", 2, 1));
        assert!(!filter.interpolate_channel_raw("GR", false));
        assert!(!filter.despike_from_low("GR", 0.5));
        assert!(!filter.despike_from_low("MISSING", 0.5));
        assert!(file.channel("GR").unwrap().data().iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_data_boundaries_report_index_values() {
        let mut file = make_file(vec![NAN, 1.0, 2.0, NAN]);
        let filter = ChannelFilter::new(&mut file);
        let bounds = filter.data_boundaries("GR").unwrap();
        assert_eq!(bounds.first_index, 1000.5);
        assert_eq!(bounds.last_index, 1001.0);
    }
}
