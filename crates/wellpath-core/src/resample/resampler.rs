//! Whole-index resampling of channels and files.

use tracing::debug;

use super::map::ResampleMap;
use super::method::ResampleMethod;
use crate::channel::{Channel, ChannelFile};
use crate::config::Tolerances;

/// One [`ResampleMap`] per destination index sample.
///
/// Maps depend only on the two index channels, so a single resampler can
/// be reused for every channel sampled on the same source index.
#[derive(Debug, Clone)]
pub struct Resampler {
    maps: Vec<ResampleMap>,
    min_window: f64,
    max_window: f64,
}

impl Resampler {
    /// Fully automatic window.
    ///
    /// ```text
    /// min_window = ½ × smallest destination gap
    /// max_window = max(2 × largest source gap, min_window)
    /// ```
    pub fn new(source_index: &[f64], destination_index: &[f64]) -> Self {
        Self::with_tolerances(source_index, destination_index, Tolerances::default())
    }

    /// [`new`](Self::new) with explicit tolerances.
    pub fn with_tolerances(
        source_index: &[f64],
        destination_index: &[f64],
        tolerances: Tolerances,
    ) -> Self {
        let largest_source = largest_gap(source_index).unwrap_or(0.0);
        let min_window = smallest_gap(destination_index).unwrap_or(largest_source) * 0.5;
        let max_window = (2.0 * largest_source).max(min_window);
        Self::with_window_and_tolerances(
            source_index,
            destination_index,
            min_window,
            max_window,
            tolerances,
        )
    }

    /// Caller-supplied minimum; `max_window = 2 × largest source gap`.
    pub fn with_min_window(
        source_index: &[f64],
        destination_index: &[f64],
        min_window: f64,
    ) -> Self {
        Self::with_min_window_and_tolerances(
            source_index,
            destination_index,
            min_window,
            Tolerances::default(),
        )
    }

    /// [`with_min_window`](Self::with_min_window) with explicit tolerances.
    pub fn with_min_window_and_tolerances(
        source_index: &[f64],
        destination_index: &[f64],
        min_window: f64,
        tolerances: Tolerances,
    ) -> Self {
        let max_window = 2.0 * largest_gap(source_index).unwrap_or(0.0);
        Self::with_window_and_tolerances(
            source_index,
            destination_index,
            min_window,
            max_window,
            tolerances,
        )
    }

    /// Caller-supplied window bounds.
    pub fn with_window(
        source_index: &[f64],
        destination_index: &[f64],
        min_window: f64,
        max_window: f64,
    ) -> Self {
        Self::with_window_and_tolerances(
            source_index,
            destination_index,
            min_window,
            max_window,
            Tolerances::default(),
        )
    }

    /// [`with_window`](Self::with_window) with explicit tolerances.
    pub fn with_window_and_tolerances(
        source_index: &[f64],
        destination_index: &[f64],
        min_window: f64,
        max_window: f64,
        tolerances: Tolerances,
    ) -> Self {
        let maps: Vec<ResampleMap> = destination_index
            .iter()
            .map(|&target| {
                ResampleMap::new(source_index, target, min_window, max_window, &tolerances)
            })
            .collect();

        debug!(
            source_len = source_index.len(),
            maps = maps.len(),
            min_window,
            max_window,
            "built resampler"
        );

        Self {
            maps,
            min_window,
            max_window,
        }
    }

    pub fn maps(&self) -> &[ResampleMap] {
        &self.maps
    }

    pub fn min_window(&self) -> f64 {
        self.min_window
    }

    pub fn max_window(&self) -> f64 {
        self.max_window
    }

    /// Resample raw source samples; the output has one value per map.
    pub fn resample_values(&self, source: &[f64], method: ResampleMethod) -> Vec<f64> {
        self.maps
            .iter()
            .map(|map| map.evaluate(method, source))
            .collect()
    }

    /// Replace `destination`'s samples with `source` resampled by `method`.
    pub fn resample(&self, source: &Channel, destination: &mut Channel, method: ResampleMethod) {
        let values = self.resample_values(source.data(), method);
        destination.set_data(values);
    }

    /// Resample every destination data channel that has a same-named
    /// source channel, choosing the method from name and unit.
    ///
    /// Returns the number of channels resampled.
    pub fn resample_file<S, D>(
        &self,
        source: &S,
        destination: &mut D,
        default_method: ResampleMethod,
    ) -> usize
    where
        S: ChannelFile + ?Sized,
        D: ChannelFile + ?Sized,
    {
        let mut count = 0;
        for name in destination.channel_names() {
            let Some(source_channel) = source.channel(&name) else {
                debug!(channel = %name, "no source channel, skipped");
                continue;
            };
            let Some(destination_channel) = destination.channel_mut(&name) else {
                continue;
            };
            let method = ResampleMethod::for_channel(
                &destination_channel.name,
                &destination_channel.unit,
                default_method,
            );
            self.resample(source_channel, destination_channel, method);
            count += 1;
        }
        count
    }

    /// [`resample_file`](Self::resample_file), after creating destination
    /// channels for every source channel the destination lacks.
    pub fn resample_create_channels<S, D>(
        &self,
        source: &S,
        destination: &mut D,
        default_method: ResampleMethod,
    ) -> usize
    where
        S: ChannelFile + ?Sized,
        D: ChannelFile + ?Sized,
    {
        for position in 0..source.channel_count() {
            let Some(channel) = source.channel_at(position) else {
                continue;
            };
            if let Err(err) = destination.get_or_create_channel(
                &channel.name,
                &channel.unit,
                &channel.description,
                &channel.format,
            ) {
                debug!(channel = %channel.name, %err, "cannot create destination channel");
            }
        }
        self.resample_file(source, destination, default_method)
    }
}

/// Absolute differences between consecutive non-NaN index samples.
fn gaps(index: &[f64]) -> impl Iterator<Item = f64> + '_ {
    index
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).abs())
        .filter(|gap| !gap.is_nan())
}

fn largest_gap(index: &[f64]) -> Option<f64> {
    gaps(index).reduce(f64::max)
}

/// Smallest non-zero gap; duplicate index values are ignored.
fn smallest_gap(index: &[f64]) -> Option<f64> {
    gaps(index).filter(|&gap| gap > 0.0).reduce(f64::min)
}
