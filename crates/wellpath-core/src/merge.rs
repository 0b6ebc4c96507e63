//! Cross-file channel merging with windows sized from each file's step.
//!
//! # Window
//! ```text
//! step       = |STEP| constant, else |index[1] − index[0]|, floored at min_step
//! min_window = 0.5 × step_dst
//! max_window = 2 × max(step_dst, step_src)
//! ```

use tracing::{debug, warn};

use crate::channel::ChannelFile;
use crate::config::Tolerances;
use crate::resample::{ResampleMethod, Resampler};

/// Header constant holding a file's sampling step.
pub const STEP_CONSTANT: &str = "STEP";

/// Copies channels from one file onto another file's index.
pub struct Merger<'a, S: ?Sized, D: ?Sized> {
    source: &'a S,
    destination: &'a mut D,
    resampler: Resampler,
    source_step: f64,
    destination_step: f64,
}

impl<'a, S, D> Merger<'a, S, D>
where
    S: ChannelFile + ?Sized,
    D: ChannelFile + ?Sized,
{
    pub fn new(source: &'a S, destination: &'a mut D) -> Self {
        Self::with_tolerances(source, destination, Tolerances::default())
    }

    pub fn with_tolerances(source: &'a S, destination: &'a mut D, tolerances: Tolerances) -> Self {
        let source_step = file_step(source, tolerances.min_step);
        let destination_step = file_step(destination, tolerances.min_step);
        let min_window = 0.5 * destination_step;
        let max_window = 2.0 * destination_step.max(source_step);

        let resampler = Resampler::with_window_and_tolerances(
            source.index().data(),
            destination.index().data(),
            min_window,
            max_window,
            tolerances,
        );

        Self {
            source,
            destination,
            resampler,
            source_step,
            destination_step,
        }
    }

    pub fn source_step(&self) -> f64 {
        self.source_step
    }

    pub fn destination_step(&self) -> f64 {
        self.destination_step
    }

    pub fn resampler(&self) -> &Resampler {
        &self.resampler
    }

    /// Resample the named source channel onto the destination index.
    ///
    /// A destination channel that does not exist yet is created with the
    /// source channel's metadata; an existing one is cleared to NaN first.
    /// Returns `false` when the source has no such channel or the
    /// destination refuses to create it.
    pub fn merge_channel(&mut self, name: &str, method: ResampleMethod) -> bool {
        let source_file = self.source;
        let Some(source) = source_file.channel(name) else {
            debug!(channel = name, "merge skipped, not in source");
            return false;
        };

        let destination = match self.destination.get_or_create_channel(
            &source.name,
            &source.unit,
            &source.description,
            &source.format,
        ) {
            Ok(channel) => channel,
            Err(err) => {
                warn!(channel = name, %err, "merge skipped, cannot create destination channel");
                return false;
            }
        };

        destination.fill_nan();
        self.resampler.resample(source, destination, method);
        true
    }

    /// Merge every source data channel. Returns the number merged.
    pub fn merge_all(&mut self, method: ResampleMethod) -> usize {
        let mut count = 0;
        for name in self.source.channel_names() {
            if self.merge_channel(&name, method) {
                count += 1;
            }
        }
        count
    }
}

/// Sampling step of a file, from its `STEP` constant or its first two
/// index samples.
///
/// A zero, non-numeric or missing `STEP` falls back to the index spacing.
fn file_step<F: ChannelFile + ?Sized>(file: &F, min_step: f64) -> f64 {
    let declared = file
        .constant(STEP_CONSTANT)
        .and_then(|value| value.split_whitespace().next())
        .and_then(|value| value.parse::<f64>().ok())
        .map(f64::abs)
        .filter(|step| step.is_finite() && *step > 0.0);

    let step = declared.unwrap_or_else(|| match file.index().data() {
        [first, second, ..] => (second - first).abs(),
        _ => 0.0,
    });

    if step >= min_step { step } else { min_step }
}
