//! Channel storage — sampled data arrays and the files that own them.
//!
//! A [`Channel`] is a plain sample array plus metadata. Files expose their
//! channels through the [`ChannelFile`] capability trait; format readers
//! (LAS, LDF, ...) implement it or fill a [`LogFile`].

mod file;

pub use file::{ChannelFile, LogFile};

/// One sampled curve aligned 1:1 with its file's index channel.
///
/// Missing samples are NaN. Statistics are cached; call
/// [`refresh_statistics`](Self::refresh_statistics) after editing samples
/// through [`data_mut`](Self::data_mut).
#[derive(Debug, Clone)]
pub struct Channel {
    /// Mnemonic, e.g. `DEPT`, `GR`, `AZIM`.
    pub name: String,
    /// Unit string as written by the source format, e.g. `m`, `deg`, `ohmm`.
    pub unit: String,
    /// Free-text description.
    pub description: String,
    /// Display/number format hint carried through for writers.
    pub format: String,
    data: Vec<f64>,
    min_value: f64,
    max_value: f64,
    average: f64,
    loaded: bool,
}

impl Channel {
    /// Create an empty, unloaded channel.
    pub fn new(name: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            description: String::new(),
            format: String::new(),
            data: Vec::new(),
            min_value: f64::NAN,
            max_value: f64::NAN,
            average: f64::NAN,
            loaded: false,
        }
    }

    /// Create a loaded channel holding `data`.
    pub fn with_data(name: impl Into<String>, unit: impl Into<String>, data: Vec<f64>) -> Self {
        let mut channel = Self::new(name, unit);
        channel.set_data(data);
        channel
    }

    /// Builder-style description setter.
    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder-style format setter.
    pub fn formatted(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Mutable samples. Length is fixed; statistics are not refreshed.
    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Replace all samples, mark the channel loaded and refresh statistics.
    pub fn set_data(&mut self, data: Vec<f64>) {
        self.data = data;
        self.loaded = true;
        self.refresh_statistics();
    }

    /// Set every sample to NaN.
    pub fn fill_nan(&mut self) {
        self.data.fill(f64::NAN);
        self.refresh_statistics();
    }

    /// Sample at `position`, or NaN when out of range.
    pub fn value(&self, position: usize) -> f64 {
        self.data.get(position).copied().unwrap_or(f64::NAN)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn min_value(&self) -> f64 {
        self.min_value
    }

    pub fn max_value(&self) -> f64 {
        self.max_value
    }

    /// Mean of the non-NaN samples, NaN when there are none.
    pub fn average(&self) -> f64 {
        self.average
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Recompute min/max/average over non-NaN samples.
    pub fn refresh_statistics(&mut self) {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        let mut count = 0usize;
        for &v in self.data.iter().filter(|v| !v.is_nan()) {
            min = min.min(v);
            max = max.max(v);
            sum += v;
            count += 1;
        }

        if count == 0 {
            self.min_value = f64::NAN;
            self.max_value = f64::NAN;
            self.average = f64::NAN;
        } else {
            self.min_value = min;
            self.max_value = max;
            self.average = sum / count as f64;
        }
    }

    /// Case-insensitive mnemonic comparison, as log formats treat names.
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}
