//! Resampling — neighbor search, weighting and whole-index drivers.

pub mod map;
pub mod method;
pub mod point;
pub mod resampler;

pub use map::ResampleMap;
pub use method::ResampleMethod;
pub use point::ResamplePoint;
pub use resampler::Resampler;
