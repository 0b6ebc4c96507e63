//! Wellpath Core — resampling, merging, filtering and survey integration
//! for depth/time-indexed log channels.
//!
//! This crate holds the numeric engine only. File formats supply data by
//! implementing [`ChannelFile`]; everything here works on in-memory arrays.

pub mod angle;
pub mod channel;
pub mod config;
pub mod error;
pub mod filter;
pub mod merge;
pub mod resample;
pub mod survey;

// Re-exports for convenience.
pub use channel::{Channel, ChannelFile, LogFile};
pub use config::Tolerances;
pub use error::{ChannelError, ConfigError, SurveyError};
pub use filter::{ChannelFilter, DataBoundaries, locate_data_boundaries};
pub use merge::Merger;
pub use resample::{ResampleMap, ResampleMethod, ResamplePoint, Resampler};
pub use survey::{Orientation, SurveyIntegrator, SurveyPath, SurveyStep, minimum_curvature_step};
