#![doc = include_str!("../../README.md")]
#![deny(missing_debug_implementations)]

/// Validated kernel lifecycle and 1D buffer adapters
pub mod kernel;

/// Windows, periodograms, tone isolation and SNR estimation
pub mod signal;

/// Modified Bessel functions of the first kind
pub mod special;

/// Descriptive statistics and spectrum descriptors
pub mod stats;

pub use emg_dsp_core::{fft, Error, Result};
