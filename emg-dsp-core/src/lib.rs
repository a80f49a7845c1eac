//! Core numerics shared by `emg-dsp`.
//!
//! Holds the crate-wide [`Error`] type and the [`fft`] engine, a discrete
//! Fourier transform that accepts any input length.

mod error;
pub mod fft;

pub use error::{Error, Result};
