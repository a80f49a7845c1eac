//! Spectral analysis of sampled signals.
//!
//! - [`windows`]: Kaiser window generation.
//! - [`spectral`]: transform kernel, windowed periodogram, equivalent noise
//!   bandwidth and band power.
//! - [`tone`]: isolation of a spectral tone and its skirt.
//! - [`snr`]: signal-to-noise ratio with harmonic rejection.

pub mod snr;
pub mod spectral;
pub mod tone;
pub mod traits;
pub mod windows;
