//! Trait interfaces for signal-processing capabilities.
//!
//! Kernels are built once through [`crate::kernel::KernelLifecycle`] and then
//! run against any buffer implementing the 1D adapters.

use crate::kernel::{ExecInvariantViolation, Read1D, Write1D};
use crate::signal::snr::SnrReport;
use emg_dsp_core::fft::Complex;

/// Whole-sequence discrete Fourier transform capability.
pub trait Transform1D {
    /// Run the transform into a caller-provided output buffer of the input's
    /// length.
    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<Complex<f64>> + ?Sized,
        O: Write1D<Complex<f64>> + ?Sized;

    /// Run the transform and allocate output.
    fn run_alloc<I>(&self, input: &I) -> Result<Vec<Complex<f64>>, ExecInvariantViolation>
    where
        I: Read1D<Complex<f64>> + ?Sized;
}

/// Window generation capability.
pub trait WindowGenerate<T> {
    /// Run window generation into a caller-provided output buffer.
    fn run_into<O>(&self, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        O: Write1D<T> + ?Sized;

    /// Run window generation and allocate output samples.
    fn run_alloc(&self) -> Result<Vec<T>, ExecInvariantViolation>;
}

/// Windowed periodogram capability.
pub trait Periodogram1D {
    /// Compute one-sided frequencies and PSD into caller-provided buffers.
    fn run_into<I, OF, OP>(
        &self,
        input: &I,
        freqs: &mut OF,
        pxx: &mut OP,
    ) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
        OF: Write1D<f64> + ?Sized,
        OP: Write1D<f64> + ?Sized;

    /// Compute one-sided frequencies and PSD, allocating both.
    fn run_alloc<I>(&self, input: &I) -> Result<(Vec<f64>, Vec<f64>), ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized;
}

/// Signal-to-noise estimation capability.
pub trait SnrEstimate1D {
    /// Estimate the SNR of a sample block.
    fn run<I>(&self, input: &I) -> Result<SnrReport, ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized;
}
