//! Spectral estimation helpers: transform kernel, windowed periodogram,
//! equivalent noise bandwidth and band power.

use crate::kernel::{
    check_output_len, check_sample_rate, ConfigError, ExecInvariantViolation, KernelLifecycle,
    Read1D, Write1D,
};
use crate::signal::traits::{Periodogram1D, Transform1D};
use crate::signal::windows::kaiser;
use crate::stats;
use emg_dsp_core::fft::{self, Complex};
use emg_dsp_core::{Error, Result};
use itertools::Itertools;
use std::iter;

/// Frequency of every transform bin: `k * fs / len` for `k in 0..len`.
pub fn frequency_axis(len: usize, fs: f64) -> Vec<f64> {
    (0..len).map(|k| k as f64 * fs / len as f64).collect()
}

/// Number of bins kept by the one-sided fold of an `n`-point spectrum:
/// `n/2 + 1` for even `n`, `(n+1)/2` for odd `n`.
pub fn onesided_len(n: usize) -> usize {
    n / 2 + 1
}

/// [`frequency_axis`] truncated to the one-sided bins.
pub fn onesided_frequencies(n: usize, fs: f64) -> Vec<f64> {
    let mut freqs = frequency_axis(n, fs);
    freqs.truncate(onesided_len(n));
    freqs
}

fn fold_onesided(two_sided: &[f64], fs: f64) -> Vec<f64> {
    let n = two_sided.len();
    let keep = onesided_len(n);
    two_sided[..keep]
        .iter()
        .enumerate()
        .map(|(k, &v)| {
            // Even lengths keep DC and Nyquist unpaired.
            let paired = n % 2 == 1 || (k != 0 && k != keep - 1);
            if paired {
                2.0 * v / fs
            } else {
                v / fs
            }
        })
        .collect()
}

/// One-sided power spectral density of `signal` weighted by `window`.
///
/// The two-sided estimate is `|X[k]|^2 / U` with `X` the transform of
/// `signal * window` and `U = sum(window^2)`. Folding keeps `n/2 + 1` bins for
/// even `n`, doubling all but the first and last, or `(n+1)/2` bins for odd
/// `n`, doubling all of them. Every bin is finally divided by `fs`.
///
/// # Errors
/// [`Error::InvalidArg`] for an empty signal or invalid `fs`,
/// [`Error::LengthMismatch`] if the window length differs from the signal.
pub fn periodic_windowed_spectrum(signal: &[f64], window: &[f64], fs: f64) -> Result<Vec<f64>> {
    if signal.is_empty() {
        return Err(Error::invalid("signal", "signal must be non-empty"));
    }
    if window.len() != signal.len() {
        return Err(Error::length_mismatch("window", signal.len(), window.len()));
    }
    check_sample_rate(fs)?;

    let windowed = signal
        .iter()
        .zip(window.iter())
        .map(|(x, w)| x * w)
        .collect::<Vec<_>>();
    let spectrum = fft::transform_real(&windowed)?;
    let u = window.iter().map(|w| w * w).sum::<f64>();
    let two_sided = spectrum.iter().map(|c| c.norm_sqr() / u).collect::<Vec<_>>();
    Ok(fold_onesided(&two_sided, fs))
}

/// Equivalent noise bandwidth of `window` in Hz:
/// `(sum(w^2) / n) / mean(w)^2 * fs / n`.
pub fn enbw(window: &[f64], fs: f64) -> Result<f64> {
    if window.is_empty() {
        return Err(Error::invalid("window", "window must be non-empty"));
    }
    check_sample_rate(fs)?;
    let n = window.len() as f64;
    let (mean, _) = stats::mean::<_, f64>(window.iter());
    let mean_square = window.iter().map(|w| w * w).sum::<f64>() / n;
    Ok(mean_square / (mean * mean) * fs / n)
}

fn check_band(psd: &[f64], freqs: &[f64]) -> Result<()> {
    if freqs.len() != psd.len() {
        return Err(Error::length_mismatch("freqs", psd.len(), freqs.len()));
    }
    if psd.len() < 2 {
        return Err(Error::invalid("psd", "band power needs at least two bins"));
    }
    Ok(())
}

/// Width of every bin: consecutive frequency differences, with the bin at
/// the open edge imputed from the mean spacing. A spectrum that starts at
/// 0 Hz imputes the last width, any other spectrum the first.
fn bin_widths(freqs: &[f64]) -> Vec<f64> {
    let n = freqs.len();
    let missing = (freqs[n - 1] - freqs[0]) / (n - 1) as f64;
    let diffs = freqs.iter().tuple_windows().map(|(lo, hi)| hi - lo);
    if freqs[0] != 0.0 {
        iter::once(missing).chain(diffs).collect()
    } else {
        diffs.chain(iter::once(missing)).collect()
    }
}

fn integrate(psd: &[f64], freqs: &[f64], f_lo: f64, f_hi: f64) -> f64 {
    let first = freqs.iter().rposition(|&f| f <= f_lo).unwrap_or(0);
    let last = freqs
        .iter()
        .position(|&f| f >= f_hi)
        .unwrap_or(freqs.len() - 1);
    bin_widths(freqs)[first..=last]
        .iter()
        .zip(psd[first..=last].iter())
        .map(|(w, p)| w * p)
        .sum()
}

/// Power of `psd` integrated over its whole frequency range,
/// `sum(width[i] * psd[i])`.
///
/// # Errors
/// [`Error::LengthMismatch`] if `freqs` and `psd` differ in length,
/// [`Error::InvalidArg`] for fewer than two bins.
pub fn bandpower(psd: &[f64], freqs: &[f64]) -> Result<f64> {
    check_band(psd, freqs)?;
    Ok(integrate(psd, freqs, freqs[0], freqs[freqs.len() - 1]))
}

/// Power of `psd` between `f_lo` and `f_hi`.
///
/// Integration runs from the last bin at or below `f_lo` through the first
/// bin at or above `f_hi`, so partially covered edge bins count in full.
pub fn bandpower_range(psd: &[f64], freqs: &[f64], f_lo: f64, f_hi: f64) -> Result<f64> {
    check_band(psd, freqs)?;
    let (start, end) = (freqs[0], freqs[freqs.len() - 1]);
    if !(f_lo <= f_hi) {
        return Err(Error::invalid("f_hi", "band must satisfy f_lo <= f_hi"));
    }
    if !(start <= f_lo && f_hi <= end) {
        return Err(Error::invalid("f_lo", "band must lie within the spectrum"));
    }
    Ok(integrate(psd, freqs, f_lo, f_hi))
}

/// Transform direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Unnormalized forward transform.
    #[default]
    Forward,
    /// Inverse transform carrying the `1/n` factor.
    Inverse,
}

/// Constructor config for [`FftKernel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FftConfig {
    /// Transform direction.
    pub direction: Direction,
}

/// Trait-first arbitrary-length transform kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FftKernel {
    direction: Direction,
}

impl KernelLifecycle for FftKernel {
    type Config = FftConfig;

    fn try_new(config: Self::Config) -> core::result::Result<Self, ConfigError> {
        Ok(Self {
            direction: config.direction,
        })
    }
}

impl Transform1D for FftKernel {
    fn run_into<I, O>(
        &self,
        input: &I,
        out: &mut O,
    ) -> core::result::Result<(), ExecInvariantViolation>
    where
        I: Read1D<Complex<f64>> + ?Sized,
        O: Write1D<Complex<f64>> + ?Sized,
    {
        let spectrum = self.run_alloc(input)?;
        let out = out.write_slice_mut()?;
        check_output_len("out", spectrum.len(), out.len())?;
        out.copy_from_slice(&spectrum);
        Ok(())
    }

    fn run_alloc<I>(
        &self,
        input: &I,
    ) -> core::result::Result<Vec<Complex<f64>>, ExecInvariantViolation>
    where
        I: Read1D<Complex<f64>> + ?Sized,
    {
        let input = input.read_nonempty("input")?;
        let spectrum = match self.direction {
            Direction::Forward => fft::transform(input)?,
            Direction::Inverse => fft::inverse_transform(input)?,
        };
        Ok(spectrum)
    }
}

/// Constructor config for [`PeriodogramKernel`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodogramConfig {
    /// Sampling frequency in Hz.
    pub fs: f64,
    /// Kaiser window shape.
    pub beta: f64,
}

/// Trait-first Kaiser-windowed periodogram kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodogramKernel {
    fs: f64,
    beta: f64,
}

impl KernelLifecycle for PeriodogramKernel {
    type Config = PeriodogramConfig;

    fn try_new(config: Self::Config) -> core::result::Result<Self, ConfigError> {
        check_sample_rate(config.fs)?;
        if !config.beta.is_finite() || config.beta < 0.0 {
            return Err(ConfigError::InvalidArgument {
                arg: "beta",
                reason: "shape must be finite and >= 0",
            });
        }
        Ok(Self {
            fs: config.fs,
            beta: config.beta,
        })
    }
}

impl Periodogram1D for PeriodogramKernel {
    fn run_into<I, OF, OP>(
        &self,
        input: &I,
        freqs: &mut OF,
        pxx: &mut OP,
    ) -> core::result::Result<(), ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
        OF: Write1D<f64> + ?Sized,
        OP: Write1D<f64> + ?Sized,
    {
        let input = input.read_nonempty("input")?;
        let expected = onesided_len(input.len());
        let freqs_out = freqs.write_slice_mut()?;
        check_output_len("freqs", expected, freqs_out.len())?;
        let pxx_out = pxx.write_slice_mut()?;
        check_output_len("pxx", expected, pxx_out.len())?;

        let (f, p) = self.run_alloc(input)?;
        freqs_out.copy_from_slice(&f);
        pxx_out.copy_from_slice(&p);
        Ok(())
    }

    fn run_alloc<I>(
        &self,
        input: &I,
    ) -> core::result::Result<(Vec<f64>, Vec<f64>), ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
    {
        let input = input.read_nonempty("input")?;
        let window = kaiser(input.len(), self.beta)?;
        let pxx = periodic_windowed_spectrum(input, &window, self.fs)?;
        Ok((onesided_frequencies(input.len(), self.fs), pxx))
    }
}

/// Kaiser-windowed one-sided periodogram of `x`, returned as
/// `(frequencies, psd)`.
pub fn periodogram(x: &[f64], fs: f64, beta: f64) -> Result<(Vec<f64>, Vec<f64>)> {
    let kernel = PeriodogramKernel::try_new(PeriodogramConfig { fs, beta })?;
    Ok(kernel.run_alloc(x)?)
}
