//! Descriptive reductions over samples and spectra.
//!
//! The generic reductions take any iterator of borrowed numbers, like
//! `median(y.iter())`. The frequency descriptors take a magnitude spectrum
//! as produced by [`crate::fft::magnitude`] together with the sample rate.

use crate::kernel::check_sample_rate;
use core::{borrow::Borrow, ops::Add};
use emg_dsp_core::{fft, Error, Result};
use itertools::Itertools;
use num_traits::{Float, Num, NumCast};

// Quick select finds the `k`th smallest element with 2N comparisons
fn quickselect<B, T>(y: &[B], k: usize) -> T
where
    B: Borrow<T>,
    T: PartialOrd + Copy,
{
    let n = y.len();
    if n == 1 {
        return *y[0].borrow();
    }

    let pivot = *y[n / 2].borrow();
    let lower = y
        .iter()
        .map(|yi| *yi.borrow())
        .filter(|yi| *yi < pivot)
        .collect::<Vec<T>>();
    let lowers = lower.len();
    let upper = y
        .iter()
        .map(|yi| *yi.borrow())
        .filter(|yi| *yi > pivot)
        .collect::<Vec<T>>();
    let uppers = upper.len();
    let pivots = n - lowers - uppers;

    if k < lowers {
        quickselect(&lower, k)
    } else if k < lowers + pivots {
        pivot
    } else {
        quickselect(&upper, k - lowers - pivots)
    }
}

/// Sum of all values.
pub fn sum<YI, F>(y: YI) -> F
where
    F: Num + Copy,
    YI: Iterator,
    YI::Item: Borrow<F>,
{
    y.fold(F::zero(), |acc, yi| acc + *yi.borrow())
}

///
/// Compute the mean of the signal, `y`
///
/// Return the mean and the number of points averaged
///
/// ```
/// use approx::assert_relative_eq;
/// use emg_dsp::stats::mean;
///
/// let y: [f64; 4] = [1., 2., 3., 4.];
/// assert_relative_eq!(2.5f64, mean(y.iter()).0);
///
/// let y: &[f64] = &[];
/// assert_eq!((0f64, 0), mean(y.iter()));
/// ```
///
pub fn mean<YI, F>(y: YI) -> (F, usize)
where
    F: Num + NumCast + Default + Copy + Add,
    YI: Iterator,
    YI::Item: Borrow<F>,
{
    let (sum, count) = y.fold(Default::default(), |acc: (F, usize), yi| {
        (acc.0 + *yi.borrow(), acc.1 + 1)
    });
    match F::from(count) {
        Some(n) if count > 0 => (sum / n, count),
        _ => Default::default(),
    }
}

///
/// Compute the median of the signal, `y`
///
/// Return the median and the number of points considered. Even-length
/// input averages the two central values.
///
/// ```
/// use approx::assert_relative_eq;
/// use emg_dsp::stats::median;
///
/// let y: [f64; 5] = [3., 1., 4., 2., 5.];
/// assert_relative_eq!(3f64, median(y.iter()).0);
///
/// let y: [f64; 4] = [1., 2., 3., 4.];
/// assert_relative_eq!(2.5f64, median(y.iter()).0);
///
/// let y: &[f64] = &[];
/// assert_eq!((0f64, 0), median(y.iter()));
/// ```
///
pub fn median<YI, T>(y: YI) -> (T, usize)
where
    T: Num + PartialOrd + Copy + Default,
    YI: Iterator,
    YI::Item: Borrow<T>,
{
    let y = y.collect::<Vec<_>>();
    let n = y.len();

    if n == 0 {
        Default::default()
    } else if n % 2 == 1 {
        (quickselect(&y, n / 2), n)
    } else {
        let two = T::one() + T::one();
        (
            (quickselect(&y, n / 2 - 1) + quickselect(&y, n / 2)) / two,
            n,
        )
    }
}

/// The element at sorted position `n / 2`: the middle value for odd
/// lengths and the upper of the two middle values for even lengths.
///
/// Returns NaN for empty input. This is the rule used for the noise floor
/// estimate of the SNR pipeline.
pub fn upper_median<YI, F>(y: YI) -> F
where
    F: Float,
    YI: Iterator,
    YI::Item: Borrow<F>,
{
    let y = y.collect::<Vec<_>>();
    if y.is_empty() {
        return F::nan();
    }
    quickselect(&y, y.len() / 2)
}

/// Largest value, scanning with `>` from the first element.
pub fn max<YI, F>(y: YI) -> Option<F>
where
    F: PartialOrd + Copy,
    YI: Iterator,
    YI::Item: Borrow<F>,
{
    y.map(|yi| *yi.borrow())
        .reduce(|best, v| if v > best { v } else { best })
}

/// Smallest value, scanning with `<` from the first element.
pub fn min<YI, F>(y: YI) -> Option<F>
where
    F: PartialOrd + Copy,
    YI: Iterator,
    YI::Item: Borrow<F>,
{
    y.map(|yi| *yi.borrow())
        .reduce(|best, v| if v < best { v } else { best })
}

/// Index of the first maximum.
pub fn argmax<F: PartialOrd + Copy>(y: &[F]) -> Option<usize> {
    let (first, rest) = y.split_first()?;
    let mut best = (0, *first);
    for (i, &v) in rest.iter().enumerate() {
        if v > best.1 {
            best = (i + 1, v);
        }
    }
    Some(best.0)
}

/// Index of the first minimum.
pub fn argmin<F: PartialOrd + Copy>(y: &[F]) -> Option<usize> {
    let (first, rest) = y.split_first()?;
    let mut best = (0, *first);
    for (i, &v) in rest.iter().enumerate() {
        if v < best.1 {
            best = (i + 1, v);
        }
    }
    Some(best.0)
}

/// Minimum that treats NaN as missing.
///
/// A single NaN operand is ignored and the other operand returned; only two
/// NaNs give NaN. This is not the NaN-propagating IEEE `minimum`. The SNR
/// clamp depends on this rule.
pub fn nan_min<F: Float>(a: F, b: F) -> F {
    if a.is_nan() {
        b
    } else if b.is_nan() {
        a
    } else if b < a {
        b
    } else {
        a
    }
}

/// Power of a sinusoid with amplitude `a`: `a^2 / 2`.
pub fn power<F: Float>(a: F) -> F {
    let two = F::one() + F::one();
    a * a / two
}

/// Sum of [`power`] over the first half (`len / 2` bins) of a magnitude
/// spectrum.
pub fn total_power(magnitude: &[f64]) -> f64 {
    magnitude[..magnitude.len() / 2]
        .iter()
        .map(|&a| power(a))
        .sum()
}

fn check_spectrum(magnitude: &[f64], fs: f64) -> Result<()> {
    if magnitude.is_empty() {
        return Err(Error::invalid("magnitude", "spectrum must be non-empty"));
    }
    check_sample_rate(fs)?;
    Ok(())
}

fn bin_frequency(k: usize, len: usize, fs: f64) -> f64 {
    k as f64 * fs / len as f64
}

/// Power-weighted mean frequency over the first half of the spectrum.
///
/// NaN when the spectrum carries no power.
pub fn mean_frequency(magnitude: &[f64], fs: f64) -> Result<f64> {
    check_spectrum(magnitude, fs)?;
    let n = magnitude.len();
    let weighted: f64 = magnitude[..n / 2]
        .iter()
        .enumerate()
        .map(|(k, &a)| power(a) * bin_frequency(k, n, fs))
        .sum();
    Ok(weighted / total_power(magnitude))
}

/// Frequency of the first bin at which the cumulative power over the first
/// half reaches half of [`total_power`]. Falls back to bin 0.
pub fn median_frequency(magnitude: &[f64], fs: f64) -> Result<f64> {
    check_spectrum(magnitude, fs)?;
    let n = magnitude.len();
    let half = total_power(magnitude) / 2.0;
    let pos = magnitude[..n / 2]
        .iter()
        .scan(0.0, |acc, &a| {
            *acc += power(a);
            Some(*acc)
        })
        .position(|cumulative| cumulative >= half)
        .unwrap_or(0);
    Ok(bin_frequency(pos, n, fs))
}

/// Frequency of the first maximum among bins `0..=len/2`.
pub fn max_frequency(spectrum: &[f64], fs: f64) -> Result<f64> {
    check_spectrum(spectrum, fs)?;
    let n = spectrum.len();
    let pos = argmax(&spectrum[..=n / 2]).unwrap_or(0);
    Ok(bin_frequency(pos, n, fs))
}

/// Frequency of the first minimum among bins `0..=len/2`.
pub fn min_frequency(spectrum: &[f64], fs: f64) -> Result<f64> {
    check_spectrum(spectrum, fs)?;
    let n = spectrum.len();
    let pos = argmin(&spectrum[..=n / 2]).unwrap_or(0);
    Ok(bin_frequency(pos, n, fs))
}

/// Spectral descriptors of a sample block, as shown next to its spectrum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectrumSummary {
    /// See [`mean_frequency`].
    pub mean_frequency: f64,
    /// See [`median_frequency`].
    pub median_frequency: f64,
    /// Largest decibel magnitude, excluding the DC bin.
    pub max_db: f64,
    /// [`max_frequency`] of the decibel spectrum.
    pub max_db_frequency: f64,
    /// Smallest decibel magnitude, excluding the DC bin.
    pub min_db: f64,
    /// [`min_frequency`] of the decibel spectrum.
    pub min_db_frequency: f64,
}

impl SpectrumSummary {
    /// Transform `samples` and describe the resulting spectrum.
    ///
    /// The decibel extremes are NaN for a single sample (there is no bin
    /// besides DC).
    pub fn from_samples(samples: &[f64], fs: f64) -> Result<Self> {
        check_sample_rate(fs)?;
        let magnitude = fft::magnitude(&fft::transform_real(samples)?);
        let db = fft::decibel(&magnitude);

        let (min_db, max_db) = match db.iter().skip(1).minmax() {
            itertools::MinMaxResult::NoElements => (f64::NAN, f64::NAN),
            itertools::MinMaxResult::OneElement(v) => (*v, *v),
            itertools::MinMaxResult::MinMax(lo, hi) => (*lo, *hi),
        };

        Ok(Self {
            mean_frequency: mean_frequency(&magnitude, fs)?,
            median_frequency: median_frequency(&magnitude, fs)?,
            max_db,
            max_db_frequency: max_frequency(&db, fs)?,
            min_db,
            min_db_frequency: min_frequency(&db, fs)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array1;
    use std::f64::consts::PI;

    #[test]
    fn can_median() {
        let y: [f64; 4] = [1., 2., 3., 4.];
        assert_relative_eq!(2.5, median::<_, f64>(y.iter()).0);
        let y: [f64; 5] = [5., 2., 3., 4., 1.];
        assert_relative_eq!(3.0, median::<_, f64>(y.iter()).0);
        let y = Array1::from(vec![2.0f64, 8.0, 4.0]);
        assert_eq!(median::<_, f64>(y.iter()), (4.0, 3));
    }

    #[test]
    fn upper_median_picks_the_higher_middle_value() {
        let y = [4.0f64, 1.0, 3.0, 2.0];
        assert_eq!(upper_median::<_, f64>(y.iter()), 3.0);
        let y = [7.0f64, 1.0, 3.0];
        assert_eq!(upper_median::<_, f64>(y.iter()), 3.0);
        let y: &[f64] = &[];
        assert!(upper_median::<_, f64>(y.iter()).is_nan());
    }

    #[test]
    fn mean_sum_and_extremes() {
        let y = [1.0f64, -2.0, 5.0, 5.0];
        assert_eq!(sum::<_, f64>(y.iter()), 9.0);
        assert_eq!(mean::<_, f64>(y.iter()), (2.25, 4));
        assert_eq!(max::<_, f64>(y.iter()), Some(5.0));
        assert_eq!(min::<_, f64>(y.iter()), Some(-2.0));
        assert_eq!(argmax(&y), Some(2));
        assert_eq!(argmin(&y), Some(1));
        let empty: [f64; 0] = [];
        assert_eq!(max::<_, f64>(empty.iter()), None);
        assert_eq!(argmax(&empty), None);
    }

    #[test]
    fn nan_min_ignores_a_single_nan_operand() {
        // Non-standard rule: NaN is treated as missing, not as contagious.
        assert_eq!(nan_min(f64::NAN, 2.0), 2.0);
        assert_eq!(nan_min(3.0, f64::NAN), 3.0);
        assert!(nan_min(f64::NAN, f64::NAN).is_nan());
        assert_eq!(nan_min(1.0, 2.0), 1.0);
        assert_eq!(nan_min(-0.5, -4.0), -4.0);
    }

    #[test]
    fn power_helpers_use_the_first_half() {
        assert_eq!(power(2.0f64), 2.0);
        // Only bins 0 and 1 of four are summed.
        assert_eq!(total_power(&[2.0, 4.0, 100.0, 100.0]), 2.0 + 8.0);
    }

    #[test]
    fn frequency_descriptors_of_a_known_spectrum() {
        let fs = 8.0;
        // Bins at 0, 1, 2, 3 Hz in the first half.
        let magnitude = [0.0, 2.0, 0.0, 2.0, 9.0, 9.0, 9.0, 9.0];
        // Power 2 at 1 Hz and 2 at 3 Hz.
        assert_relative_eq!(mean_frequency(&magnitude, fs).expect("valid"), 2.0);
        assert_relative_eq!(median_frequency(&magnitude, fs).expect("valid"), 1.0);
        // Bins 0..=4 are scanned; 9.0 first appears at bin 4.
        assert_relative_eq!(max_frequency(&magnitude, fs).expect("valid"), 4.0);
        assert_relative_eq!(min_frequency(&magnitude, fs).expect("valid"), 0.0);

        assert!(mean_frequency(&[], fs).is_err());
        assert!(median_frequency(&magnitude, 0.0).is_err());
    }

    #[test]
    fn summary_of_a_pure_tone() {
        let fs = 64.0;
        let samples = (0..64)
            .map(|t| (2.0 * PI * 8.0 * t as f64 / fs).cos())
            .collect::<Vec<_>>();
        let summary = SpectrumSummary::from_samples(&samples, fs).expect("valid input");
        assert_relative_eq!(summary.max_db_frequency, 8.0);
        assert_relative_eq!(summary.mean_frequency, 8.0, epsilon = 1e-9);
        assert_relative_eq!(summary.median_frequency, 8.0);
        // |X[8]| / n == 0.5
        assert_relative_eq!(summary.max_db, 20.0 * 0.5f64.log10(), epsilon = 1e-9);
        assert!(summary.min_db < -200.0);
    }
}
