//! Discrete Fourier transform for arbitrary input lengths.
//!
//! Power-of-two lengths are planned through `rustfft`. Every other length is
//! routed through Bluestein's chirp-z algorithm, which rewrites the transform
//! as a circular convolution of power-of-two length and therefore stays
//! `O(n log n)`.
//!
//! The forward transform is unnormalized (`X[k] = sum x[t] e^{-2 pi i k t / n}`)
//! and [`inverse_transform`] carries the `1/n` factor.

mod bluestein;

use crate::{Error, Result};
use rustfft::FftPlanner;
use tracing::trace;

pub use rustfft::num_complex::Complex;

/// Inputs at or above this length are rejected by the chirp-z path.
pub const MAX_BLUESTEIN_LEN: usize = 1 << 29;

/// Forward transform of a complex sequence.
///
/// # Errors
/// [`Error::InvalidArg`] if `x` is empty, or if it is not a power of two and
/// at least [`MAX_BLUESTEIN_LEN`] long.
pub fn transform(x: &[Complex<f64>]) -> Result<Vec<Complex<f64>>> {
    let n = x.len();
    if n == 0 {
        return Err(Error::invalid("x", "transform input must be non-empty"));
    }
    if n.is_power_of_two() {
        trace!(len = n, "radix-2 transform");
        let mut buf = x.to_vec();
        FftPlanner::<f64>::new()
            .plan_fft_forward(n)
            .process(&mut buf);
        Ok(buf)
    } else {
        bluestein::transform(x)
    }
}

/// Forward transform of a real sequence.
pub fn transform_real(x: &[f64]) -> Result<Vec<Complex<f64>>> {
    transform(&to_complex(x))
}

/// Inverse transform, computed as `conj(transform(conj(x))) / n`.
pub fn inverse_transform(x: &[Complex<f64>]) -> Result<Vec<Complex<f64>>> {
    let conjugated = x.iter().map(|v| v.conj()).collect::<Vec<_>>();
    let n = x.len() as f64;
    Ok(transform(&conjugated)?
        .into_iter()
        .map(|v| v.conj() / n)
        .collect())
}

/// Circular convolution of two equal-length sequences via
/// transform, pointwise multiply, inverse transform.
///
/// # Errors
/// [`Error::LengthMismatch`] when the lengths differ, plus any error from
/// [`transform`].
pub fn convolve(x: &[Complex<f64>], y: &[Complex<f64>]) -> Result<Vec<Complex<f64>>> {
    if x.len() != y.len() {
        return Err(Error::length_mismatch("y", x.len(), y.len()));
    }
    let a = transform(x)?;
    let b = transform(y)?;
    let product = a
        .iter()
        .zip(b.iter())
        .map(|(ai, bi)| ai * bi)
        .collect::<Vec<_>>();
    inverse_transform(&product)
}

/// Magnitude spectrum `|X[k]| / n`.
pub fn magnitude(spectrum: &[Complex<f64>]) -> Vec<f64> {
    let n = spectrum.len() as f64;
    spectrum.iter().map(|v| v.norm() / n).collect()
}

/// Decibel spectrum `20 log10(m)`.
///
/// Exact zeros map to `-inf`; callers plotting or reducing the result must
/// tolerate non-finite bins.
pub fn decibel(magnitude: &[f64]) -> Vec<f64> {
    magnitude.iter().map(|m| 20.0 * m.log10()).collect()
}

/// Lift a real sequence into the complex plane.
pub fn to_complex(x: &[f64]) -> Vec<Complex<f64>> {
    x.iter().map(|&re| Complex::new(re, 0.0)).collect()
}

/// Zip separate real and imaginary parts into a complex sequence.
pub fn from_parts(re: &[f64], im: &[f64]) -> Result<Vec<Complex<f64>>> {
    if re.len() != im.len() {
        return Err(Error::length_mismatch("im", re.len(), im.len()));
    }
    Ok(re
        .iter()
        .zip(im.iter())
        .map(|(&r, &i)| Complex::new(r, i))
        .collect())
}

/// Real parts of a complex sequence.
pub fn real_parts(x: &[Complex<f64>]) -> Vec<f64> {
    x.iter().map(|v| v.re).collect()
}

/// Imaginary parts of a complex sequence.
pub fn imag_parts(x: &[Complex<f64>]) -> Vec<f64> {
    x.iter().map(|v| v.im).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use core::f64::consts::PI;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_signal(n: usize, seed: u64) -> Vec<Complex<f64>> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|_| Complex::new(rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0)))
            .collect()
    }

    fn reference_fft(x: &[Complex<f64>]) -> Vec<Complex<f64>> {
        let mut planner = FftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(x.len());
        let mut buf = x.to_vec();
        fft.process(&mut buf);
        buf
    }

    fn assert_close(actual: &[Complex<f64>], expected: &[Complex<f64>], eps: f64) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(a.re, e.re, epsilon = eps);
            assert_abs_diff_eq!(a.im, e.im, epsilon = eps);
        }
    }

    #[test]
    fn forward_matches_rustfft_for_every_length_class() {
        for (seed, n) in [1usize, 2, 3, 7, 8, 64, 100, 255, 1000, 1024]
            .into_iter()
            .enumerate()
        {
            let x = random_signal(n, seed as u64);
            let tol = 1e-9 * (n as f64).max(1.0);
            assert_close(
                &transform(&x).expect("transform"),
                &reference_fft(&x),
                tol,
            );
        }
    }

    fn direct_dft(x: &[Complex<f64>]) -> Vec<Complex<f64>> {
        let n = x.len();
        (0..n)
            .map(|k| {
                x.iter()
                    .enumerate()
                    .map(|(t, v)| {
                        let angle = -2.0 * PI * ((k * t) % n) as f64 / n as f64;
                        *v * Complex::from_polar(1.0, angle)
                    })
                    .sum()
            })
            .collect()
    }

    #[test]
    fn both_dispatch_paths_match_the_direct_sum() {
        for n in [2usize, 16, 64, 3, 12, 45] {
            let x = random_signal(n, 40 + n as u64);
            assert_close(&transform(&x).expect("transform"), &direct_dft(&x), 1e-9);
        }
    }

    #[test]
    fn inverse_round_trips_power_of_two_lengths() {
        for n in [1usize, 2, 16, 512] {
            let x = random_signal(n, 11);
            let y = inverse_transform(&transform(&x).expect("forward")).expect("inverse");
            assert_close(&y, &x, 1e-12);
        }
    }

    #[test]
    fn inverse_round_trips_chirp_z_lengths() {
        for n in [7usize, 100, 1000] {
            let x = random_signal(n, 12);
            let y = inverse_transform(&transform(&x).expect("forward")).expect("inverse");
            assert_close(&y, &x, 1e-10);
        }
    }

    #[test]
    fn zero_input_transforms_to_zero() {
        for n in [1usize, 5, 8, 12] {
            let y = transform(&vec![Complex::new(0.0, 0.0); n]).expect("transform");
            assert!(y.iter().all(|v| v.norm() == 0.0));
        }
    }

    #[test]
    fn single_sample_is_returned_unchanged() {
        let x = [Complex::new(3.5, -1.25)];
        assert_eq!(transform(&x).expect("transform"), x.to_vec());
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(transform(&[]), Err(Error::InvalidArg { .. })));
        assert!(matches!(transform_real(&[]), Err(Error::InvalidArg { .. })));
    }

    #[test]
    fn magnitude_of_sinusoid_peaks_at_expected_bin() {
        let fs = 1000.0;
        for (n, f) in [(1000usize, 50.0), (1024, 125.0), (777, 37.0)] {
            let x = (0..n)
                .map(|i| (2.0 * PI * f * i as f64 / fs).sin())
                .collect::<Vec<_>>();
            let mag = magnitude(&transform_real(&x).expect("transform"));
            let (peak, _) = mag[..n / 2]
                .iter()
                .enumerate()
                .fold((0, f64::MIN), |acc, (i, &v)| if v > acc.1 { (i, v) } else { acc });
            assert_eq!(peak, (f * n as f64 / fs).round() as usize);
        }
    }

    #[test]
    fn magnitude_is_normalized_by_length() {
        let x = vec![2.0; 10];
        let mag = magnitude(&transform_real(&x).expect("transform"));
        assert_abs_diff_eq!(mag[0], 2.0, epsilon = 1e-12);
        assert!(mag[1..].iter().all(|m| *m < 1e-12));
    }

    #[test]
    fn decibel_of_unit_and_zero() {
        let db = decibel(&[1.0, 0.1, 0.0]);
        assert_abs_diff_eq!(db[0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(db[1], -20.0, epsilon = 1e-12);
        assert!(db[2].is_infinite() && db[2] < 0.0);
    }

    #[test]
    fn convolve_matches_direct_circular_sum() {
        let n = 9;
        let x = random_signal(n, 3);
        let y = random_signal(n, 4);
        let expected = (0..n)
            .map(|k| (0..n).map(|j| x[j] * y[(k + n - j) % n]).sum())
            .collect::<Vec<Complex<f64>>>();
        assert_close(&convolve(&x, &y).expect("convolve"), &expected, 1e-10);
    }

    #[test]
    fn convolve_rejects_mismatched_lengths() {
        let err = convolve(&random_signal(4, 1), &random_signal(5, 2)).expect_err("mismatch");
        assert_eq!(err, Error::length_mismatch("y", 4, 5));
    }

    #[test]
    fn complex_part_helpers_round_trip() {
        let re = [1.0, 2.0, 3.0];
        let im = [-1.0, 0.5, 0.0];
        let z = from_parts(&re, &im).expect("equal lengths");
        assert_eq!(real_parts(&z), re.to_vec());
        assert_eq!(imag_parts(&z), im.to_vec());
        assert!(from_parts(&re, &im[..2]).is_err());
        assert_eq!(to_complex(&re)[1], Complex::new(2.0, 0.0));
    }
}
