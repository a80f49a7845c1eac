//! Kaiser window.
//!
//! `w[i] = I0(beta * sqrt(1 - r^2)) / I0(beta)` with
//! `r = (i - (N-1)/2) / ((N-1)/2)`. The window is symmetric, peaks at the
//! centre and reaches `1 / I0(beta)` at both ends. Larger `beta` trades main
//! lobe width for lower sidelobes.

mod kernels;

pub use kernels::{KaiserConfig, KaiserKernel};

use crate::special::bessel_i0;
use emg_dsp_core::{Error, Result};

/// A Kaiser window of fixed length and shape.
///
/// Samples are evaluated on demand; indices outside `[0, len)` read as zero,
/// so the window can be queried as an infinitely zero-padded sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KaiserWindow {
    len: usize,
    beta: f64,
    norm: f64,
}

impl KaiserWindow {
    /// # Errors
    /// [`Error::InvalidArg`] for an empty window or a negative or non-finite
    /// `beta`, plus any [`bessel_i0`] failure for very large `beta`.
    pub fn new(len: usize, beta: f64) -> Result<Self> {
        if len == 0 {
            return Err(Error::invalid("len", "window length must be at least 1"));
        }
        if !beta.is_finite() || beta < 0.0 {
            return Err(Error::invalid("beta", "shape must be finite and >= 0"));
        }
        let norm = bessel_i0(beta)?;
        Ok(Self { len, beta, norm })
    }

    /// Number of samples in the window.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false; a window holds at least one sample.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Shape parameter the window was built with.
    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Sample `i` of the window, zero outside `[0, len)`.
    pub fn value(&self, i: isize) -> Result<f64> {
        if i < 0 || i as usize >= self.len {
            return Ok(0.0);
        }
        if self.len == 1 {
            return Ok(1.0);
        }
        let half = (self.len - 1) as f64 / 2.0;
        let r = (i as f64 - half) / half;
        let arg = self.beta * (1.0 - r * r).max(0.0).sqrt();
        Ok(bessel_i0(arg)? / self.norm)
    }

    /// All `len` samples.
    pub fn to_vec(&self) -> Result<Vec<f64>> {
        (0..self.len as isize).map(|i| self.value(i)).collect()
    }
}

/// Kaiser window of length `len` and shape `beta`.
pub fn kaiser(len: usize, beta: f64) -> Result<Vec<f64>> {
    KaiserWindow::new(len, beta)?.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn matches_reference_samples() {
        let expected = [
            0.014_873_337_104_763_207,
            0.482_955_606_410_627,
            1.0,
            0.482_955_606_410_627,
            0.014_873_337_104_763_207,
        ];
        let w = kaiser(5, 6.0).expect("valid window");
        w.iter()
            .zip(expected.iter())
            .for_each(|(a, b)| assert_abs_diff_eq!(a, b, epsilon = 1e-14));

        let w = kaiser(4, 8.6).expect("valid window");
        assert_abs_diff_eq!(w[0], 0.001_332_513_997_902_419_3, epsilon = 1e-15);
        assert_abs_diff_eq!(w[1], 0.630_411_927_335_940_3, epsilon = 1e-14);
    }

    #[test]
    fn window_is_symmetric_with_unit_centre() {
        for len in [7usize, 8, 101, 1000] {
            let w = kaiser(len, 38.0).expect("valid window");
            for i in 0..len {
                assert_abs_diff_eq!(w[i], w[len - 1 - i], epsilon = 1e-15);
            }
            let centre = (len - 1) / 2;
            let peak = w.iter().cloned().fold(f64::MIN, f64::max);
            assert_eq!(w[centre], peak);
            assert!(w.iter().all(|v| (0.0..=1.0).contains(v)));
            if len % 2 == 1 {
                assert_eq!(w[centre], 1.0);
            }
        }
    }

    #[test]
    fn zero_beta_is_rectangular() {
        let w = kaiser(6, 0.0).expect("valid window");
        assert!(w.iter().all(|&v| v == 1.0));
    }

    #[test]
    fn out_of_range_samples_read_as_zero() {
        let window = KaiserWindow::new(9, 5.0).expect("valid window");
        assert_eq!(window.value(-1).expect("in domain"), 0.0);
        assert_eq!(window.value(9).expect("in domain"), 0.0);
        assert_eq!(window.value(4).expect("in domain"), 1.0);
        assert_eq!(window.len(), 9);
        assert_eq!(window.beta(), 5.0);
    }

    #[test]
    fn degenerate_lengths() {
        assert_eq!(kaiser(1, 38.0).expect("single sample"), vec![1.0]);
        assert!(matches!(kaiser(0, 38.0), Err(Error::InvalidArg { .. })));
        assert!(matches!(kaiser(8, -1.0), Err(Error::InvalidArg { .. })));
        assert!(matches!(kaiser(8, f64::NAN), Err(Error::InvalidArg { .. })));
    }
}
