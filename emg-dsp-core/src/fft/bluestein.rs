use super::{convolve, Complex, MAX_BLUESTEIN_LEN};
use crate::{Error, Result};
use core::f64::consts::PI;
use tracing::trace;

/// Circular-convolution length used for an `n`-point chirp-z transform.
///
/// Four times the largest power of two not exceeding `n`, which always
/// clears the `2n - 1` needed for the linear convolution to fit without
/// wrap-around.
pub(super) fn working_len(n: usize) -> Result<usize> {
    if n == 0 {
        return Err(Error::invalid("x", "transform input must be non-empty"));
    }
    if n >= MAX_BLUESTEIN_LEN {
        return Err(Error::invalid(
            "x",
            "input too large for the chirp-z transform (length must be < 2^29)",
        ));
    }
    let highest = 1usize << (usize::BITS - 1 - n.leading_zeros());
    Ok(highest * 4)
}

/// Chirp `exp(i*pi*k^2/n)` for `k in 0..n`.
///
/// `k^2` is reduced modulo `2n` in integer arithmetic before scaling so the
/// phase stays exact for large `k`.
fn chirp(n: usize) -> Vec<Complex<f64>> {
    let modulus = 2 * n as u128;
    (0..n)
        .map(|k| {
            let j = (k as u128 * k as u128) % modulus;
            Complex::from_polar(1.0, PI * j as f64 / n as f64)
        })
        .collect()
}

/// Bluestein's algorithm for an arbitrary-length forward transform.
pub(super) fn transform(x: &[Complex<f64>]) -> Result<Vec<Complex<f64>>> {
    let n = x.len();
    let m = working_len(n)?;
    trace!(len = n, working_len = m, "bluestein transform");

    let w = chirp(n);
    let zero = Complex::new(0.0, 0.0);

    let mut a = vec![zero; m];
    for ((dst, xi), wi) in a.iter_mut().zip(x.iter()).zip(w.iter()) {
        *dst = *xi * wi.conj();
    }

    let mut b = vec![zero; m];
    b[0] = w[0];
    for (k, wk) in w.iter().enumerate().skip(1) {
        b[k] = *wk;
        b[m - k] = *wk;
    }

    let c = convolve(&a, &b)?;
    Ok(c.iter()
        .zip(w.iter())
        .map(|(ci, wi)| *ci * wi.conj())
        .collect())
}
