//! Modified Bessel functions of the first kind, `I_n(x)`.
//!
//! Evaluation follows Cody's backward-recurrence scheme. For `x >= RTNSIG`
//! a forward sweep of Olver's P-sequence picks a starting order high enough
//! that recurring downwards reaches the requested significance; the
//! unnormalized values are then scaled by the identity
//! `exp(x) = I_0(x) + 2 * sum_{k>=1} I_k(x)`. Smaller arguments use the
//! two-term ascending series, whose truncation error is already below
//! working precision there.
//!
//! Only integer orders are supported. The Kaiser window needs `I_0` alone.

mod recurrence;
mod series;

use emg_dsp_core::{Error, Result};

/// `10^K` for the largest `K` with `10^K` representable.
pub const ENTEN: f64 = 1.0e308;
/// `10^NSIG`, the decimal significance target.
pub const ENSIG: f64 = 1.0e16;
/// `10^-K` for the smallest `K >= NSIG / 4`. Arguments below this use the
/// ascending series.
pub const RTNSIG: f64 = 1.0e-4;
/// Smallest `|x|` such that `x / 4` does not underflow.
pub const ENMTEN: f64 = 8.90e-308;
/// Largest argument accepted for exponentially scaled evaluation.
pub const XLARGE: f64 = 1.0e4;
/// Largest argument accepted for unscaled evaluation, `~ln(f64::MAX)`.
pub const EXPARG: f64 = 709.0;
/// Decimal significance, `floor(log10(2) * 53) + 1`.
pub const NSIG: i64 = 16;
/// Growth factor used by the general significance test.
pub const CONST: f64 = 1.585;
/// Highest order accepted. The recurrence holds every order up to the
/// requested one in memory.
pub const MAX_ORDER: usize = 100_000;
/// A truncated sequence is still accepted when its last accurate value lies
/// below this magnitude (the requested order underflowed to zero).
pub const UNDERFLOW_FLOOR: f64 = 1.0e-100;

/// Whether results carry the `exp(-x)` factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scaling {
    /// Plain `I_n(x)`.
    #[default]
    Unscaled,
    /// `exp(-x) * I_n(x)`, usable up to [`XLARGE`].
    Exponential,
}

/// Orders `0..nb` of `I_n(x)` from one recurrence run.
#[derive(Debug, Clone, PartialEq)]
pub struct BesselSequence {
    /// `values[k]` holds `I_k(x)`, times `exp(-x)` when scaled.
    pub values: Vec<f64>,
    /// Number of leading orders computed to full significance. Equal to
    /// `values.len()` unless the recurrence had to give up early or higher
    /// orders underflowed.
    pub accurate: usize,
}

/// Evaluate `I_k(x)` for every `k in 0..nb`.
///
/// # Errors
/// [`Error::InvalidArg`] when `nb == 0` or `nb > MAX_ORDER + 1`, `x` is
/// negative or non-finite, or `x` exceeds [`EXPARG`] (unscaled) /
/// [`XLARGE`] (scaled).
pub fn bessel_i_sequence(x: f64, nb: usize, scaling: Scaling) -> Result<BesselSequence> {
    if nb == 0 {
        return Err(Error::invalid("nb", "at least one order must be requested"));
    }
    if nb > MAX_ORDER + 1 {
        return Err(Error::invalid("nb", "orders above MAX_ORDER are not supported"));
    }
    if !x.is_finite() || x < 0.0 {
        return Err(Error::invalid("x", "argument must be finite and >= 0"));
    }
    let limit = match scaling {
        Scaling::Unscaled => EXPARG,
        Scaling::Exponential => XLARGE,
    };
    if x > limit {
        return Err(Error::invalid(
            "x",
            "argument magnitude exceeds the exponential overflow bound",
        ));
    }

    Ok(if x >= RTNSIG {
        recurrence::backward_recurrence(x, nb, scaling)
    } else {
        series::ascending_series(x, nb, scaling)
    })
}

fn evaluate(order: f64, x: f64, scaling: Scaling) -> Result<f64> {
    if !order.is_finite() || order < 0.0 {
        return Err(Error::invalid("order", "order must be finite and >= 0"));
    }
    if order.fract() != 0.0 {
        return Err(Error::invalid("order", "only integer orders are supported"));
    }
    if order > MAX_ORDER as f64 {
        return Err(Error::invalid("order", "orders above MAX_ORDER are not supported"));
    }
    let n = order as usize;
    let nb = n + 1;
    let seq = bessel_i_sequence(x, nb, scaling)?;

    let underflowed = match seq.accurate {
        0 => true,
        k => seq.values[k - 1].abs() < UNDERFLOW_FLOOR,
    };
    if seq.accurate >= nb || underflowed {
        Ok(seq.values[n])
    } else {
        Err(Error::NonConvergence { order, x })
    }
}

/// `I_order(x)`.
///
/// # Errors
/// [`Error::InvalidArg`] for negative or fractional orders, orders above
/// [`MAX_ORDER`], and arguments outside `[0, EXPARG]`;
/// [`Error::NonConvergence`] if the recurrence cannot reach full
/// significance for the requested order.
pub fn bessel_i(order: f64, x: f64) -> Result<f64> {
    evaluate(order, x, Scaling::Unscaled)
}

/// `exp(-x) * I_order(x)`, defined for `x` up to [`XLARGE`].
pub fn bessel_i_scaled(order: f64, x: f64) -> Result<f64> {
    evaluate(order, x, Scaling::Exponential)
}

/// `I_0(x)`.
pub fn bessel_i0(x: f64) -> Result<f64> {
    bessel_i(0.0, x)
}
