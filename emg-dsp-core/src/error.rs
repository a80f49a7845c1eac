use core::{error, fmt};

/// Errors raised whilst running emg-dsp numerics.
///
/// Non-finite results that are mathematically meaningful (zero noise power,
/// the decibel value of a silent bin) are not errors and propagate as IEEE
/// NaN/infinity instead.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Argument passed into a function was invalid.
    InvalidArg {
        /// The invalid arg
        arg: String,
        /// Explaining why arg is invalid.
        reason: String,
    },
    /// Two inputs that must agree in length did not.
    LengthMismatch {
        /// Name of the argument whose length is wrong.
        arg: String,
        /// Required length.
        expected: usize,
        /// Received length.
        got: usize,
    },
    /// An iterative special-function evaluation could not reach the
    /// required significance.
    NonConvergence {
        /// Order of the function being evaluated.
        order: f64,
        /// Argument the evaluation failed at.
        x: f64,
    },
}

impl Error {
    /// Shorthand for [`Error::InvalidArg`].
    pub fn invalid(arg: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidArg {
            arg: arg.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for [`Error::LengthMismatch`].
    pub fn length_mismatch(arg: impl Into<String>, expected: usize, got: usize) -> Self {
        Error::LengthMismatch {
            arg: arg.into(),
            expected,
            got,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArg { arg, reason } => {
                write!(f, "Invalid argument `{arg}`: {reason}")
            }
            Error::LengthMismatch { arg, expected, got } => {
                write!(
                    f,
                    "Length mismatch on `{arg}`. Expected {expected}, got {got}."
                )
            }
            Error::NonConvergence { order, x } => {
                write!(
                    f,
                    "Bessel function of order {order} failed to converge at x = {x}"
                )
            }
        }
    }
}

impl error::Error for Error {}

/// Result alias over [`Error`].
pub type Result<T> = core::result::Result<T, Error>;
