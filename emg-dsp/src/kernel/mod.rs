//! Validated kernel substrate.
//!
//! Every spectral operation is exposed twice: as a plain function over slices
//! and as a kernel struct built from a config through [`KernelLifecycle`].
//! Kernels validate their configuration once, then accept any contiguous 1D
//! buffer through [`Read1D`]/[`Write1D`].

mod errors;
mod io;
mod lifecycle;

pub use errors::*;
pub use io::*;
pub use lifecycle::*;
