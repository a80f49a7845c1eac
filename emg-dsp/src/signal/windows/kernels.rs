use super::KaiserWindow;
use crate::kernel::{
    check_output_len, ConfigError, ExecInvariantViolation, KernelLifecycle, Write1D,
};
use crate::signal::traits::WindowGenerate;

/// Constructor config for [`KaiserKernel`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KaiserConfig {
    /// Output length.
    pub len: usize,
    /// Shape parameter `beta`.
    pub beta: f64,
}

/// Trait-first Kaiser window generation kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KaiserKernel {
    window: KaiserWindow,
}

impl KernelLifecycle for KaiserKernel {
    type Config = KaiserConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        if config.len == 0 {
            return Err(ConfigError::InvalidArgument {
                arg: "len",
                reason: "window length must be at least 1",
            });
        }
        if !config.beta.is_finite() || config.beta < 0.0 {
            return Err(ConfigError::InvalidArgument {
                arg: "beta",
                reason: "shape must be finite and >= 0",
            });
        }
        let window = KaiserWindow::new(config.len, config.beta).map_err(|_| {
            ConfigError::InvalidArgument {
                arg: "beta",
                reason: "I0(beta) is not representable",
            }
        })?;
        Ok(Self { window })
    }
}

impl WindowGenerate<f64> for KaiserKernel {
    fn run_into<O>(&self, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        O: Write1D<f64> + ?Sized,
    {
        let generated = self.run_alloc()?;
        let out_slice = out
            .write_slice_mut()
            .map_err(ExecInvariantViolation::from)?;
        check_output_len("out", generated.len(), out_slice.len())?;
        out_slice.copy_from_slice(&generated);
        Ok(())
    }

    fn run_alloc(&self) -> Result<Vec<f64>, ExecInvariantViolation> {
        Ok(self.window.to_vec()?)
    }
}
