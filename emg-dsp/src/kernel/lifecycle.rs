use super::ConfigError;

/// Constructor validation lifecycle shared by kernel structs.
pub trait KernelLifecycle: Sized {
    /// Kernel config type.
    type Config;

    /// Construct a validated kernel from config.
    fn try_new(config: Self::Config) -> Result<Self, ConfigError>;
}

/// Validate a sampling frequency in Hz.
pub fn check_sample_rate(fs: f64) -> Result<(), ConfigError> {
    if !fs.is_finite() || fs <= 0.0 {
        return Err(ConfigError::InvalidArgument {
            arg: "fs",
            reason: "sample rate must be finite and > 0",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct DecimatorConfig {
        fs: f64,
        factor: usize,
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Decimator {
        fs_out: f64,
    }

    impl KernelLifecycle for Decimator {
        type Config = DecimatorConfig;

        fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
            check_sample_rate(config.fs)?;
            if config.factor == 0 {
                return Err(ConfigError::InvalidArgument {
                    arg: "factor",
                    reason: "factor must be greater than zero",
                });
            }
            Ok(Self {
                fs_out: config.fs / config.factor as f64,
            })
        }
    }

    #[test]
    fn lifecycle_constructor_accepts_valid_config() {
        let kernel = Decimator::try_new(DecimatorConfig {
            fs: 1000.0,
            factor: 4,
        })
        .expect("valid config");
        assert_eq!(kernel.fs_out, 250.0);
    }

    #[test]
    fn lifecycle_constructor_rejects_bad_sample_rates() {
        for fs in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = Decimator::try_new(DecimatorConfig { fs, factor: 2 })
                .expect_err("invalid sample rate");
            assert!(matches!(err, ConfigError::InvalidArgument { arg: "fs", .. }));
        }
    }
}
