//! Signal-to-noise ratio of a sampled tone.
//!
//! The estimate is taken from a Kaiser-windowed periodogram of the
//! mean-removed signal:
//!
//! 1. The DC region is isolated and discarded.
//! 2. The strongest remaining tone is the fundamental; its integrated power
//!    is the signal power.
//! 3. Tones near harmonics `2..=harmonics` of the fundamental are discarded.
//! 4. Discarded bins are refilled with the median of the surviving bins,
//!    clamped so no bin exceeds its original value, and the result is
//!    integrated as the noise power.
//!
//! A silent or noiseless signal is not an error: the ratio comes out as NaN
//! or infinity.

use crate::kernel::{
    check_sample_rate, ConfigError, ExecInvariantViolation, KernelLifecycle, Read1D,
};
use crate::signal::spectral::{bandpower, enbw, onesided_frequencies, periodic_windowed_spectrum};
use crate::signal::tone::{measure_tone, remove_tone, strongest_tone, tone_near, ToneEstimate};
use crate::signal::traits::SnrEstimate1D;
use crate::signal::windows::kaiser;
use crate::stats;
use emg_dsp_core::{Error, Result};
use tracing::debug;

/// Kaiser shape used for the SNR periodogram. Sidelobes sit far below any
/// realistic noise floor, at the cost of a wide main lobe.
pub const DEFAULT_KAISER_BETA: f64 = 38.0;

/// Highest harmonic multiple removed before measuring noise.
pub const DEFAULT_HARMONICS: usize = 6;

/// Constructor config for [`SnrKernel`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnrConfig {
    /// Sampling frequency in Hz.
    pub fs: f64,
    /// Kaiser window shape.
    pub beta: f64,
    /// Highest harmonic multiple of the fundamental to remove. `1` keeps all
    /// harmonics in the noise.
    pub harmonics: usize,
}

impl SnrConfig {
    /// Config with the default window shape and harmonic count.
    pub fn new(fs: f64) -> Self {
        Self {
            fs,
            beta: DEFAULT_KAISER_BETA,
            harmonics: DEFAULT_HARMONICS,
        }
    }
}

/// Everything measured on the way to the SNR.
#[derive(Debug, Clone, PartialEq)]
pub struct SnrReport {
    /// `10 * log10(fundamental_power / noise_power)`.
    pub snr_db: f64,
    /// Integrated power of the strongest tone.
    pub fundamental_power: f64,
    /// Hz.
    pub fundamental_frequency: f64,
    /// Integrated power of the reconstructed noise spectrum.
    pub noise_power: f64,
    /// Median density used to refill discarded bins. NaN if no bin
    /// survived.
    pub noise_density: f64,
    /// Harmonics found in range and removed, in ascending multiple order.
    pub harmonics: Vec<ToneEstimate>,
}

/// SNR from a one-sided PSD.
///
/// `psd` is left untouched; the tone removal works on a copy.
///
/// # Errors
/// [`Error::LengthMismatch`] for mismatched `freqs`, [`Error::InvalidArg`]
/// for fewer than two bins.
pub fn psd_snr(psd: &[f64], freqs: &[f64], rbw: f64, harmonics: usize) -> Result<SnrReport> {
    if freqs.len() != psd.len() {
        return Err(Error::length_mismatch("freqs", psd.len(), freqs.len()));
    }
    if psd.len() < 2 {
        return Err(Error::invalid("psd", "SNR needs at least two bins"));
    }

    let original = psd;
    let mut work = psd.to_vec();
    // Undo the one-sided doubling asymmetry at DC.
    work[0] *= 2.0;

    if let Some(dc) = tone_near(&work, freqs, 0.0)? {
        remove_tone(&mut work, &dc);
    }

    let bins = strongest_tone(&work)
        .ok_or_else(|| Error::invalid("psd", "no fundamental tone found"))?;
    let fundamental = measure_tone(&work, freqs, rbw, bins)?;
    remove_tone(&mut work, &fundamental.bins);
    debug!(
        power = fundamental.power,
        frequency = fundamental.frequency,
        left = bins.left,
        right = bins.right,
        "fundamental isolated"
    );

    let mut found = Vec::new();
    for multiple in 2..=harmonics {
        let target = multiple as f64 * fundamental.frequency;
        let Some(bins) = tone_near(&work, freqs, target)? else {
            continue;
        };
        let tone = measure_tone(&work, freqs, rbw, bins)?;
        if tone.power.is_nan() {
            continue;
        }
        remove_tone(&mut work, &bins);
        found.push(tone);
    }

    let noise_density = stats::upper_median::<_, f64>(work.iter().filter(|p| **p > 0.0));
    for (p, &orig) in work.iter_mut().zip(original.iter()) {
        if *p == 0.0 {
            *p = noise_density;
        }
        *p = stats::nan_min(*p, orig);
    }
    let noise_power = bandpower(&work, freqs)?;
    let snr_db = 10.0 * (fundamental.power / noise_power).log10();
    debug!(
        harmonics = found.len(),
        noise_density, noise_power, snr_db, "noise floor reconstructed"
    );

    Ok(SnrReport {
        snr_db,
        fundamental_power: fundamental.power,
        fundamental_frequency: fundamental.frequency,
        noise_power,
        noise_density,
        harmonics: found,
    })
}

/// Trait-first SNR kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnrKernel {
    config: SnrConfig,
}

impl KernelLifecycle for SnrKernel {
    type Config = SnrConfig;

    fn try_new(config: Self::Config) -> core::result::Result<Self, ConfigError> {
        check_sample_rate(config.fs)?;
        if !config.beta.is_finite() || config.beta < 0.0 {
            return Err(ConfigError::InvalidArgument {
                arg: "beta",
                reason: "shape must be finite and >= 0",
            });
        }
        if config.harmonics == 0 {
            return Err(ConfigError::InvalidArgument {
                arg: "harmonics",
                reason: "harmonic count starts at 1 (the fundamental)",
            });
        }
        Ok(Self { config })
    }
}

impl SnrEstimate1D for SnrKernel {
    fn run<I>(&self, input: &I) -> core::result::Result<SnrReport, ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
    {
        let x = input.read_nonempty("input")?;
        let n = x.len();
        if n < 2 {
            return Err(Error::invalid("input", "SNR needs at least two samples").into());
        }
        let SnrConfig {
            fs,
            beta,
            harmonics,
        } = self.config;

        let (mean, _) = stats::mean::<_, f64>(x.iter());
        let centred = x.iter().map(|v| v - mean).collect::<Vec<_>>();
        let window = kaiser(n, beta)?;
        let rbw = enbw(&window, fs)?;
        debug!(len = n, fs, beta, rbw, "periodogram window ready");

        let psd = periodic_windowed_spectrum(&centred, &window, fs)?;
        let freqs = onesided_frequencies(n, fs);
        Ok(psd_snr(&psd, &freqs, rbw, harmonics)?)
    }
}

/// Full SNR report of `x` sampled at `fs` Hz, with default settings.
pub fn snr_report(x: &[f64], fs: f64) -> Result<SnrReport> {
    let kernel = SnrKernel::try_new(SnrConfig::new(fs))?;
    Ok(kernel.run(x)?)
}

/// SNR of `x` in decibels, with default settings.
///
/// # Errors
/// [`Error::InvalidArg`] for fewer than two samples or an invalid `fs`.
pub fn time_snr(x: &[f64], fs: f64) -> Result<f64> {
    Ok(snr_report(x, fs)?.snr_db)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::tone::ToneBins;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use rand::{rngs::StdRng, SeedableRng};
    use rand_distr::{Distribution, Normal};
    use std::f64::consts::PI;

    fn noisy_tone(seed: u64, amplitude: f64, sigma: f64, extra: &[(f64, f64)]) -> Vec<f64> {
        let fs = 1000.0;
        let mut rng = StdRng::seed_from_u64(seed);
        let noise = Normal::new(0.0, sigma).expect("valid distribution");
        (0..1000)
            .map(|t| {
                let t = t as f64 / fs;
                let tones = extra
                    .iter()
                    .map(|(a, f)| a * (2.0 * PI * f * t).sin())
                    .sum::<f64>();
                amplitude * (2.0 * PI * 50.0 * t).sin() + tones + noise.sample(&mut rng)
            })
            .collect()
    }

    #[test]
    fn hand_built_spectrum_walks_every_stage() {
        let psd = [
            6.0, 3.0, 1.0, 2.0, 1.0, 40.0, 80.0, 30.0, 2.0, 1.0, 3.0, 1.0, 2.0, 9.0, 1.0, 2.0,
            1.0, 1.5, 1.0, 2.0, 1.0,
        ];
        let freqs = (0..psd.len()).map(|k| k as f64).collect::<Vec<_>>();
        let report = psd_snr(&psd, &freqs, 1.0, 3).expect("valid spectrum");

        assert_abs_diff_eq!(report.fundamental_power, 154.0, epsilon = 1e-12);
        let total = bandpower(&psd, &freqs).expect("valid spectrum");
        assert!(total >= report.fundamental_power);
        assert_abs_diff_eq!(report.fundamental_frequency, 919.0 / 154.0, epsilon = 1e-12);
        assert_eq!(report.noise_density, 2.0);
        assert_abs_diff_eq!(report.noise_power, 34.5, epsilon = 1e-12);
        assert_abs_diff_eq!(
            report.snr_db,
            10.0 * (154.0f64 / 34.5).log10(),
            epsilon = 1e-12
        );

        assert_eq!(report.harmonics.len(), 2);
        assert_eq!(
            report.harmonics[0].bins,
            ToneBins {
                anchor: 12,
                peak: 13,
                left: 11,
                right: 14,
            }
        );
        assert_abs_diff_eq!(report.harmonics[0].power, 13.0, epsilon = 1e-12);
        assert_abs_diff_eq!(report.harmonics[1].power, 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(report.harmonics[1].frequency, 19.0, epsilon = 1e-12);
    }

    #[test]
    fn input_spectrum_is_not_modified() {
        let psd = vec![1.0, 2.0, 8.0, 2.0, 1.0, 0.5];
        let freqs = (0..6).map(|k| k as f64).collect::<Vec<_>>();
        let before = psd.clone();
        psd_snr(&psd, &freqs, 1.0, DEFAULT_HARMONICS).expect("valid spectrum");
        assert_eq!(psd, before);
    }

    #[test]
    fn matches_theoretical_snr_for_white_noise() {
        let (amplitude, sigma): (f64, f64) = (1.0, 0.1);
        let theoretical = 10.0 * (amplitude * amplitude / (2.0 * sigma * sigma)).log10();
        for seed in 0..5 {
            let x = noisy_tone(seed, amplitude, sigma, &[]);
            let report = snr_report(&x, 1000.0).expect("valid input");
            assert!(
                (report.snr_db - theoretical).abs() < 3.0,
                "seed {seed}: {} dB vs {theoretical} dB",
                report.snr_db
            );
            assert_abs_diff_eq!(report.fundamental_frequency, 50.0, epsilon = 0.5);
            assert_relative_eq!(report.fundamental_power, 0.5, max_relative = 0.1);
        }
    }

    #[test]
    fn dc_offset_does_not_change_the_estimate() {
        let x = noisy_tone(11, 1.0, 0.2, &[]);
        let shifted = x.iter().map(|v| v + 5.0).collect::<Vec<_>>();
        let a = time_snr(&x, 1000.0).expect("valid input");
        let b = time_snr(&shifted, 1000.0).expect("valid input");
        assert_abs_diff_eq!(a, b, epsilon = 1e-6);
    }

    #[test]
    fn harmonics_are_removed_from_the_noise() {
        let (amplitude, sigma) = (1.0, 0.05);
        let x = noisy_tone(7, amplitude, sigma, &[(0.3, 150.0)]);
        let report = snr_report(&x, 1000.0).expect("valid input");

        // Multiples 2..=6 of 50 Hz all fall below Nyquist.
        assert_eq!(report.harmonics.len(), 5);
        let third = &report.harmonics[1];
        assert_abs_diff_eq!(third.frequency, 150.0, epsilon = 0.5);
        assert_relative_eq!(third.power, 0.045, max_relative = 0.1);

        let theoretical = 10.0 * (amplitude * amplitude / (2.0 * sigma * sigma)).log10();
        assert!((report.snr_db - theoretical).abs() < 3.0);

        // Keeping the harmonic in the noise drags the estimate down.
        let kernel = SnrKernel::try_new(SnrConfig {
            harmonics: 1,
            ..SnrConfig::new(1000.0)
        })
        .expect("valid config");
        let with_harmonic = kernel.run(&x).expect("valid input");
        assert!(with_harmonic.harmonics.is_empty());
        assert!(with_harmonic.snr_db < report.snr_db - 3.0);
    }

    #[test]
    fn silent_input_degrades_to_nan() {
        let snr = time_snr(&[3.0; 64], 100.0).expect("silence is not an error");
        assert!(snr.is_nan());
    }

    #[test]
    fn two_samples_do_not_panic() {
        assert!(snr_report(&[1.0, -1.0], 10.0).is_ok());
    }

    #[test]
    fn degenerate_inputs_are_rejected() {
        assert!(matches!(time_snr(&[1.0], 1000.0), Err(Error::InvalidArg { .. })));
        assert!(matches!(time_snr(&[], 1000.0), Err(Error::InvalidArg { .. })));
        assert!(matches!(
            time_snr(&[1.0, 2.0, 3.0], 0.0),
            Err(Error::InvalidArg { .. })
        ));
        assert!(SnrKernel::try_new(SnrConfig {
            harmonics: 0,
            ..SnrConfig::new(1000.0)
        })
        .is_err());
        assert!(psd_snr(&[1.0], &[0.0], 1.0, 6).is_err());
        assert!(psd_snr(&[1.0, 2.0], &[0.0], 1.0, 6).is_err());
    }
}
