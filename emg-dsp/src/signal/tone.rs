//! Tone isolation in a one-sided power spectral density.
//!
//! A tone is a peak bin plus its skirt: the run of bins on either side over
//! which the spectrum does not rise again moving away from the peak. All
//! indices are 0-based and inclusive, so `left <= peak <= right < psd.len()`.

use crate::signal::spectral::bandpower;
use crate::stats;
use emg_dsp_core::{Error, Result};
use itertools::Itertools;

/// Bin range attributed to one tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToneBins {
    /// Bin the search started from: the bin nearest the requested
    /// frequency, or the global maximum for an untargeted search.
    pub anchor: usize,
    /// Strongest bin of the tone.
    pub peak: usize,
    /// First bin of the skirt.
    pub left: usize,
    /// Last bin of the skirt.
    pub right: usize,
}

impl ToneBins {
    /// Number of bins covered.
    pub fn width(&self) -> usize {
        self.right - self.left + 1
    }

    /// Whether `bin` lies in `[left, right]`.
    pub fn contains(&self, bin: usize) -> bool {
        (self.left..=self.right).contains(&bin)
    }
}

/// Integrated power and centre frequency of a tone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneEstimate {
    /// Power in the tone's bins, never below `rbw * psd[peak]`.
    pub power: f64,
    /// Power-weighted mean frequency of the tone's bins, or the peak bin's
    /// frequency when the power was raised to the bandwidth floor.
    pub frequency: f64,
    /// Bins attributed to the tone.
    pub bins: ToneBins,
}

fn skirt(psd: &[f64], peak: usize) -> (usize, usize) {
    let mut left = peak;
    while left > 0 && !(psd[left - 1] > psd[left]) {
        left -= 1;
    }
    let mut right = peak;
    while right + 1 < psd.len() && !(psd[right] < psd[right + 1]) {
        right += 1;
    }
    (left, right)
}

/// The tone around the global maximum (first maximum on ties).
///
/// `None` for an empty spectrum.
pub fn strongest_tone(psd: &[f64]) -> Option<ToneBins> {
    let peak = stats::argmax(psd)?;
    let (left, right) = skirt(psd, peak);
    Some(ToneBins {
        anchor: peak,
        peak,
        left,
        right,
    })
}

/// The tone closest to `target` Hz.
///
/// The search anchors on the bin nearest `target`, takes the strongest of it
/// and its two neighbours as the peak, then widens to the skirt. Returns
/// `None` when `target` lies outside `[freqs[0], freqs[last]]` (NaN included).
///
/// # Errors
/// [`Error::LengthMismatch`] when `freqs` and `psd` differ in length.
pub fn tone_near(psd: &[f64], freqs: &[f64], target: f64) -> Result<Option<ToneBins>> {
    if freqs.len() != psd.len() {
        return Err(Error::length_mismatch("freqs", psd.len(), freqs.len()));
    }
    let (Some(&first), Some(&last)) = (freqs.first(), freqs.last()) else {
        return Ok(None);
    };
    if !(first <= target && target <= last) {
        return Ok(None);
    }

    let distance = freqs.iter().map(|f| (f - target).abs()).collect_vec();
    let Some(anchor) = stats::argmin(&distance) else {
        return Ok(None);
    };
    let lo = anchor.saturating_sub(1);
    let hi = (anchor + 1).min(psd.len() - 1);
    let Some(offset) = stats::argmax(&psd[lo..=hi]) else {
        return Ok(None);
    };
    let peak = lo + offset;
    let (left, right) = skirt(psd, peak);
    Ok(Some(ToneBins {
        anchor,
        peak,
        left,
        right,
    }))
}

fn mean_spacing(freqs: &[f64]) -> f64 {
    if freqs.len() < 2 {
        return f64::NAN;
    }
    stats::mean::<_, f64>(freqs.iter().tuple_windows().map(|(lo, hi)| hi - lo)).0
}

/// Power and frequency of the tone occupying `bins`.
///
/// A multi-bin tone integrates with [`bandpower`] over its own bins. A
/// single interior bin uses half the distance between its neighbours as its
/// width, a single edge bin the mean spacing. The result is raised to
/// `rbw * psd[peak]` when it falls below it, since no tone can be narrower
/// than the window's equivalent noise bandwidth.
///
/// # Errors
/// [`Error::LengthMismatch`] for mismatched `freqs`, [`Error::InvalidArg`]
/// when `bins` does not describe a range inside `psd`.
pub fn measure_tone(
    psd: &[f64],
    freqs: &[f64],
    rbw: f64,
    bins: ToneBins,
) -> Result<ToneEstimate> {
    if freqs.len() != psd.len() {
        return Err(Error::length_mismatch("freqs", psd.len(), freqs.len()));
    }
    let ToneBins {
        peak, left, right, ..
    } = bins;
    if !(left <= peak && peak <= right && right < psd.len()) {
        return Err(Error::invalid(
            "bins",
            "tone bins must satisfy left <= peak <= right < len",
        ));
    }

    let band_psd = &psd[left..=right];
    let band_freqs = &freqs[left..=right];
    let weighted = band_freqs
        .iter()
        .zip(band_psd.iter())
        .map(|(f, p)| f * p)
        .sum::<f64>();
    let mut frequency = weighted / stats::sum::<_, f64>(band_psd.iter());

    let mut power = if left < right {
        bandpower(band_psd, band_freqs)?
    } else if right >= 1 && right + 1 < psd.len() {
        psd[right] * (freqs[right + 1] - freqs[right - 1]) / 2.0
    } else {
        psd[right] * mean_spacing(freqs)
    };

    let floor = rbw * psd[peak];
    if power < floor {
        power = floor;
        frequency = freqs[peak];
    }

    Ok(ToneEstimate {
        power,
        frequency,
        bins,
    })
}

/// Zero the tone's bins.
pub fn remove_tone(psd: &mut [f64], bins: &ToneBins) {
    psd[bins.left..=bins.right].fill(0.0);
}
