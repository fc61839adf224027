//! Top-K peak picking over a decoded spectrum.

use crate::protocol::{SPECTRUM_BINS, bin_frequency};

pub const PEAK_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    pub bin: usize,
    pub amplitude: f64,
    pub frequency: f64,
}

impl Peak {
    fn at(spectrum: &[f64; SPECTRUM_BINS], bin: usize) -> Self {
        Self {
            bin,
            amplitude: spectrum[bin],
            frequency: bin_frequency(bin),
        }
    }
}

impl Default for Peak {
    fn default() -> Self {
        Self {
            bin: 0,
            amplitude: 0.0,
            frequency: 0.0,
        }
    }
}

// NaN loses against any number so a corrupt bin never shadows a real one.
fn outranks(candidate: f64, best: f64) -> bool {
    if best.is_nan() {
        !candidate.is_nan()
    } else {
        candidate > best
    }
}

/// Returns the three largest bins, DC excluded, largest first.
///
/// Each pass scans bins in ascending order and only replaces the current best
/// on a strictly larger value, so among equal amplitudes the lowest bin wins.
/// Already picked bins are masked out rather than removed, so bin indices (and
/// their frequencies) never shift between passes. Degenerate spectra (all zero,
/// negative values) still yield three distinct bins.
pub fn top_peaks(spectrum: &[f64; SPECTRUM_BINS]) -> [Peak; PEAK_COUNT] {
    // bit k set = bin k is out of the running; DC is always out
    let mut excluded: u64 = 1;
    let mut peaks = [Peak::default(); PEAK_COUNT];

    for peak in peaks.iter_mut() {
        let mut best: Option<usize> = None;
        for bin in 1..SPECTRUM_BINS {
            if excluded & (1u64 << bin) != 0 {
                continue;
            }
            match best {
                Some(b) if !outranks(spectrum[bin], spectrum[b]) => {}
                _ => best = Some(bin),
            }
        }
        // 63 candidate bins for 3 passes, there is always one left
        let bin = best.unwrap_or(0);
        excluded |= 1u64 << bin;
        *peak = Peak::at(spectrum, bin);
    }
    peaks
}
