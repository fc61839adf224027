//! Illustrative resynthesis of a single spectral peak.
//!
//! This is a visual aid, not an inverse FFT. The sample index is fed straight
//! into `sin(2π·f·t)` with `f` in Hz, so the curve is not in seconds. The
//! receiving tool has always plotted it this way and the display keeps that
//! formula unchanged.

use std::f64::consts::PI;

use crate::peaks::Peak;

pub const WAVE_SAMPLES: usize = 50;

pub type ReconstructedWave = [f64; WAVE_SAMPLES];

/// `amplitude * sin(2π * frequency * t)` for `t = 0..50`.
pub fn reconstruct(amplitude: f64, frequency: f64) -> ReconstructedWave {
    let mut wave = [0.0; WAVE_SAMPLES];
    for (t, sample) in wave.iter_mut().enumerate() {
        *sample = amplitude * (2.0 * PI * frequency * t as f64).sin();
    }
    wave
}

pub fn reconstruct_peak(peak: &Peak) -> ReconstructedWave {
    reconstruct(peak.amplitude, peak.frequency)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_zero_frequency_is_flat() {
        let wave = reconstruct(10.0, 0.0);
        assert!(wave.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_zero_amplitude_is_flat() {
        let wave = reconstruct(0.0, 312.5);
        assert!(wave.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_literal_formula() {
        let wave = reconstruct(3.0, 0.1);
        assert_eq!(wave.len(), WAVE_SAMPLES);
        for (t, &s) in wave.iter().enumerate() {
            let expected = 3.0 * (2.0 * PI * 0.1 * t as f64).sin();
            assert_abs_diff_eq!(s, expected, epsilon = 1e-12);
        }
        // a quarter period lands at t = 2.5, so t = 2 and t = 3 mirror each other
        assert_abs_diff_eq!(wave[2], wave[3], epsilon = 1e-12);
    }

    #[test]
    fn test_bin_frequencies_vanish_on_index_grid() {
        // 2π * 62.5k * t is always a multiple of π for integer t
        for bin in [1usize, 17, 63] {
            let wave = reconstruct(1.0, crate::protocol::bin_frequency(bin));
            for &s in wave.iter() {
                assert_abs_diff_eq!(s, 0.0, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_reconstruct_peak_uses_amplitude_and_frequency() {
        let peak = Peak {
            bin: 2,
            amplitude: -2.0,
            frequency: 0.25,
        };
        let wave = reconstruct_peak(&peak);
        assert_abs_diff_eq!(wave[1], -2.0, epsilon = 1e-12);
    }
}
