//! Device-side analysis: what the firmware computes before it sends a packet.
//!
//! 128 samples, Hamming window, forward FFT, magnitude of the first 64 bins.
//! No normalisation is applied, matching the values the board puts on the wire.

use std::f64::consts::PI;
use std::sync::Arc;

use num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::protocol::{FFT_SIZE, Packet, SAMPLE_RATE_HZ, SPECTRUM_BINS, WAVEFORM_SAMPLES};

pub struct Analyzer {
    /// Planned once, reused for every capture
    fft: Arc<dyn Fft<f64>>,
    window: [f64; FFT_SIZE],
    /// Re-usable buffer for FFT input/output
    buffer: Vec<Complex<f64>>,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer {
    pub fn new() -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(FFT_SIZE);

        let mut window = [0.0; FFT_SIZE];
        let denom = (FFT_SIZE - 1) as f64;
        for (i, w) in window.iter_mut().enumerate() {
            *w = 0.54 - 0.46 * (2.0 * PI * i as f64 / denom).cos();
        }

        Self {
            fft,
            window,
            buffer: vec![Complex::default(); FFT_SIZE],
        }
    }

    /// Magnitude spectrum of one capture.
    pub fn spectrum(&mut self, samples: &[i16; WAVEFORM_SAMPLES]) -> [f64; SPECTRUM_BINS] {
        for ((slot, &s), &w) in self.buffer.iter_mut().zip(samples).zip(&self.window) {
            *slot = Complex {
                re: s as f64 * w,
                im: 0.0,
            };
        }
        self.fft.process(&mut self.buffer);

        let mut magnitudes = [0.0; SPECTRUM_BINS];
        for (m, c) in magnitudes.iter_mut().zip(&self.buffer[..SPECTRUM_BINS]) {
            *m = c.norm();
        }
        magnitudes
    }

    /// Builds the packet the device would send for these samples.
    pub fn analyze(&mut self, samples: &[i16; WAVEFORM_SAMPLES]) -> Packet {
        Packet {
            spectrum: self.spectrum(samples),
            waveform: *samples,
        }
    }
}

/// One sinusoidal component of a synthetic capture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub frequency: f64,
    pub amplitude: f64,
}

/// Samples a mix of tones at the device rate, starting at sample `offset`.
/// Values are clamped to the i16 range.
pub fn synthesize(tones: &[Tone], offset: u64) -> [i16; WAVEFORM_SAMPLES] {
    let mut samples = [0i16; WAVEFORM_SAMPLES];
    for (i, s) in samples.iter_mut().enumerate() {
        let t = (offset + i as u64) as f64 / SAMPLE_RATE_HZ;
        let value: f64 = tones
            .iter()
            .map(|tone| tone.amplitude * (2.0 * PI * tone.frequency * t).sin())
            .sum();
        *s = value.round().clamp(i16::MIN as f64, i16::MAX as f64) as i16;
    }
    samples
}
