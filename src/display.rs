//! Display buffers and the terminal view drawn from them.

use std::io::{self, Write};

use crate::peaks::{PEAK_COUNT, Peak, top_peaks};
use crate::protocol::{Packet, SPECTRUM_BINS, WAVEFORM_SAMPLES};
use crate::reconstruct::{ReconstructedWave, WAVE_SAMPLES, reconstruct_peak};

/// Everything a frame shows. Owned by the render loop and overwritten in
/// place on every successful decode.
#[derive(Debug, Clone)]
pub struct DisplayState {
    pub waveform: [i16; WAVEFORM_SAMPLES],
    pub spectrum: [f64; SPECTRUM_BINS],
    pub peaks: [Peak; PEAK_COUNT],
    pub waves: [ReconstructedWave; PEAK_COUNT],
    /// Packets decoded since start
    pub frames: u64,
    /// Packets lost to framing errors
    pub dropped: u64,
    /// Read timeouts while waiting for a marker
    pub idle: u64,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            waveform: [0; WAVEFORM_SAMPLES],
            spectrum: [0.0; SPECTRUM_BINS],
            peaks: [Peak::default(); PEAK_COUNT],
            waves: [[0.0; WAVE_SAMPLES]; PEAK_COUNT],
            frames: 0,
            dropped: 0,
            idle: 0,
        }
    }
}

impl DisplayState {
    /// Replaces all buffers from a decoded packet and recomputes peaks and
    /// waves.
    pub fn apply(&mut self, packet: &Packet) {
        self.waveform = packet.waveform;
        self.spectrum = packet.spectrum;
        self.peaks = top_peaks(&packet.spectrum);
        for (wave, peak) in self.waves.iter_mut().zip(&self.peaks) {
            *wave = reconstruct_peak(peak);
        }
        self.frames += 1;
    }

    pub fn mark_dropped(&mut self) {
        self.dropped += 1;
    }

    pub fn mark_idle(&mut self) {
        self.idle += 1;
    }
}

/// Consumer of a finished frame.
pub trait Renderer {
    fn draw(&mut self, state: &DisplayState) -> io::Result<()>;
}

const LEVELS: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Maps values onto block characters between their own min and max.
pub fn sparkline<I>(values: I) -> String
where
    I: IntoIterator<Item = f64>,
{
    let values: Vec<f64> = values.into_iter().collect();
    let (min, max) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let span = max - min;

    values
        .iter()
        .map(|&v| {
            if !v.is_finite() || span <= 0.0 {
                return LEVELS[0];
            }
            let level = ((v - min) / span * (LEVELS.len() - 1) as f64).round() as usize;
            LEVELS[level.min(LEVELS.len() - 1)]
        })
        .collect()
}

/// Redraws the view in place on a terminal.
pub struct TerminalRenderer<W: Write> {
    out: W,
    /// Lines printed by the previous frame, to move the cursor back over
    lines_drawn: usize,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            lines_drawn: 0,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn frame_lines(state: &DisplayState) -> Vec<String> {
        let mut lines = Vec::with_capacity(6 + PEAK_COUNT * 2);
        lines.push(format!(
            "frames: {}  dropped: {}  idle: {}",
            state.frames, state.dropped, state.idle
        ));
        lines.push(format!(
            "TOP 3 AMPLITUDES: {:.2}, {:.2}, {:.2}",
            state.peaks[0].amplitude, state.peaks[1].amplitude, state.peaks[2].amplitude
        ));
        for (rank, peak) in state.peaks.iter().enumerate() {
            lines.push(format!(
                "  #{} {:>8.2} Hz (bin {:>2}, Magnitude: {:.2})",
                rank + 1,
                peak.frequency,
                peak.bin,
                peak.amplitude
            ));
        }
        lines.push(format!(
            "spectrum |{}|",
            sparkline(state.spectrum.iter().copied())
        ));
        lines.push(format!(
            "waveform |{}|",
            sparkline(state.waveform.iter().map(|&s| s as f64))
        ));
        for (rank, wave) in state.waves.iter().enumerate() {
            lines.push(format!(
                "sine #{}  |{}|",
                rank + 1,
                sparkline(wave.iter().copied())
            ));
        }
        lines
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn draw(&mut self, state: &DisplayState) -> io::Result<()> {
        if self.lines_drawn > 0 {
            write!(self.out, "\x1B[{}A", self.lines_drawn)?;
        }
        let lines = Self::frame_lines(state);
        for line in &lines {
            // clear the rest of the line so shorter text leaves no residue
            writeln!(self.out, "{}\x1B[K", line)?;
        }
        self.lines_drawn = lines.len();
        self.out.flush()
    }
}
