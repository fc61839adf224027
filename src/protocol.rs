//! Wire format of the telemetry packets.
//!
//! ```text
//! [AA BB CC DD][64 x f64 LE spectrum][128 x i16 LE waveform]
//!      4 bytes        512 bytes             256 bytes
//! ```

use std::mem;

use crate::error::MonitorError;

pub const SYNC_MARKER: [u8; 4] = [0xAA, 0xBB, 0xCC, 0xDD];

/// Samples per capture on the device.
pub const FFT_SIZE: usize = 128;
pub const SAMPLE_RATE_HZ: f64 = 8000.0;

pub const SPECTRUM_BINS: usize = FFT_SIZE / 2;
pub const WAVEFORM_SAMPLES: usize = FFT_SIZE;

pub const SPECTRUM_BYTES: usize = SPECTRUM_BINS * mem::size_of::<f64>();
pub const WAVEFORM_BYTES: usize = WAVEFORM_SAMPLES * mem::size_of::<i16>();
pub const PAYLOAD_LEN: usize = SPECTRUM_BYTES + WAVEFORM_BYTES;
pub const PACKET_LEN: usize = SYNC_MARKER.len() + PAYLOAD_LEN;

/// Width of one spectrum bin in Hz (62.5 Hz for the fixed sampling setup).
pub const BIN_WIDTH_HZ: f64 = SAMPLE_RATE_HZ / FFT_SIZE as f64;

/// Centre frequency of spectrum bin `bin`.
pub fn bin_frequency(bin: usize) -> f64 {
    bin as f64 * BIN_WIDTH_HZ
}

/// One decoded packet.
#[derive(Debug, Clone, PartialEq)]
pub struct Packet {
    pub spectrum: [f64; SPECTRUM_BINS],
    pub waveform: [i16; WAVEFORM_SAMPLES],
}

impl Default for Packet {
    fn default() -> Self {
        Self {
            spectrum: [0.0; SPECTRUM_BINS],
            waveform: [0; WAVEFORM_SAMPLES],
        }
    }
}

impl Packet {
    /// Decodes a payload (the bytes after the sync marker).
    ///
    /// Anything other than exactly [`PAYLOAD_LEN`] bytes is a framing error and
    /// nothing is decoded.
    pub fn decode(payload: &[u8]) -> Result<Self, MonitorError> {
        if payload.len() != PAYLOAD_LEN {
            return Err(MonitorError::payload_length(payload.len()));
        }
        let (spectrum_bytes, waveform_bytes) = payload.split_at(SPECTRUM_BYTES);

        let mut packet = Packet::default();
        for (slot, chunk) in packet
            .spectrum
            .iter_mut()
            .zip(spectrum_bytes.chunks_exact(mem::size_of::<f64>()))
        {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(chunk);
            *slot = f64::from_le_bytes(raw);
        }
        for (slot, chunk) in packet
            .waveform
            .iter_mut()
            .zip(waveform_bytes.chunks_exact(mem::size_of::<i16>()))
        {
            *slot = i16::from_le_bytes([chunk[0], chunk[1]]);
        }
        Ok(packet)
    }

    /// Serialises the payload, without the marker.
    pub fn encode_payload(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(PAYLOAD_LEN);
        for value in &self.spectrum {
            out.extend_from_slice(&value.to_le_bytes());
        }
        for sample in &self.waveform {
            out.extend_from_slice(&sample.to_le_bytes());
        }
        out
    }

    /// Serialises a full frame as the device sends it.
    pub fn encode_frame(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(PACKET_LEN);
        out.extend_from_slice(&SYNC_MARKER);
        out.extend_from_slice(&self.encode_payload());
        out
    }
}
