//! Frame synchronisation on top of a raw byte stream.

use std::io::{ErrorKind, Read};

use log::debug;

use crate::error::MonitorError;
use crate::protocol::{PAYLOAD_LEN, Packet, SYNC_MARKER};

enum ReadOutcome {
    Byte(u8),
    Eof,
}

fn read_byte<R: Read + ?Sized>(reader: &mut R) -> Result<ReadOutcome, std::io::Error> {
    let mut byte = [0u8; 1];
    loop {
        match reader.read(&mut byte) {
            Ok(0) => return Ok(ReadOutcome::Eof),
            Ok(_) => return Ok(ReadOutcome::Byte(byte[0])),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

fn is_timeout(e: &std::io::Error) -> bool {
    matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock)
}

fn is_disconnect(e: &std::io::Error) -> bool {
    matches!(
        e.kind(),
        ErrorKind::UnexpectedEof
            | ErrorKind::BrokenPipe
            | ErrorKind::NotConnected
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
    )
}

/// Rolling match state for the sync marker.
///
/// Lives across cycles so a read timeout in the middle of a marker does not
/// throw away the bytes already matched.
#[derive(Debug, Default, Clone)]
pub struct FrameSync {
    window: [u8; SYNC_MARKER.len()],
    /// Valid bytes in `window`, saturating at the marker length
    filled: usize,
    /// Bytes consumed since the last marker
    consumed: usize,
}

impl FrameSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes bytes until the last four read equal [`SYNC_MARKER`].
    ///
    /// Slides one byte at a time, so a marker right after a partial one is
    /// still found. Returns how many bytes were skipped before the marker.
    pub fn seek_marker<R: Read + ?Sized>(
        &mut self,
        reader: &mut R,
    ) -> Result<usize, MonitorError> {
        loop {
            let byte = match read_byte(reader) {
                Ok(ReadOutcome::Byte(b)) => b,
                Ok(ReadOutcome::Eof) => return Err(MonitorError::ChannelClosed),
                Err(e) if is_timeout(&e) => return Err(MonitorError::Timeout),
                Err(e) if is_disconnect(&e) => return Err(MonitorError::ChannelClosed),
                Err(e) => return Err(MonitorError::Io(e)),
            };

            self.window.rotate_left(1);
            self.window[SYNC_MARKER.len() - 1] = byte;
            self.filled = (self.filled + 1).min(SYNC_MARKER.len());
            self.consumed += 1;

            if self.filled == SYNC_MARKER.len() && self.window == SYNC_MARKER {
                let skipped = self.consumed - SYNC_MARKER.len();
                self.filled = 0;
                self.consumed = 0;
                return Ok(skipped);
            }
        }
    }

    /// Synchronises on the next marker and decodes the packet that follows it.
    pub fn read_packet<R: Read + ?Sized>(
        &mut self,
        reader: &mut R,
    ) -> Result<Packet, MonitorError> {
        let skipped = self.seek_marker(reader)?;
        if skipped > 0 {
            debug!("{}", MonitorError::SyncLoss { skipped });
        }
        let payload = read_payload(reader)?;
        Packet::decode(&payload)
    }
}

/// Reads exactly one payload after a marker. A short read of any kind is a
/// framing error; the partial bytes are dropped.
fn read_payload<R: Read + ?Sized>(reader: &mut R) -> Result<Vec<u8>, MonitorError> {
    let mut payload = vec![0u8; PAYLOAD_LEN];
    let mut filled = 0;

    while filled < PAYLOAD_LEN {
        match reader.read(&mut payload[filled..]) {
            Ok(0) => return Err(MonitorError::payload_length(filled)),
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) if is_timeout(&e) || is_disconnect(&e) => {
                return Err(MonitorError::payload_length(filled));
            }
            Err(e) => return Err(MonitorError::Io(e)),
        }
    }
    Ok(payload)
}

/// One-shot read with fresh sync state, for streams read a single time.
pub fn read_packet<R: Read + ?Sized>(reader: &mut R) -> Result<Packet, MonitorError> {
    FrameSync::new().read_packet(reader)
}
