use thiserror::Error;

use crate::protocol::PAYLOAD_LEN;

#[derive(Error, Debug)]
pub enum MonitorError {
    /// Bytes were discarded before a sync marker was found. Never returned by
    /// the synchronizer itself, only used for logging.
    #[error("sync lost, skipped {skipped} bytes before marker")]
    SyncLoss { skipped: usize },

    #[error("bad payload length: got {received}, expected {expected}")]
    Framing { received: usize, expected: usize },

    #[error("read timed out")]
    Timeout,

    #[error("byte stream closed")]
    ChannelClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),
}

impl MonitorError {
    pub(crate) fn payload_length(received: usize) -> Self {
        MonitorError::Framing {
            received,
            expected: PAYLOAD_LEN,
        }
    }

    /// Whether the next cycle can carry on after this error.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            MonitorError::SyncLoss { .. } | MonitorError::Framing { .. } | MonitorError::Timeout
        )
    }
}
