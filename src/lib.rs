//! Host side of a microcontroller spectrum link.
//!
//! The board streams framed packets over serial, each carrying a 64-bin
//! magnitude spectrum and the 128 raw samples it came from. This crate finds
//! packet boundaries, decodes them, picks the three strongest bins and keeps
//! the buffers a live display draws from.

pub mod analyzer;
pub mod display;
pub mod error;
pub mod peaks;
pub mod pipeline;
pub mod protocol;
pub mod reconstruct;
pub mod source;
pub mod sync;

pub use error::MonitorError;
pub use protocol::Packet;
