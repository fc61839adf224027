//! Moving packets from the byte source to the display.
//!
//! Two ways to drive a frame:
//! - [`decode_cycle`] runs sync, decode, peak extraction and reconstruction
//!   synchronously on the caller's thread.
//! - [`spawn_reader`] + [`run`] put the blocking reads on their own thread and
//!   hand decoded packets to the tick loop over a bounded channel.

use std::io::Read;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, TryRecvError, bounded, tick};
use log::{debug, info, warn};

use crate::display::{DisplayState, Renderer};
use crate::error::MonitorError;
use crate::protocol::Packet;
use crate::sync::FrameSync;

/// One resync-decode-extract-reconstruct pass. On error `state` is untouched.
/// `sync` carries a partially matched marker over to the next call.
pub fn decode_cycle<R: Read + ?Sized>(
    reader: &mut R,
    sync: &mut FrameSync,
    state: &mut DisplayState,
) -> Result<(), MonitorError> {
    let packet = sync.read_packet(reader)?;
    state.apply(&packet);
    Ok(())
}

#[derive(Debug)]
pub enum ReaderEvent {
    Frame(Packet),
    /// No marker arrived within the read timeout
    Idle,
    /// A packet was lost but the reader keeps going
    Dropped(MonitorError),
    /// The reader stopped for good
    Closed(MonitorError),
}

/// Starts a thread that reads packets from `source` until it fails for good
/// or the receiving side goes away. `send` blocks when the queue is full.
pub fn spawn_reader<R>(
    mut source: R,
    capacity: usize,
) -> (Receiver<ReaderEvent>, thread::JoinHandle<()>)
where
    R: Read + Send + 'static,
{
    let (tx, rx) = bounded(capacity.max(1));

    let handle = thread::spawn(move || {
        let mut sync = FrameSync::new();
        loop {
            let event = match sync.read_packet(&mut source) {
                Ok(packet) => ReaderEvent::Frame(packet),
                Err(MonitorError::Timeout) => {
                    debug!("[Reader] no data within timeout");
                    ReaderEvent::Idle
                }
                Err(e) if e.is_transient() => {
                    warn!("[Reader] {}", e);
                    ReaderEvent::Dropped(e)
                }
                Err(e) => {
                    info!("[Reader] stopping: {}", e);
                    let _ = tx.send(ReaderEvent::Closed(e));
                    return;
                }
            };
            if tx.send(event).is_err() {
                // display loop is gone
                return;
            }
        }
    });

    (rx, handle)
}

/// Applies whatever arrived since the last tick without blocking. Only the
/// newest frame is decoded into `state`. Returns whether anything changed.
pub fn drain_events(
    events: &Receiver<ReaderEvent>,
    state: &mut DisplayState,
) -> Result<bool, MonitorError> {
    let mut latest: Option<Packet> = None;
    let mut changed = false;

    let outcome = loop {
        match events.try_recv() {
            Ok(ReaderEvent::Frame(packet)) => latest = Some(packet),
            Ok(ReaderEvent::Idle) => {
                state.mark_idle();
                changed = true;
            }
            Ok(ReaderEvent::Dropped(_)) => {
                state.mark_dropped();
                changed = true;
            }
            Ok(ReaderEvent::Closed(e)) => break Err(e),
            Err(TryRecvError::Empty) => break Ok(()),
            Err(TryRecvError::Disconnected) => break Err(MonitorError::ChannelClosed),
        }
    };

    if let Some(packet) = latest {
        state.apply(&packet);
        changed = true;
    }
    outcome.map(|_| changed)
}

/// Tick loop: every `interval`, drain the reader and redraw if anything
/// changed. Returns the fatal error that ended the stream, after drawing the
/// last state.
pub fn run<Rd: Renderer>(
    events: &Receiver<ReaderEvent>,
    renderer: &mut Rd,
    interval: Duration,
) -> MonitorError {
    let ticker = tick(interval);
    let mut state = DisplayState::default();

    loop {
        if ticker.recv().is_err() {
            return MonitorError::ChannelClosed;
        }
        match drain_events(events, &mut state) {
            Ok(false) => {}
            Ok(true) => {
                if let Err(e) = renderer.draw(&state) {
                    return MonitorError::Io(e);
                }
            }
            Err(fatal) => {
                if let Err(e) = renderer.draw(&state) {
                    warn!("final redraw failed: {}", e);
                }
                return fatal;
            }
        }
    }
}
