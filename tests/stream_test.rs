use std::io::Cursor;

use approx::assert_abs_diff_eq;
use serial_spectrum_monitor::MonitorError;
use serial_spectrum_monitor::analyzer::{Analyzer, Tone, synthesize};
use serial_spectrum_monitor::display::DisplayState;
use serial_spectrum_monitor::peaks::top_peaks;
use serial_spectrum_monitor::pipeline::{ReaderEvent, decode_cycle, spawn_reader};
use serial_spectrum_monitor::protocol::{
    PACKET_LEN, PAYLOAD_LEN, Packet, SPECTRUM_BINS, SYNC_MARKER, WAVEFORM_SAMPLES, bin_frequency,
};
use serial_spectrum_monitor::sync::FrameSync;

fn device_packet(offset: u64) -> Packet {
    let tones = [
        Tone {
            frequency: bin_frequency(8),
            amplitude: 300.0,
        },
        Tone {
            frequency: bin_frequency(24),
            amplitude: 250.0,
        },
        Tone {
            frequency: bin_frequency(50),
            amplitude: 220.0,
        },
    ];
    Analyzer::new().analyze(&synthesize(&tones, offset))
}

#[test]
fn test_leading_garbage_then_packet() {
    let packet = device_packet(0);
    let mut bytes = vec![0x00];
    bytes.extend_from_slice(&packet.encode_frame());
    assert_eq!(bytes.len(), PACKET_LEN + 1);

    let mut state = DisplayState::default();
    decode_cycle(&mut Cursor::new(bytes), &mut FrameSync::new(), &mut state).unwrap();

    assert_eq!(state.spectrum.len(), SPECTRUM_BINS);
    assert_eq!(state.waveform.len(), WAVEFORM_SAMPLES);
    assert_eq!(state.waveform, packet.waveform);
    let bins: Vec<usize> = state.peaks.iter().map(|p| p.bin).collect();
    assert_eq!(bins, vec![8, 24, 50]);
    assert_eq!(state.peaks[0].frequency, 500.0);
}

#[test]
fn test_payload_survives_decode_and_reencode() {
    let packet = device_packet(1234);
    let frame = packet.encode_frame();
    let decoded = Packet::decode(&frame[SYNC_MARKER.len()..]).unwrap();
    assert_eq!(decoded.encode_payload(), frame[SYNC_MARKER.len()..].to_vec());
}

#[test]
fn test_truncated_stream_keeps_rendered_buffers() {
    let first = device_packet(0);
    let mut bytes = first.encode_frame();
    bytes.extend_from_slice(&SYNC_MARKER);
    bytes.extend_from_slice(&[0x7F; PAYLOAD_LEN / 3]);
    let mut stream = Cursor::new(bytes);

    let mut sync = FrameSync::new();
    let mut state = DisplayState::default();
    decode_cycle(&mut stream, &mut sync, &mut state).unwrap();
    let shown = state.clone();

    match decode_cycle(&mut stream, &mut sync, &mut state) {
        Err(MonitorError::Framing { received, expected }) => {
            assert_eq!(received, PAYLOAD_LEN / 3);
            assert_eq!(expected, PAYLOAD_LEN);
        }
        other => panic!("expected framing error, got {:?}", other),
    }
    assert_eq!(state.spectrum, shown.spectrum);
    assert_eq!(state.waveform, shown.waveform);
    assert_eq!(state.peaks, shown.peaks);
    assert_eq!(state.waves, shown.waves);

    // nothing left: the device is gone
    assert!(matches!(
        decode_cycle(&mut stream, &mut sync, &mut state),
        Err(MonitorError::ChannelClosed)
    ));
}

#[test]
fn test_reader_thread_over_noisy_stream() {
    let mut bytes = Vec::new();
    for n in 0..5u64 {
        bytes.extend_from_slice(&[0x13, 0xAA, 0xBB, 0x55]);
        bytes.extend_from_slice(&device_packet(n * 128).encode_frame());
    }

    let (rx, handle) = spawn_reader(Cursor::new(bytes), 2);
    let mut frames = 0;
    let mut closed = false;
    for event in rx.iter() {
        match event {
            ReaderEvent::Frame(packet) => {
                frames += 1;
                assert_eq!(top_peaks(&packet.spectrum)[0].bin, 8);
            }
            ReaderEvent::Idle => {}
            ReaderEvent::Dropped(e) => panic!("unexpected drop: {}", e),
            ReaderEvent::Closed(e) => {
                assert!(matches!(e, MonitorError::ChannelClosed));
                closed = true;
            }
        }
    }
    handle.join().unwrap();
    assert_eq!(frames, 5);
    assert!(closed);
}

#[test]
fn test_worked_example_spectrum() {
    let mut spectrum = [0.0; SPECTRUM_BINS];
    spectrum[..5].copy_from_slice(&[0.0, 5.0, 1.0, 9.0, 2.0]);
    let peaks = top_peaks(&spectrum);
    assert_eq!((peaks[0].amplitude, peaks[0].frequency), (9.0, bin_frequency(3)));
    assert_eq!((peaks[1].amplitude, peaks[1].frequency), (5.0, bin_frequency(1)));
    assert_eq!((peaks[2].amplitude, peaks[2].frequency), (2.0, bin_frequency(4)));
    assert_abs_diff_eq!(bin_frequency(3), 187.5);
}
