//! Where the bytes come from: a serial port, or a capture replayed from disk.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use std::time::Duration;

use log::info;

use crate::error::MonitorError;

pub const DEFAULT_BAUD: u32 = 115_200;

/// Opens `port_name` for reading packets.
///
/// The port is read with `timeout`; an elapsed timeout surfaces as
/// [`MonitorError::Timeout`] and the reader carries on.
pub fn open_serial(
    port_name: &str,
    baud: u32,
    timeout: Duration,
) -> Result<Box<dyn serialport::SerialPort>, MonitorError> {
    let port = serialport::new(port_name, baud).timeout(timeout).open()?;
    info!("opened {} @ {}", port_name, baud);
    Ok(port)
}

pub fn list_ports() -> Result<Vec<String>, MonitorError> {
    Ok(serialport::available_ports()?
        .into_iter()
        .map(|p| p.port_name)
        .collect())
}

/// A recorded byte stream. `-` reads stdin.
pub fn open_capture(path: &Path) -> io::Result<Box<dyn Read + Send>> {
    if path.as_os_str() == "-" {
        info!("replaying from stdin");
        return Ok(Box::new(io::stdin()));
    }
    let file = File::open(path)?;
    info!("replaying {}", path.display());
    Ok(Box::new(BufReader::new(file)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Packet;
    use crate::sync::read_packet;
    use std::io::Write;

    #[test]
    fn test_open_capture_missing_file() {
        let path = std::env::temp_dir().join("serial-spectrum-monitor-does-not-exist.bin");
        assert!(open_capture(&path).is_err());
    }

    #[test]
    fn test_open_capture_reads_frames() {
        let mut packet = Packet::default();
        packet.waveform[127] = 12;
        let path = std::env::temp_dir().join(format!(
            "serial-spectrum-monitor-capture-{}.bin",
            std::process::id()
        ));
        {
            let mut file = File::create(&path).unwrap();
            file.write_all(&[0x01, 0x02]).unwrap();
            file.write_all(&packet.encode_frame()).unwrap();
        }

        let mut source = open_capture(&path).unwrap();
        let decoded = read_packet(&mut source).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(decoded, packet);
    }
}
