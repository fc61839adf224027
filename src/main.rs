use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use log::{error, info};
use serial_spectrum_monitor::MonitorError;
use serial_spectrum_monitor::display::TerminalRenderer;
use serial_spectrum_monitor::pipeline::{run, spawn_reader};
use serial_spectrum_monitor::source::{self, DEFAULT_BAUD};

#[derive(Parser)]
#[clap(
    name = "spectrum-monitor",
    about = "Live view of waveform and spectrum packets from a serial device"
)]
struct Opt {
    #[clap(
        short,
        long,
        required_unless_present_any = ["input", "list_ports"],
        help = "Serial port to read from, e.g. /dev/ttyUSB0 or COM4"
    )]
    port: Option<String>,

    #[clap(short, long, default_value_t = DEFAULT_BAUD, help = "Baud rate")]
    baud: u32,

    #[clap(
        long,
        default_value_t = 1000,
        help = "Serial read timeout in milliseconds"
    )]
    timeout_ms: u64,

    #[clap(long, default_value_t = 10, help = "Display refresh interval in milliseconds")]
    tick_ms: u64,

    #[clap(
        short,
        long,
        conflicts_with = "port",
        help = "Replay a captured byte stream instead of a port ('-' for stdin)"
    )]
    input: Option<PathBuf>,

    #[clap(long, default_value_t = 4, help = "Packets buffered between reader and display")]
    queue: usize,

    #[clap(long, help = "List serial ports and exit")]
    list_ports: bool,
}

pub fn main() -> Result<(), MonitorError> {
    env_logger::init();
    let opt = Opt::parse();

    if opt.list_ports {
        for name in source::list_ports()? {
            println!("{}", name);
        }
        return Ok(());
    }

    let (events, reader) = match (&opt.input, &opt.port) {
        (Some(path), _) => spawn_reader(source::open_capture(path)?, opt.queue),
        (None, Some(port)) => spawn_reader(
            source::open_serial(port, opt.baud, Duration::from_millis(opt.timeout_ms))?,
            opt.queue,
        ),
        (None, None) => {
            return Err(MonitorError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                "no source given: pass --port or --input",
            )));
        }
    };

    let mut renderer = TerminalRenderer::new(io::stdout());
    let reason = run(&events, &mut renderer, Duration::from_millis(opt.tick_ms));
    drop(events);
    if reader.join().is_err() {
        error!("reader thread panicked");
    }

    match reason {
        // a replayed capture simply runs out
        MonitorError::ChannelClosed if opt.input.is_some() => {
            info!("end of capture");
            Ok(())
        }
        e => {
            error!("{}", e);
            Err(e)
        }
    }
}
