use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::{thread, time::Duration};

use log::info;
use serial_spectrum_monitor::MonitorError;
use serial_spectrum_monitor::analyzer::{Analyzer, Tone, synthesize};
use serial_spectrum_monitor::protocol::WAVEFORM_SAMPLES;

fn parse_tone(s: &str) -> Result<Tone, String> {
    let (freq, amp) = s
        .split_once(':')
        .ok_or_else(|| format!("expected FREQ:AMP, got '{}'", s))?;
    let frequency = freq
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("bad frequency '{}': {}", freq, e))?;
    let amplitude = amp
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("bad amplitude '{}': {}", amp, e))?;
    Ok(Tone {
        frequency,
        amplitude,
    })
}

#[derive(Parser)]
#[clap(
    name = "packet-simulator",
    about = "Writes device-style spectrum packets for a mix of tones"
)]
struct Opt {
    #[clap(short, long, help = "Output file (stdout when omitted)")]
    output: Option<PathBuf>,

    #[clap(short, long, default_value_t = 100, help = "Number of packets")]
    count: u64,

    #[clap(
        short,
        long = "tone",
        value_parser = parse_tone,
        help = "Tone as FREQ:AMP, repeatable (default 500:200 1250:120 3000:60)"
    )]
    tones: Vec<Tone>,

    #[clap(long, default_value_t = 0, help = "Noise bytes before every marker")]
    garbage: usize,

    #[clap(
        long,
        help = "Cut every Nth packet in half; the reader loses the following packet too"
    )]
    truncate_every: Option<u64>,

    #[clap(long, default_value_t = 0, help = "Delay between packets in milliseconds")]
    interval_ms: u64,
}

fn default_tones() -> Vec<Tone> {
    vec![
        Tone {
            frequency: 500.0,
            amplitude: 200.0,
        },
        Tone {
            frequency: 1250.0,
            amplitude: 120.0,
        },
        Tone {
            frequency: 3000.0,
            amplitude: 60.0,
        },
    ]
}

fn main() -> Result<(), MonitorError> {
    env_logger::init();
    let opt = Opt::parse();

    let tones = if opt.tones.is_empty() {
        default_tones()
    } else {
        opt.tones.clone()
    };

    let mut out: Box<dyn Write> = match &opt.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout())),
    };

    let mut analyzer = Analyzer::new();
    // odd bytes only: 0xAA and 0xCC never show up, so no marker either
    let garbage: Vec<u8> = (0..opt.garbage)
        .map(|i| (i as u8).wrapping_mul(37) | 0x01)
        .collect();

    for n in 0..opt.count {
        let samples = synthesize(&tones, n * WAVEFORM_SAMPLES as u64);
        let frame = analyzer.analyze(&samples).encode_frame();

        out.write_all(&garbage)?;
        match opt.truncate_every {
            Some(every) if every > 0 && (n + 1) % every == 0 => {
                out.write_all(&frame[..frame.len() / 2])?;
            }
            _ => out.write_all(&frame)?,
        }

        if opt.interval_ms > 0 {
            out.flush()?;
            thread::sleep(Duration::from_millis(opt.interval_ms));
        }
    }
    out.flush()?;
    info!("[Simulator] wrote {} packets", opt.count);
    Ok(())
}
