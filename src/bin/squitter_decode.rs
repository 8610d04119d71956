//! Squitter Decoder
//!
//! Run the preamble correlator over a recorded IQ capture and print every
//! decoded Mode S message.
//!
//! Usage:
//!   squitter_decode [OPTIONS] <capture>
//!
//! Options:
//!   --words               Input is raw little-endian bus words (default: WAV)
//!   --spu <N>             Samples per microsecond (default: 64)
//!   -t, --threshold <N>   Correlation threshold (default: 8000)
//!   --short               Expect 56-bit squitters
//!   --restart             Re-trigger on a new preamble mid-payload
//!   --lowpass <taps>      Smooth the magnitude with comma-separated FIR taps
//!   -v, --verbose         More log output (repeat for more)
//!   -h, --help            Show this help message

use rustyrx::adsb::{Squitter, SHORT_SQUITTER_BITS};
use rustyrx::correlator::{CorrelatorConfig, OverlapPolicy, SquitterReceiver};
use rustyrx::cordic::HARDWARE_ITERATIONS;
use rustyrx::fixed::{ComplexSample, FixedFormat};
use rustyrx::iq_file::{read_bus_words, read_iq_wav};
use rustyrx::tracing_init::{init_tracing, Verbosity};

struct DecodeConfig {
    verbosity: Verbosity,
    input_path: String,
    words: bool,
    samples_per_us: usize,
    threshold: i64,
    short: bool,
    restart: bool,
    lowpass: Option<Vec<i32>>,
}

impl DecodeConfig {
    fn parse_args() -> Result<Self, String> {
        let args: Vec<String> = std::env::args().collect();

        let mut words = false;
        let mut samples_per_us = 64;
        let mut threshold = 8000;
        let mut short = false;
        let mut restart = false;
        let mut lowpass = None;
        let mut input_path = None;

        let mut verbose = 0;
        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--words" => words = true,
                "--spu" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("Missing value for --spu".to_string());
                    }
                    samples_per_us = args[i]
                        .parse()
                        .map_err(|_| format!("Invalid samples per microsecond: {}", args[i]))?;
                }
                "-t" | "--threshold" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("Missing value for --threshold".to_string());
                    }
                    threshold = args[i]
                        .parse()
                        .map_err(|_| format!("Invalid threshold: {}", args[i]))?;
                }
                "--short" => short = true,
                "--restart" => restart = true,
                "--lowpass" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("Missing value for --lowpass".to_string());
                    }
                    let taps = args[i]
                        .split(',')
                        .map(|t| t.trim().parse::<i32>())
                        .collect::<Result<Vec<_>, _>>()
                        .map_err(|_| format!("Invalid FIR taps: {}", args[i]))?;
                    lowpass = Some(taps);
                }
                "-v" | "--verbose" => verbose += 1,
                "-vv" => verbose += 2,
                "-vvv" => verbose += 3,
                "-h" | "--help" => {
                    print_help(&args[0]);
                    std::process::exit(0);
                }
                arg if !arg.starts_with('-') => {
                    if input_path.is_none() {
                        input_path = Some(arg.to_string());
                    } else {
                        return Err(format!("Unexpected argument: {}", arg));
                    }
                }
                arg => return Err(format!("Unknown option: {}", arg)),
            }
            i += 1;
        }

        let input_path = input_path.ok_or("Missing capture file argument")?;

        Ok(DecodeConfig {
            verbosity: Verbosity::from_count(verbose),
            input_path,
            words,
            samples_per_us,
            threshold,
            short,
            restart,
            lowpass,
        })
    }
}

fn print_help(program: &str) {
    eprintln!("Squitter Decoder");
    eprintln!();
    eprintln!("Usage: {} [OPTIONS] <capture>", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --words               Input is raw little-endian bus words (default: WAV)");
    eprintln!("  --spu <N>             Samples per microsecond (default: 64)");
    eprintln!("  -t, --threshold <N>   Correlation threshold (default: 8000)");
    eprintln!("  --short               Expect 56-bit squitters");
    eprintln!("  --restart             Re-trigger on a new preamble mid-payload");
    eprintln!("  --lowpass <taps>      Smooth the magnitude with comma-separated FIR taps");
    eprintln!("  -v, --verbose         More log output (repeat for more)");
    eprintln!("  -h, --help            Show this help message");
}

fn main() -> Result<(), String> {
    let config = DecodeConfig::parse_args()?;
    init_tracing(config.verbosity);

    let samples: Vec<ComplexSample> = if config.words {
        read_bus_words(&config.input_path)
            .map_err(|e| e.to_string())?
            .into_iter()
            .map(|w| ComplexSample::from_bus_word(w, FixedFormat::IQ16))
            .collect()
    } else {
        read_iq_wav(&config.input_path).map_err(|e| e.to_string())?
    };

    let mut correlator_config =
        CorrelatorConfig::adsb(config.samples_per_us, config.threshold).map_err(|e| e.to_string())?;
    if config.short {
        correlator_config = correlator_config
            .with_payload_len(SHORT_SQUITTER_BITS)
            .map_err(|e| e.to_string())?;
    }
    if config.restart {
        correlator_config = correlator_config.with_overlap_policy(OverlapPolicy::Restart);
    }

    let mut receiver =
        SquitterReceiver::new(correlator_config, HARDWARE_ITERATIONS).map_err(|e| e.to_string())?;
    if let Some(taps) = config.lowpass {
        receiver = receiver.with_lowpass(taps).map_err(|e| e.to_string())?;
    }

    println!("Decoding {} ({} samples)", config.input_path, samples.len());
    let messages = receiver.decode_stream(&samples);

    for message in &messages {
        let us = message.peak_index as f64 / config.samples_per_us as f64;
        match Squitter::try_from(message) {
            Ok(squitter) => println!(
                "{:>10.2} us  {}  DF{:<2} ICAO {:06x}  parity {}",
                us,
                squitter.to_hex(),
                squitter.downlink_format(),
                squitter.icao(),
                if squitter.parity_ok() { "ok" } else { "FAIL" }
            ),
            Err(e) => println!("{:>10.2} us  {}  ({})", us, message.to_hex(), e),
        }
    }

    let stats = receiver.correlator().stats();
    println!();
    println!(
        "{} message(s), {} trigger(s), {} discarded, {} ignored",
        stats.messages, stats.triggers, stats.discarded, stats.ignored_triggers
    );

    Ok(())
}
