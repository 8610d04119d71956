//! Costas Loop Simulator
//!
//! Generate BPSK with a residual carrier offset, run it through the float or
//! fixed-point Costas loop and report how the loop settles.
//!
//! Usage:
//!   costas_sim [OPTIONS]
//!
//! Options:
//!   -n, --samples <N>     Number of samples (default: 250)
//!   -f, --freq <Hz>       Carrier offset in Hz (default: 300)
//!   -r, --rate <Hz>       Sample rate in Hz (default: 19000)
//!   -a, --alpha <gain>    Proportional gain (default: 0.5)
//!   -b, --beta <gain>     Integral gain (default: 0.02)
//!   --sps <N>             Samples per symbol (default: 1)
//!   --noise <sigma>       Noise standard deviation on I and Q (default: 0)
//!   --seed <N>            RNG seed (default: 0)
//!   --fixed               Use the fixed-point loop
//!   -o, --output <file>   Write corrected IQ as a stereo 16-bit WAV
//!   -v, --verbose         More log output (repeat for more)
//!   -h, --help            Show this help message
//!
//! Examples:
//!   costas_sim -n 2000 --fixed -o corrected.wav
//!   costas_sim -f -150 --noise 0.1

use rustyrx::costas::{CarrierLoop, CostasConfig, CostasLoop, CostasOutput, FixedCostasLoop};
use rustyrx::cordic::HARDWARE_ITERATIONS;
use rustyrx::fixed::{ComplexSample, FixedFormat};
use rustyrx::iq_file::write_iq_wav;
use rustyrx::signal::{BpskConfig, BpskGenerator};
use rustyrx::tracing_init::{init_tracing, Verbosity};

struct SimConfig {
    verbosity: Verbosity,
    signal: BpskConfig,
    alpha: f64,
    beta: f64,
    fixed: bool,
    output_path: Option<String>,
}

fn parse_value<T: std::str::FromStr>(args: &[String], i: usize, name: &str) -> Result<T, String> {
    let value = args
        .get(i)
        .ok_or_else(|| format!("Missing value for {}", name))?;
    value
        .parse()
        .map_err(|_| format!("Invalid value for {}: {}", name, value))
}

impl SimConfig {
    fn parse_args() -> Result<Self, String> {
        let args: Vec<String> = std::env::args().collect();

        let mut signal = BpskConfig {
            num_samples: 250,
            start_index: 300,
            ..BpskConfig::default()
        };
        let mut alpha = 0.5;
        let mut beta = 0.02;
        let mut fixed = false;
        let mut output_path = None;

        let mut verbose = 0;
        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "-n" | "--samples" => {
                    i += 1;
                    signal.num_samples = parse_value(&args, i, "--samples")?;
                }
                "-f" | "--freq" => {
                    i += 1;
                    signal.freq_offset = parse_value(&args, i, "--freq")?;
                }
                "-r" | "--rate" => {
                    i += 1;
                    signal.sample_rate = parse_value(&args, i, "--rate")?;
                }
                "-a" | "--alpha" => {
                    i += 1;
                    alpha = parse_value(&args, i, "--alpha")?;
                }
                "-b" | "--beta" => {
                    i += 1;
                    beta = parse_value(&args, i, "--beta")?;
                }
                "--sps" => {
                    i += 1;
                    signal.samples_per_symbol = parse_value(&args, i, "--sps")?;
                }
                "--noise" => {
                    i += 1;
                    signal.noise_std = parse_value(&args, i, "--noise")?;
                }
                "--seed" => {
                    i += 1;
                    signal.seed = parse_value(&args, i, "--seed")?;
                }
                "--fixed" => fixed = true,
                "-o" | "--output" => {
                    i += 1;
                    output_path = Some(parse_value(&args, i, "--output")?);
                }
                "-v" | "--verbose" => verbose += 1,
                "-vv" => verbose += 2,
                "-vvv" => verbose += 3,
                "-h" | "--help" => {
                    print_help(&args[0]);
                    std::process::exit(0);
                }
                arg => return Err(format!("Unknown option: {}", arg)),
            }
            i += 1;
        }

        Ok(SimConfig {
            verbosity: Verbosity::from_count(verbose),
            signal,
            alpha,
            beta,
            fixed,
            output_path,
        })
    }
}

fn print_help(program: &str) {
    eprintln!("Costas Loop Simulator");
    eprintln!();
    eprintln!("Usage: {} [OPTIONS]", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -n, --samples <N>     Number of samples (default: 250)");
    eprintln!("  -f, --freq <Hz>       Carrier offset in Hz (default: 300)");
    eprintln!("  -r, --rate <Hz>       Sample rate in Hz (default: 19000)");
    eprintln!("  -a, --alpha <gain>    Proportional gain (default: 0.5)");
    eprintln!("  -b, --beta <gain>     Integral gain (default: 0.02)");
    eprintln!("  --sps <N>             Samples per symbol (default: 1)");
    eprintln!("  --noise <sigma>       Noise standard deviation (default: 0)");
    eprintln!("  --seed <N>            RNG seed (default: 0)");
    eprintln!("  --fixed               Use the fixed-point loop");
    eprintln!("  -o, --output <file>   Write corrected IQ as a stereo WAV");
    eprintln!("  -v, --verbose         More log output (repeat for more)");
    eprintln!("  -h, --help            Show this help message");
}

/// Per-step phase increment actually applied, frequency + alpha · error
fn phase_increments<S>(outputs: &[CostasOutput<S>], alpha: f64) -> impl Iterator<Item = f64> + '_ {
    outputs.iter().map(move |o| o.frequency + alpha * o.error)
}

fn main() -> Result<(), String> {
    let config = SimConfig::parse_args()?;
    init_tracing(config.verbosity);

    let loop_config = CostasConfig::new(config.alpha, config.beta).map_err(|e| e.to_string())?;
    let generator = BpskGenerator::new(config.signal.clone()).map_err(|e| e.to_string())?;

    println!("Costas Loop Simulator");
    println!("=====================");
    println!("Samples:      {}", config.signal.num_samples);
    println!("Offset:       {:.1} Hz @ {:.0} Hz", config.signal.freq_offset, config.signal.sample_rate);
    println!("Gains:        alpha = {}, beta = {}", config.alpha, config.beta);
    println!("Loop:         {}", if config.fixed { "fixed-point" } else { "float" });
    println!();

    let (outputs, corrected): (Vec<CostasOutput<()>>, Vec<ComplexSample>) = if config.fixed {
        let mut costas = FixedCostasLoop::new(loop_config, HARDWARE_ITERATIONS)
            .map_err(|e| e.to_string())?;
        let samples: Vec<ComplexSample> = generator.quantized(FixedFormat::IQ16).collect();
        CarrierLoop::process(&mut costas, &samples)
            .into_iter()
            .map(|o| (strip(&o), o.corrected))
            .unzip()
    } else {
        let mut costas = CostasLoop::new(loop_config);
        let samples: Vec<_> = generator.collect();
        CarrierLoop::process(&mut costas, &samples)
            .into_iter()
            .map(|o| (strip(&o), ComplexSample::from_complex(o.corrected, FixedFormat::IQ16)))
            .unzip()
    };

    for (n, (out, sample)) in outputs.iter().zip(corrected.iter()).take(5).enumerate() {
        println!(
            "{:>3}: I = {:>6} Q = {:>6}  error = {:+.6}  freq = {:+.6}  phase = {:.6}",
            n,
            sample.i.raw(),
            sample.q.raw(),
            out.error,
            out.frequency,
            out.phase
        );
    }

    let max_step = phase_increments(&outputs, config.alpha)
        .map(f64::abs)
        .fold(0.0, f64::max);
    if let Some(last) = outputs.last() {
        let expected = 2.0 * std::f64::consts::PI * config.signal.freq_offset / config.signal.sample_rate;
        println!();
        println!("Final frequency:  {:+.6} rad/sample (offset = {:+.6})", last.frequency, expected);
        println!("Final error:      {:+.3e}", last.error);
    }
    println!("Max change in phase in one step: {:.6} rad", max_step);

    if let Some(path) = config.output_path {
        write_iq_wav(&path, &corrected, config.signal.sample_rate as u32).map_err(|e| e.to_string())?;
        println!("Wrote {} corrected samples to {}", corrected.len(), path);
    }

    Ok(())
}

fn strip<S>(output: &CostasOutput<S>) -> CostasOutput<()> {
    CostasOutput {
        corrected: (),
        error: output.error,
        frequency: output.frequency,
        phase: output.phase,
    }
}
