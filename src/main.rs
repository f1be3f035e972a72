//! Command-line FT8 receiver
//!
//! Launches the receive pipeline against a live input device or a replayed
//! WAV file and prints decodes as they arrive. With `--transmit` it instead
//! queues a single-cycle transmission (or renders it to a WAV file when no
//! output device is configured).

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use ft8rx::cycle::{CycleConfig, CycleManager, TX_MESSAGE_FILE};
use ft8rx::{tracing_init, tx, DecodeEvent, FT8};

#[derive(Parser)]
#[command(name = "ft8rx", about = "Command-line FT8 receiver")]
struct Args {
    /// Comma-separated keywords identifying the input sound device
    #[arg(short, long)]
    input: Option<String>,

    /// Comma-separated keywords identifying the output sound device (TX)
    #[arg(short, long)]
    output: Option<String>,

    /// Replay a 12 kHz mono WAV file instead of live capture
    #[arg(short, long)]
    wav: Option<PathBuf>,

    /// Lower edge of the search passband in Hz
    #[arg(long, default_value_t = 200.0)]
    fmin: f32,

    /// Upper edge of the search passband in Hz
    #[arg(long, default_value_t = 3100.0)]
    fmax: f32,

    /// Queue a message for transmission on the next cycle
    #[arg(short = 't', long)]
    transmit: Option<String>,

    /// WAV file to render when transmitting without an output device
    #[arg(long, default_value = "ft8rx_tx.wav")]
    wave_output: PathBuf,

    /// One line per decode instead of the full record
    #[arg(short, long)]
    concise: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn split_keywords(arg: Option<String>) -> Option<Vec<String>> {
    arg.map(|s| s.replace(' ', "").split(',').map(str::to_string).collect())
}

fn print_decode(event: &DecodeEvent, concise: bool) {
    if concise {
        println!(
            "{} {} {:.2} {} ~ {}",
            event.cycle_start, event.snr_db, event.dt, event.freq_hz, event.msg
        );
    } else {
        println!("{event:?}");
    }
}

fn transmit(args: &Args) -> ExitCode {
    let msg = args.transmit.as_deref().unwrap_or_default();
    if args.output.is_some() {
        // a running receiver instance picks the file up at its next rollover
        let body = format!("{msg}\n");
        if let Err(e) = std::fs::write(TX_MESSAGE_FILE, body) {
            eprintln!("cannot queue transmission: {e}");
            return ExitCode::FAILURE;
        }
        println!("queued {msg:?} for the next cycle");
        return ExitCode::SUCCESS;
    }
    match tx::message_to_tones(msg) {
        Ok(tones) => {
            let samples = tx::synthesize(&tones, tx::DEFAULT_BASE_FREQ);
            if let Err(e) = tx::write_wav(&args.wave_output, &samples) {
                eprintln!("cannot write {}: {e}", args.wave_output.display());
                return ExitCode::FAILURE;
            }
            println!(
                "wrote {} with message {msg:?}",
                args.wave_output.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("cannot encode {msg:?}: {e}");
            ExitCode::FAILURE
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    tracing_init::init(args.verbose);

    if args.transmit.is_some() {
        return transmit(&args);
    }

    let config = CycleConfig {
        freq_range: (args.fmin, args.fmax),
        input_keywords: split_keywords(args.input.clone()),
        output_keywords: split_keywords(args.output.clone()),
        wav_input: args.wav.clone(),
        ..CycleConfig::default()
    };

    let concise = args.concise;
    let manager = match CycleManager::new(
        FT8,
        config,
        Box::new(move |event| print_decode(event, concise)),
        None,
    ) {
        Ok(manager) => manager,
        Err(e) => {
            eprintln!("ft8rx: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = ctrlc::set_handler(|| {
        println!("\nstopping");
        std::process::exit(0);
    }) {
        eprintln!("ft8rx: cannot install signal handler: {e}");
        return ExitCode::FAILURE;
    }

    println!("ft8rx running, Ctrl-C to stop");
    manager.run();
    ExitCode::SUCCESS
}
