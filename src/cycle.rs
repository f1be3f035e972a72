//! Cycle manager
//!
//! Owns all decode state and schedules the pipeline across 15-second FT8
//! cycles: at each rollover the spectrogram pointer is rewound (and a queued
//! transmission serviced); at the search point (~11 s into the cycle) the
//! previous candidate batch is summarised and a fresh search launched. In
//! between, the manager polls the write pointer, demapping each candidate as
//! soon as its frame has fully arrived and decoding the most promising ones
//! first.

use std::collections::HashSet;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use snafu::Snafu;
use tracing::{debug, info, warn};

use crate::audio::{self, AudioError};
use crate::candidate::{Candidate, DecodeEvent, DecodeParams};
use crate::sigspec::SignalSpec;
use crate::spectrum::{self, SpectrumParams, SpectrumRing};
use crate::sync;
use crate::timesource::TimeSource;
use crate::tx;
use crate::wav::{self, WavError};

/// Transmission trigger file: line 1 the message, optional line 2 the base
/// frequency in Hz. Consumed (deleted) at the cycle rollover.
pub const TX_MESSAGE_FILE: &str = "PyFT8_tx_msg.txt";

/// Cycle phase at which search-and-decode starts, seconds after rollover.
const SEARCH_PHASE_SECONDS: f64 = 11.0;

#[derive(Debug, Snafu)]
pub enum StartError {
    #[snafu(display("invalid passband {fmin}..{fmax} Hz"))]
    BadFreqRange { fmin: f32, fmax: f32 },

    #[snafu(display("{source}"), context(false))]
    Audio { source: AudioError },

    #[snafu(display("{source}"), context(false))]
    Wav { source: WavError },
}

/// Receiver configuration.
#[derive(Debug, Clone)]
pub struct CycleConfig {
    /// Audio passband searched for signals, Hz.
    pub freq_range: (f32, f32),
    /// Input device keywords; `None` selects the host default device.
    pub input_keywords: Option<Vec<String>>,
    /// Output device keywords for TX; `None` disables transmission.
    pub output_keywords: Option<Vec<String>>,
    /// Replay this WAV instead of opening a live stream.
    pub wav_input: Option<PathBuf>,
    pub decode: DecodeParams,
    /// Decode budget per 1 ms poll round.
    pub max_decodes_per_round: usize,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            freq_range: (200.0, 3100.0),
            input_keywords: None,
            output_keywords: None,
            wav_input: None,
            decode: DecodeParams::default(),
            max_decodes_per_round: 35,
        }
    }
}

/// End-of-cycle accounting passed to the `on_finished` callback.
#[derive(Debug, Clone)]
pub struct CycleSummary {
    /// Candidates whose frame never completed before the batch was dropped.
    pub n_unfinished: usize,
    /// Spectrogram bin width in Hz.
    pub spec_df: f32,
}

pub type DecodeCallback = Box<dyn FnMut(&DecodeEvent) + Send>;
pub type FinishedCallback = Box<dyn FnMut(&CycleSummary) + Send>;

pub struct CycleManager {
    spec: SignalSpec,
    ring: std::sync::Arc<SpectrumRing>,
    time: TimeSource,
    f0_idxs: Range<usize>,
    params: DecodeParams,
    max_decodes_per_round: usize,
    on_decode: DecodeCallback,
    on_finished: Option<FinishedCallback>,
    output_device: Option<cpal::Device>,
    live: bool,
    // capture stays alive exactly as long as the manager
    _capture: Option<cpal::Stream>,
    _replay: Option<thread::JoinHandle<()>>,
}

impl CycleManager {
    /// Open the configured input, build the spectrogram and wire the decode
    /// pipeline. Configuration problems surface here; `run` itself cannot
    /// fail.
    pub fn new(
        spec: SignalSpec,
        config: CycleConfig,
        on_decode: DecodeCallback,
        on_finished: Option<FinishedCallback>,
    ) -> Result<Self, StartError> {
        let (fmin, fmax) = config.freq_range;
        if !(0.0 < fmin && fmin < fmax && fmax < crate::sigspec::SAMPLE_RATE as f32 / 2.0) {
            return Err(StartError::BadFreqRange { fmin, fmax });
        }

        let (writer, ring) = spectrum::build(
            &spec,
            SpectrumParams {
                max_freq: fmax,
                ..SpectrumParams::default()
            },
        );

        let f0_lo = (fmin / ring.df) as usize;
        let f0_hi = (ring.n_freqs - ring.fbins_per_signal).min((fmax / ring.df) as usize);
        if f0_lo >= f0_hi {
            return Err(StartError::BadFreqRange { fmin, fmax });
        }

        let output_device = match &config.output_keywords {
            Some(keywords) => Some(audio::find_output_device(keywords)?),
            None => None,
        };

        let (time, capture, replay, live) = match &config.wav_input {
            Some(path) => {
                let time = TimeSource::replay(spec.cycle_seconds);
                let handle = wav::replay(path, writer, ring.dt)?;
                (time, None, Some(handle), false)
            }
            None => {
                let device = audio::find_input_device(config.input_keywords.as_deref())?;
                let stream = audio::start_capture(&device, writer)?;
                (TimeSource::live(spec.cycle_seconds), Some(stream), None, true)
            }
        };

        Ok(Self {
            spec,
            ring,
            time,
            f0_idxs: f0_lo..f0_hi,
            params: config.decode,
            max_decodes_per_round: config.max_decodes_per_round,
            on_decode,
            on_finished,
            output_device,
            live,
            _capture: capture,
            _replay: replay,
        })
    }

    /// Run the decode loop on the calling thread.
    ///
    /// Live operation runs until the process is interrupted; WAV replay
    /// returns after the file has drained and the final batch has been
    /// flushed.
    pub fn run(mut self) {
        if self.live {
            let delay = self.time.seconds_to_rollover();
            info!("waiting {delay:.1}s for cycle rollover");
            thread::sleep(Duration::from_secs_f64(delay));
        }

        let mut rollover = self.time.ticker(0.0);
        let mut search_tick = self.time.ticker(SEARCH_PHASE_SECONDS);
        let mut candidates: Vec<Candidate> = Vec::new();
        let mut emitted: HashSet<String> = HashSet::new();

        self.ring.reset_ptr();
        let mut prev_ptr = 0;

        while !self.ring.is_finished() {
            thread::sleep(Duration::from_millis(1));
            let ptr = self.ring.write_ptr();
            self.service_candidates(&mut candidates, &mut emitted, ptr as i32);

            if ptr != prev_ptr {
                prev_ptr = ptr;
                if self.time.check(&mut rollover) {
                    debug!("rollover detected at {:.2}", self.time.cycle_time());
                    self.check_for_tx();
                    self.ring.reset_ptr();
                }
                if self.time.check(&mut search_tick) {
                    self.summarise(&candidates);
                    let cycle_start = self.time.cycle_start_str(self.time.now());
                    candidates =
                        sync::search(&self.spec, &self.ring, self.f0_idxs.clone(), &cycle_start);
                    info!(
                        "search at hop {ptr}: {} candidates in {:?}",
                        candidates.len(),
                        self.f0_idxs
                    );
                }
            }
        }

        // end of replay: drain whatever the last cycle left in flight. Every
        // serviced round completes its whole decode budget, so this settles.
        loop {
            self.service_candidates(&mut candidates, &mut emitted, i32::MAX);
            if candidates
                .iter()
                .all(|c| c.llr_sd <= 0.0 || c.decode_completed())
            {
                break;
            }
        }
        self.summarise(&candidates);
    }

    /// Demap candidates whose frame has fully arrived, then decode the most
    /// promising pending ones and emit fresh messages.
    fn service_candidates(
        &mut self,
        candidates: &mut [Candidate],
        emitted: &mut HashSet<String>,
        ptr: i32,
    ) {
        for c in candidates.iter_mut() {
            if ptr > c.last_payload_hop && !c.demap_started() {
                c.demap(&self.ring, &self.params);
            }
        }

        let mut pending: Vec<&mut Candidate> = candidates
            .iter_mut()
            .filter(|c| c.llr_sd > 0.0 && !c.decode_completed())
            .collect();
        pending.sort_by(|a, b| b.llr_sd.total_cmp(&a.llr_sd));
        if pending.len() > self.max_decodes_per_round {
            debug!(
                deferred = pending.len() - self.max_decodes_per_round,
                "decode round over budget"
            );
        }
        for c in pending.into_iter().take(self.max_decodes_per_round) {
            c.decode(&self.params);
        }

        let td = self.time.now() % 60.0;
        for c in candidates.iter() {
            if let Some(msg) = &c.message {
                let key = format!("{} {msg}", c.cycle_start);
                if emitted.insert(key) {
                    (self.on_decode)(&c.to_event(msg, td));
                }
            }
        }
    }

    fn summarise(&mut self, candidates: &[Candidate]) {
        let unfinished = candidates.iter().filter(|c| !c.decode_completed()).count();
        let decoded = candidates.iter().filter(|c| c.message.is_some()).count();
        let failed = candidates.len() - unfinished - decoded;
        if !candidates.is_empty() {
            info!("cycle done: {decoded} decodes, {failed} failures, {unfinished} unfinished");
        }
        if let Some(on_finished) = &mut self.on_finished {
            on_finished(&CycleSummary {
                n_unfinished: unfinished,
                spec_df: self.ring.df,
            });
        }
    }

    /// Service the TX trigger file at a cycle rollover.
    fn check_for_tx(&mut self) {
        let path = Path::new(TX_MESSAGE_FILE);
        if !path.exists() {
            return;
        }
        let Some(device) = &self.output_device else {
            warn!("TX message file found but no output device configured");
            return;
        };
        let Ok(content) = fs::read_to_string(path) else {
            warn!("TX message file is unreadable");
            return;
        };
        let mut lines = content.lines();
        let msg = lines.next().unwrap_or("").trim().to_string();
        let f_base = lines
            .next()
            .and_then(|l| l.trim().parse::<f32>().ok())
            .unwrap_or(tx::DEFAULT_BASE_FREQ);
        let _ = fs::remove_file(path);

        match tx::message_to_tones(&msg) {
            Ok(tones) => {
                info!("transmitting {msg:?} at {f_base} Hz");
                let samples = tx::synthesize(&tones, f_base);
                if let Err(e) = audio::play_samples(device, samples) {
                    warn!("transmission failed: {e}");
                } else {
                    info!("done transmitting");
                }
            }
            Err(e) => warn!("cannot transmit {msg:?}: {e}"),
        }
    }
}
