//! WAV replay input
//!
//! Feeds a recorded file through the spectrogram writer one hop at a time,
//! sleeping between hops so the decode loop sees the same cadence as live
//! capture. The ring is marked finished at end of file.

use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use snafu::{ResultExt, Snafu};
use tracing::info;

use crate::spectrum::SpectrumWriter;

#[derive(Debug, Snafu)]
pub enum WavError {
    #[snafu(display("failed to open {path}: {source}"))]
    Open { path: String, source: hound::Error },

    #[snafu(display("{path}: expected 12 kHz mono 16-bit PCM, got {rate} Hz × {channels} ch × {bits} bit"))]
    Format {
        path: String,
        rate: u32,
        channels: u16,
        bits: u16,
    },
}

/// Start replaying `path` into the spectrogram from a background thread.
///
/// `hop_dt` is the pause between hops in seconds; pass 0 to replay at full
/// speed.
pub fn replay(
    path: &Path,
    mut writer: SpectrumWriter,
    hop_dt: f32,
) -> Result<thread::JoinHandle<()>, WavError> {
    let path_display = path.display().to_string();
    let reader = hound::WavReader::open(path).context(OpenSnafu { path: &path_display })?;
    let spec = reader.spec();
    if spec.sample_rate != 12_000
        || spec.channels != 1
        || spec.bits_per_sample != 16
        || spec.sample_format != hound::SampleFormat::Int
    {
        return Err(WavError::Format {
            path: path_display,
            rate: spec.sample_rate,
            channels: spec.channels,
            bits: spec.bits_per_sample,
        });
    }

    let samples: Vec<i16> = reader.into_samples::<i16>().filter_map(Result::ok).collect();
    info!(
        "replaying {path_display}: {:.1}s of audio",
        samples.len() as f32 / 12_000.0
    );

    let hop = writer.hop_samples();
    Ok(thread::spawn(move || {
        let mut hop_start = Instant::now();
        for chunk in samples.chunks(hop) {
            if hop_dt > 0.0 {
                let elapsed = hop_start.elapsed().as_secs_f32();
                if elapsed < hop_dt {
                    thread::sleep(Duration::from_secs_f32(hop_dt - elapsed));
                }
            }
            hop_start = Instant::now();
            writer.push_samples(chunk);
        }
        writer.ring().mark_finished();
    }))
}
