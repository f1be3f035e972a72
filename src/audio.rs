//! Live audio input and output
//!
//! Device discovery matches every user keyword against the device name, the
//! way the CLI exposes it. The input stream callback owns the spectrogram
//! writer and runs on whatever thread the audio backend provides; it never
//! blocks and never allocates.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use snafu::{ResultExt, Snafu};
use tracing::{info, warn};

use crate::sigspec::SAMPLE_RATE;
use crate::spectrum::SpectrumWriter;

#[derive(Debug, Snafu)]
pub enum AudioError {
    #[snafu(display("no input device matching {keywords:?}"))]
    NoInputDevice { keywords: Vec<String> },

    #[snafu(display("no output device matching {keywords:?}"))]
    NoOutputDevice { keywords: Vec<String> },

    #[snafu(display("failed to enumerate audio devices: {source}"))]
    Devices { source: cpal::DevicesError },

    #[snafu(display("failed to open audio stream: {source}"))]
    BuildStream { source: cpal::BuildStreamError },

    #[snafu(display("failed to start audio stream: {source}"))]
    PlayStream { source: cpal::PlayStreamError },
}

fn mono_config() -> cpal::StreamConfig {
    cpal::StreamConfig {
        channels: 1,
        sample_rate: cpal::SampleRate(SAMPLE_RATE as u32),
        buffer_size: cpal::BufferSize::Default,
    }
}

fn name_matches(name: &str, keywords: &[String]) -> bool {
    keywords.iter().all(|k| name.contains(k.as_str()))
}

/// Find the capture device: the first input whose name contains every
/// keyword, or the host default when no keywords are given.
pub fn find_input_device(keywords: Option<&[String]>) -> Result<cpal::Device, AudioError> {
    let host = cpal::default_host();
    let Some(keywords) = keywords else {
        return host.default_input_device().ok_or(AudioError::NoInputDevice {
            keywords: Vec::new(),
        });
    };
    for device in host.input_devices().context(DevicesSnafu)? {
        if let Ok(name) = device.name() {
            if name_matches(&name, keywords) {
                info!("input device: {name}");
                return Ok(device);
            }
        }
    }
    Err(AudioError::NoInputDevice {
        keywords: keywords.to_vec(),
    })
}

/// Find the TX output device by the same keyword match.
pub fn find_output_device(keywords: &[String]) -> Result<cpal::Device, AudioError> {
    let host = cpal::default_host();
    for device in host.output_devices().context(DevicesSnafu)? {
        if let Ok(name) = device.name() {
            if name_matches(&name, keywords) {
                info!("output device: {name}");
                return Ok(device);
            }
        }
    }
    Err(AudioError::NoOutputDevice {
        keywords: keywords.to_vec(),
    })
}

/// Open a mono 12 kHz 16-bit capture stream feeding the spectrogram.
///
/// The returned stream must be kept alive for capture to continue.
pub fn start_capture(
    device: &cpal::Device,
    mut writer: SpectrumWriter,
) -> Result<cpal::Stream, AudioError> {
    let stream = device
        .build_input_stream(
            &mono_config(),
            move |data: &[i16], _: &cpal::InputCallbackInfo| writer.push_samples(data),
            |err| warn!("input stream error: {err}"),
            None,
        )
        .context(BuildStreamSnafu)?;
    stream.play().context(PlayStreamSnafu)?;
    Ok(stream)
}

/// Play a synthesised waveform to the output device, blocking until the
/// last sample has been consumed.
pub fn play_samples(device: &cpal::Device, samples: Vec<i16>) -> Result<(), AudioError> {
    let data = Arc::new(samples);
    let cursor = Arc::new(AtomicUsize::new(0));
    let finished = Arc::new(AtomicBool::new(false));

    let data_cb = Arc::clone(&data);
    let cursor_cb = Arc::clone(&cursor);
    let finished_cb = Arc::clone(&finished);

    let stream = device
        .build_output_stream(
            &mono_config(),
            move |out: &mut [i16], _: &cpal::OutputCallbackInfo| {
                for sample in out.iter_mut() {
                    let pos = cursor_cb.fetch_add(1, Ordering::Relaxed);
                    if pos < data_cb.len() {
                        *sample = data_cb[pos];
                    } else {
                        *sample = 0;
                        finished_cb.store(true, Ordering::Release);
                    }
                }
            },
            |err| warn!("output stream error: {err}"),
            None,
        )
        .context(BuildStreamSnafu)?;
    stream.play().context(PlayStreamSnafu)?;

    while !finished.load(Ordering::Acquire) {
        std::thread::sleep(Duration::from_millis(10));
    }
    // let the device drain its last buffer
    std::thread::sleep(Duration::from_millis(50));
    drop(stream);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_match_requires_every_keyword() {
        let kw = |s: &[&str]| s.iter().map(|k| k.to_string()).collect::<Vec<_>>();
        assert!(name_matches("USB Audio CODEC", &kw(&["USB", "CODEC"])));
        assert!(!name_matches("USB Audio CODEC", &kw(&["USB", "IC-7300"])));
        assert!(name_matches("anything", &kw(&[])));
    }
}
