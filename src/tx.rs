//! Single-shot FT8 transmit synthesis
//!
//! Packs a three-field message through the full encode chain (payload →
//! CRC → LDPC → Gray-coded tones) and renders it as phase-continuous 8-FSK
//! at 12 kHz. One transmission covers a single cycle; scheduling across
//! cycles is out of scope.

use std::path::Path;

use snafu::{ResultExt, Snafu};

use crate::message::{self, PackError};
use crate::sigspec::{CHANNEL_SYMBOLS, SAMPLE_RATE};
use crate::{crc, ldpc, symbol};

/// Tone spacing in Hz (equals the symbol rate).
pub const TONE_SPACING: f32 = 6.25;

/// Symbol length in seconds.
pub const SYMBOL_SECONDS: f32 = 0.160;

/// Default audio base frequency in Hz.
pub const DEFAULT_BASE_FREQ: f32 = 1000.0;

#[derive(Debug, Snafu)]
pub enum TxError {
    #[snafu(display("message {msg:?} is not of the three-field form"))]
    BadMessage { msg: String },

    #[snafu(display("failed to pack message: {source}"))]
    Pack { source: PackError },

    #[snafu(display("failed to write WAV: {source}"))]
    WriteWav { source: hound::Error },
}

/// Encode a message string into its 79-tone channel sequence.
pub fn message_to_tones(msg: &str) -> Result<[u8; CHANNEL_SYMBOLS], TxError> {
    let upper = msg.trim().to_ascii_uppercase();
    let mut parts = upper.split_whitespace();
    let (Some(call_a), Some(call_b)) = (parts.next(), parts.next()) else {
        return Err(TxError::BadMessage {
            msg: msg.to_string(),
        });
    };
    let grid = parts.next().unwrap_or("");
    let bits77 = message::pack(call_a, call_b, grid).context(PackSnafu)?;
    let codeword = ldpc::encode(crc::append_crc(bits77));
    Ok(symbol::map(&codeword))
}

/// Render the tone sequence as phase-continuous 8-FSK PCM.
pub fn synthesize(tones: &[u8; CHANNEL_SYMBOLS], f_base: f32) -> Vec<i16> {
    let symbol_len = (SAMPLE_RATE as f32 * SYMBOL_SECONDS) as usize;
    let mut out = Vec::with_capacity(symbol_len * tones.len());
    let mut phase = 0.0f32;
    for &tone in tones.iter() {
        let freq = f_base + tone as f32 * TONE_SPACING;
        let phase_inc = std::f32::consts::TAU * freq / SAMPLE_RATE as f32;
        for _ in 0..symbol_len {
            out.push((0.5 * phase.sin() * 32767.0) as i16);
            phase = (phase + phase_inc) % std::f32::consts::TAU;
        }
    }
    out
}

/// Write a synthesised waveform to a 12 kHz mono WAV file.
pub fn write_wav(path: &Path, samples: &[i16]) -> Result<(), TxError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE as u32,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).context(WriteWavSnafu)?;
    for &s in samples {
        writer.write_sample(s).context(WriteWavSnafu)?;
    }
    writer.finalize().context(WriteWavSnafu)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sigspec::FT8;

    #[test]
    fn tones_carry_costas_arrays() {
        let tones = message_to_tones("CQ K1ABC FN42").unwrap();
        for base in [0, 36, 72] {
            assert_eq!(&tones[base..base + 7], &FT8.costas);
        }
        assert!(tones.iter().all(|&t| t < 8));
    }

    #[test]
    fn two_word_messages_pack_with_blank_grid() {
        assert!(message_to_tones("K1ABC W9XYZ").is_ok());
        assert!(message_to_tones("K1ABC").is_err());
    }

    #[test]
    fn waveform_has_one_cycle_of_symbols() {
        let tones = message_to_tones("CQ K1ABC FN42").unwrap();
        let wave = synthesize(&tones, DEFAULT_BASE_FREQ);
        assert_eq!(wave.len(), 79 * 1920);
        let peak = wave.iter().map(|&s| s.unsigned_abs()).max().unwrap();
        assert!(peak > 16000 && peak <= 16384, "peak {peak}");
    }
}
