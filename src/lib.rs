//! ft8rx: real-time FT8 receiver
//!
//! A 12 kHz PCM stream flows through a rolling spectrogram, a Costas-array
//! sync search, an 8-FSK soft demapper, LDPC(174,91) belief propagation and
//! a CRC-checked payload unpack, scheduled across 15-second cycles by the
//! cycle manager.

pub mod audio;
pub mod candidate;
pub mod crc;
pub mod cycle;
pub mod ldpc;
pub mod message;
pub mod sigspec;
pub mod spectrum;
pub mod symbol;
pub mod sync;
pub mod timesource;
pub mod tracing_init;
pub mod tx;
pub mod wav;

pub use candidate::{Candidate, DecodeEvent, DecodeParams};
pub use cycle::{CycleConfig, CycleManager, CycleSummary, StartError};
pub use message::Message;
pub use sigspec::{SignalSpec, FT8};
