//! FT8 signal parameters
//!
//! Protocol constants shared by every stage of the pipeline. An FT8 frame is
//! 79 symbols: three 7-symbol Costas arrays at positions 0, 36 and 72, with
//! 58 payload symbols in between.

/// Audio sample rate in Hz used throughout the receiver.
pub const SAMPLE_RATE: usize = 12_000;

/// Total channel symbols per FT8 frame.
pub const CHANNEL_SYMBOLS: usize = 79;

/// Payload symbols per frame (79 minus three Costas arrays).
pub const PAYLOAD_SYMBOLS: usize = 58;

/// Gray code mapping from 3-bit payload values to tones 0-7.
pub const GRAY_MAP: [u8; 8] = [0, 1, 3, 2, 5, 6, 4, 7];

/// Modulation constants for one FT8 transmission cycle.
#[derive(Debug, Clone, Copy)]
pub struct SignalSpec {
    /// Wall-clock length of one cycle in seconds.
    pub cycle_seconds: f64,
    /// Symbol rate in baud.
    pub symbols_per_sec: f32,
    /// 8-FSK alphabet size.
    pub tones_per_symbol: usize,
    /// Length of one Costas sync array.
    pub costas_len: usize,
    /// The Costas tone sequence, transmitted at symbol positions 0, 36, 72.
    pub costas: [u8; 7],
}

/// The FT8 mode: 15-second cycles, 6.25 baud, 8 tones.
pub const FT8: SignalSpec = SignalSpec {
    cycle_seconds: 15.0,
    symbols_per_sec: 6.25,
    tones_per_symbol: 8,
    costas_len: 7,
    costas: [3, 1, 4, 0, 6, 5, 2],
};

impl SignalSpec {
    /// Symbol indices that carry payload: 7..=35 and 43..=71.
    pub fn payload_symbol_idxs(&self) -> impl Iterator<Item = usize> {
        (7..36).chain(43..72)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_symbol_count_matches_frame_layout() {
        let idxs: Vec<usize> = FT8.payload_symbol_idxs().collect();
        assert_eq!(idxs.len(), PAYLOAD_SYMBOLS);
        // no payload symbol may fall inside a Costas array
        for i in idxs {
            assert!(!(0..7).contains(&i) && !(36..43).contains(&i) && !(72..79).contains(&i));
        }
    }

    #[test]
    fn gray_map_is_a_permutation() {
        let mut seen = [false; 8];
        for &t in GRAY_MAP.iter() {
            seen[t as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }
}
