//! Codeword to channel-symbol mapping
//!
//! An FT8 frame is S7 D29 S7 D29 S7: three Costas arrays around two 29-symbol
//! data blocks. Each data symbol carries three codeword bits, Gray-coded onto
//! tones 0-7.

use crate::sigspec::{CHANNEL_SYMBOLS, FT8, GRAY_MAP, PAYLOAD_SYMBOLS};

/// Map a 174-bit codeword onto the 79-tone channel sequence.
pub fn map(codeword: &[u8; 174]) -> [u8; CHANNEL_SYMBOLS] {
    let mut symbols = [0u8; CHANNEL_SYMBOLS];
    symbols[0..7].copy_from_slice(&FT8.costas);
    symbols[36..43].copy_from_slice(&FT8.costas);
    symbols[72..79].copy_from_slice(&FT8.costas);

    let mut k = 7;
    for j in 0..PAYLOAD_SYMBOLS {
        if j == 29 {
            k = 43; // hop over the middle Costas array
        }
        let value = codeword[3 * j] << 2 | codeword[3 * j + 1] << 1 | codeword[3 * j + 2];
        symbols[k] = GRAY_MAP[value as usize];
        k += 1;
    }
    symbols
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn costas_arrays_at_frame_positions() {
        let symbols = map(&[0u8; 174]);
        for base in [0, 36, 72] {
            assert_eq!(&symbols[base..base + 7], &FT8.costas);
        }
    }

    #[test]
    fn zero_codeword_maps_to_tone_zero_payload() {
        let symbols = map(&[0u8; 174]);
        for s in FT8.payload_symbol_idxs() {
            assert_eq!(symbols[s], 0);
        }
    }

    #[test]
    fn bit_triples_gray_code_onto_tones() {
        let mut codeword = [0u8; 174];
        // first payload symbol carries bits 0..3: value 0b101 -> tone 6
        codeword[0] = 1;
        codeword[2] = 1;
        // last payload symbol carries bits 171..174: value 0b011 -> tone 2
        codeword[172] = 1;
        codeword[173] = 1;
        let symbols = map(&codeword);
        assert_eq!(symbols[7], GRAY_MAP[0b101]);
        assert_eq!(symbols[71], GRAY_MAP[0b011]);
    }
}
