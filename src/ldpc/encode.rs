//! LDPC(174,91) encoder
//!
//! Extends the 91-bit systematic word (77 payload + 14 CRC bits) to a
//! 174-bit codeword by appending 83 parity bits, each the GF(2) dot product
//! of one generator row with the word.

use super::constants::{GENERATOR, K, N};

/// Encode a 91-bit systematic word into a 174-bit codeword.
///
/// Bit 0 of the result is the first transmitted bit, i.e. the MSB of
/// `word91`.
pub fn encode(word91: u128) -> [u8; N] {
    let mut bits = [0u8; N];
    for (i, bit) in bits[..K].iter_mut().enumerate() {
        *bit = ((word91 >> (K - 1 - i)) & 1) as u8;
    }
    for (i, row) in GENERATOR.iter().enumerate() {
        bits[K + i] = ((row & word91).count_ones() & 1) as u8;
    }
    bits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_zero_word_encodes_to_all_zero_codeword() {
        assert!(encode(0).iter().all(|&b| b == 0));
    }

    #[test]
    fn known_message_matches_wsjtx_parity() {
        // "CQ SOTA N0YPR/R DM42" from ft8code: payload, CRC and parity
        let word = u128::from_str_radix(
            concat!(
                "00000000010111100101100110000000010100100110110011100110110001100111110010001",
                "00001001100101"
            ),
            2,
        )
        .unwrap();
        let expected_parity =
            "11100110011001101100100111100011101000010001100111111001100110001110011001011110010";
        let codeword = encode(word);
        for (i, c) in expected_parity.chars().enumerate() {
            assert_eq!(codeword[K + i], (c == '1') as u8, "parity bit {i}");
        }
        // systematic prefix is the word itself
        for i in 0..K {
            assert_eq!(codeword[i] as u128, (word >> (K - 1 - i)) & 1);
        }
    }
}
