//! 29-bit callsign field codec
//!
//! A callsign field is a 28-bit integer plus a low-order portable (`/P`)
//! flag. Values 0..=2 are the literal tokens DE, QRZ and CQ; the value right
//! past the token-and-hash space is the `<...>` placeholder; everything above
//! decodes as a six-position mixed-radix integer with the area digit fixed at
//! position three.

use super::{PackError, UnpackError};

const CALL_TOKENS: [&str; 3] = ["DE", "QRZ", "CQ"];

/// Token count plus the 22-bit hash space, subtracted before the mixed-radix
/// field begins.
const NTOKENS_PLUS_MAX22: u32 = 2_063_592 + 4_194_304;

const SPACE_ALNUM: &str = " 0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const ALNUM: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
// indices past the digits read as blanks
const DIGIT_PAD: &str = "0123456789                 ";
const SPACE_ALPHA: &str = " ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// (alphabet, place value) for the six callsign positions.
const CALL_FIELDS: [(&str, u32); 6] = [
    (SPACE_ALNUM, 36 * 10 * 27 * 27 * 27),
    (ALNUM, 10 * 27 * 27 * 27),
    (DIGIT_PAD, 27 * 27 * 27),
    (SPACE_ALPHA, 27 * 27),
    (SPACE_ALPHA, 27),
    (SPACE_ALPHA, 1),
];

/// Decode one 29-bit callsign field.
pub fn decode_callsign(field: u32) -> Result<String, UnpackError> {
    let portable = field & 1 == 1;
    let call = field >> 1;
    if call < 3 {
        return Ok(CALL_TOKENS[call as usize].to_string());
    }
    let Some(mut n) = call.checked_sub(NTOKENS_PLUS_MAX22) else {
        // directed-CQ / hashed-call range, not assigned in this decoder
        return Err(UnpackError::BadCallsign { field });
    };
    if n == 0 {
        return Ok("<...>".to_string());
    }
    let mut chars = String::with_capacity(8);
    for (alphabet, div) in CALL_FIELDS {
        let idx = (n / div) as usize;
        n %= div;
        let c = alphabet
            .as_bytes()
            .get(idx)
            .copied()
            .ok_or(UnpackError::BadCallsign { field })?;
        chars.push(c as char);
    }
    let call = chars.trim().to_string();
    Ok(if portable { call + "/P" } else { call })
}

/// Encode a callsign string into its 29-bit field.
pub fn encode_callsign(call: &str) -> Result<u32, PackError> {
    let invalid = || PackError::InvalidCallsign { call: call.to_string() };

    if let Some(tok) = CALL_TOKENS.iter().position(|&t| t == call) {
        return Ok((tok as u32) << 1);
    }
    if call == "<...>" {
        return Ok(NTOKENS_PLUS_MAX22 << 1);
    }

    let (base, portable) = match call.strip_suffix("/P") {
        Some(base) => (base, 1),
        None => (call, 0),
    };
    if base.is_empty() || base.len() > 6 || !base.is_ascii() {
        return Err(invalid());
    }

    // one- or two-character prefixes put the area digit at position three
    let padded = if base.len() >= 2 && base.as_bytes()[1].is_ascii_digit() {
        format!(" {base:<5}")
    } else {
        format!("{base:<6}")
    };
    if padded.len() != 6 {
        return Err(invalid());
    }

    let mut n: u32 = 0;
    for (c, (alphabet, div)) in padded.chars().zip(CALL_FIELDS) {
        let idx = alphabet.find(c).ok_or_else(invalid)?;
        n += idx as u32 * div;
    }
    Ok(((n + NTOKENS_PLUS_MAX22) << 1) | portable)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_decode_in_either_field() {
        assert_eq!(decode_callsign(0).unwrap(), "DE");
        assert_eq!(decode_callsign(0b10).unwrap(), "QRZ");
        assert_eq!(decode_callsign(0b100).unwrap(), "CQ");
    }

    #[test]
    fn placeholder_callsign() {
        assert_eq!(decode_callsign(NTOKENS_PLUS_MAX22 << 1).unwrap(), "<...>");
        assert_eq!(encode_callsign("<...>").unwrap(), NTOKENS_PLUS_MAX22 << 1);
    }

    #[test]
    fn hash_range_has_no_decoding() {
        let field = 100 << 1; // between the tokens and the placeholder
        assert_eq!(
            decode_callsign(field),
            Err(UnpackError::BadCallsign { field })
        );
    }

    #[test]
    fn typical_callsigns_round_trip() {
        for call in ["K1ABC", "W9XYZ", "HB9CQK", "N0YPR", "G4AAA", "2E0ABC", "VK3JPK"] {
            let field = encode_callsign(call).unwrap();
            assert_eq!(decode_callsign(field).unwrap(), call, "callsign {call}");
        }
    }

    #[test]
    fn portable_flag_round_trips() {
        let field = encode_callsign("K1ABC/P").unwrap();
        assert_eq!(field & 1, 1);
        assert_eq!(decode_callsign(field).unwrap(), "K1ABC/P");
    }

    #[test]
    fn short_prefix_gets_leading_blank() {
        // K1ABC aligns its digit at position three, so position one is blank
        let n = (encode_callsign("K1ABC").unwrap() >> 1) - NTOKENS_PLUS_MAX22;
        assert_eq!(n / (36 * 10 * 27 * 27 * 27), 0);
    }

    #[test]
    fn malformed_callsigns_are_rejected() {
        for call in ["", "TOOLONGCALL", "k1abc!", "1234567"] {
            assert!(encode_callsign(call).is_err(), "callsign {call:?}");
        }
    }
}
