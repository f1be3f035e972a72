//! FT8 77-bit payload packing and unpacking
//!
//! Implements the standard three-field QSO form (message types i3 = 1 and 2):
//! two 29-bit callsign fields, a 16-bit grid/report field and the 3-bit type
//! tag. Fields are extracted from the payload LSB first, so i3 occupies the
//! last three transmitted bits.

mod callsign;
mod grid;

pub use callsign::{decode_callsign, encode_callsign};
pub use grid::{decode_grid, encode_grid};

use std::fmt;

use snafu::Snafu;

/// Why a CRC-clean payload still failed to unpack.
#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum UnpackError {
    /// Only the standard QSO forms are handled here.
    #[snafu(display("unsupported message type i3={i3}"))]
    UnsupportedType { i3: u8 },

    /// The callsign integer falls in a range with no assigned decoding.
    #[snafu(display("callsign field {field} has no decoding"))]
    BadCallsign { field: u32 },
}

/// Why a message string could not be packed.
#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum PackError {
    #[snafu(display("callsign {call:?} does not fit the standard grammar"))]
    InvalidCallsign { call: String },

    #[snafu(display("grid/report {grid:?} does not fit any field encoding"))]
    InvalidGrid { grid: String },
}

/// A decoded three-field FT8 message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub call_a: String,
    pub call_b: String,
    pub grid: String,
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // the grid field is blank in two-word messages
        if self.grid.is_empty() {
            write!(f, "{} {}", self.call_a, self.call_b)
        } else {
            write!(f, "{} {} {}", self.call_a, self.call_b, self.grid)
        }
    }
}

fn take(bits: &mut u128, n: u32) -> u128 {
    let v = *bits & ((1 << n) - 1);
    *bits >>= n;
    v
}

/// Unpack a 77-bit payload into its three fields.
pub fn unpack(bits77: u128) -> Result<Message, UnpackError> {
    let mut bits = bits77;
    let i3 = take(&mut bits, 3) as u8;
    let grid = take(&mut bits, 16) as u16;
    let call_b = take(&mut bits, 29) as u32;
    let call_a = take(&mut bits, 29) as u32;
    if i3 != 1 && i3 != 2 {
        return Err(UnpackError::UnsupportedType { i3 });
    }
    Ok(Message {
        call_a: decode_callsign(call_a)?,
        call_b: decode_callsign(call_b)?,
        grid: decode_grid(grid),
    })
}

/// Pack a three-field message into a 77-bit payload (i3 = 1).
pub fn pack(call_a: &str, call_b: &str, grid: &str) -> Result<u128, PackError> {
    let a = encode_callsign(call_a)? as u128;
    let b = encode_callsign(call_b)? as u128;
    let g = encode_grid(grid)? as u128;
    Ok((((a << 29 | b) << 16) | g) << 3 | 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_cq_round_trips() {
        let bits = pack("CQ", "K1ABC", "FN42").unwrap();
        let msg = unpack(bits).unwrap();
        assert_eq!(msg.call_a, "CQ");
        assert_eq!(msg.call_b, "K1ABC");
        assert_eq!(msg.grid, "FN42");
        assert_eq!(msg.to_string(), "CQ K1ABC FN42");
    }

    #[test]
    fn report_exchange_round_trips() {
        for grid in ["-15", "R+03", "RR73", "73"] {
            let bits = pack("K1ABC", "W9XYZ/P", grid).unwrap();
            let msg = unpack(bits).unwrap();
            assert_eq!(msg.call_a, "K1ABC");
            assert_eq!(msg.call_b, "W9XYZ/P");
            assert_eq!(msg.grid, grid);
        }
    }

    #[test]
    fn i3_field_sits_in_low_bits() {
        let bits = pack("CQ", "K1ABC", "FN42").unwrap();
        assert_eq!(bits & 0b111, 1);
    }

    #[test]
    fn non_standard_types_are_rejected() {
        // same fields but i3 = 0 (free text / telemetry family)
        let bits = pack("CQ", "K1ABC", "FN42").unwrap() & !0b111;
        assert_eq!(unpack(bits), Err(UnpackError::UnsupportedType { i3: 0 }));
    }

    #[test]
    fn type2_unpacks_like_type1() {
        let bits = (pack("CQ", "K1ABC", "FN42").unwrap() & !0b111) | 2;
        assert_eq!(unpack(bits).unwrap().call_b, "K1ABC");
    }
}
