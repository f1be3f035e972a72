//! 16-bit grid/report field codec
//!
//! The low 15 bits hold either a 4-character Maidenhead locator (< 32400),
//! one of the literal tokens blank/RRR/RR73/73, or a signal report offset by
//! 35. Bit 15 is the report-acknowledge `R` prefix.

use super::PackError;

/// First value past the Maidenhead range (18 * 18 * 10 * 10).
const MAXGRID4: u16 = 32400;

const GRID_TOKENS: [&str; 5] = ["", "", "RRR", "RR73", "73"];

/// Decode the 16-bit grid/report field.
pub fn decode_grid(field: u16) -> String {
    let g15 = field & 0x7FFF;
    if g15 < MAXGRID4 {
        let (a, rest) = (g15 / 1800, g15 % 1800);
        let (b, rest) = (rest / 100, rest % 100);
        let (c, d) = (rest / 10, rest % 10);
        return format!(
            "{}{}{}{}",
            (b'A' + a as u8) as char,
            (b'A' + b as u8) as char,
            c,
            d
        );
    }
    let r = g15 - MAXGRID4;
    if r <= 4 {
        return GRID_TOKENS[r as usize].to_string();
    }
    let snr = r as i16 - 35;
    let prefix = if field >> 15 != 0 { "R" } else { "" };
    format!("{prefix}{snr:+03}")
}

/// Encode a grid, report or token string into the 16-bit field.
pub fn encode_grid(grid: &str) -> Result<u16, PackError> {
    let invalid = || PackError::InvalidGrid { grid: grid.to_string() };

    match grid {
        "" => return Ok(MAXGRID4 + 1),
        "RRR" => return Ok(MAXGRID4 + 2),
        "RR73" => return Ok(MAXGRID4 + 3),
        "73" => return Ok(MAXGRID4 + 4),
        _ => {}
    }

    // signed signal report, optionally acknowledge-prefixed
    let (rest, ack) = match grid.strip_prefix('R') {
        Some(rest) if rest.starts_with(['+', '-']) => (rest, 0x8000u16),
        _ => (grid, 0),
    };
    if rest.starts_with(['+', '-']) {
        let snr: i16 = rest.parse().map_err(|_| invalid())?;
        if !(-30..=99).contains(&snr) {
            return Err(invalid());
        }
        return Ok(MAXGRID4 + (snr + 35) as u16 | ack);
    }

    // 4-character Maidenhead locator, AA00..RR99
    let b = grid.as_bytes();
    if b.len() == 4
        && (b'A'..=b'R').contains(&b[0])
        && (b'A'..=b'R').contains(&b[1])
        && b[2].is_ascii_digit()
        && b[3].is_ascii_digit()
    {
        let field = (b[0] - b'A') as u16 * 1800
            + (b[1] - b'A') as u16 * 100
            + (b[2] - b'0') as u16 * 10
            + (b[3] - b'0') as u16;
        return Ok(field);
    }
    Err(invalid())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maidenhead_grids_round_trip() {
        assert_eq!(encode_grid("FN42").unwrap(), 10342);
        assert_eq!(decode_grid(10342), "FN42");
        for grid in ["AA00", "RR99", "DM42", "JO01"] {
            assert_eq!(decode_grid(encode_grid(grid).unwrap()), grid);
        }
    }

    #[test]
    fn tokens_round_trip() {
        assert_eq!(decode_grid(32404), "73");
        for (field, token) in [(32402u16, "RRR"), (32403, "RR73"), (32404, "73")] {
            assert_eq!(decode_grid(field), token);
            assert_eq!(encode_grid(token).unwrap(), field);
        }
        assert_eq!(decode_grid(encode_grid("").unwrap()), "");
    }

    #[test]
    fn reports_round_trip_with_and_without_ack() {
        for snr in -30..=30 {
            let plain = format!("{snr:+03}");
            assert_eq!(decode_grid(encode_grid(&plain).unwrap()), plain);
            let acked = format!("R{snr:+03}");
            assert_eq!(decode_grid(encode_grid(&acked).unwrap()), acked);
        }
    }

    #[test]
    fn report_sign_formatting() {
        assert_eq!(decode_grid(MAXGRID4 + 40), "+05");
        assert_eq!(decode_grid(MAXGRID4 + 33), "-02");
        assert_eq!(decode_grid(0x8000 | (MAXGRID4 + 40)), "R+05");
    }

    #[test]
    fn junk_is_rejected() {
        for s in ["FN4", "fn42", "SA00", "+99 ", "R73", "XYZZY"] {
            assert!(encode_grid(s).is_err(), "grid {s:?}");
        }
    }
}
