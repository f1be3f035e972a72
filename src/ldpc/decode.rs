//! LDPC belief-propagation decoder
//!
//! Sum-product decoding over the (83,174) parity-check graph, one iteration
//! at a time so the caller owns the outer schedule. LLR sign convention:
//! positive means bit 1.

use super::constants::{ADJ, M, MAX_NRW, N, NCW};

/// Piecewise linear approximation of atanh, capped at ±7.0.
///
/// Tuned for LDPC message passing rather than mathematical accuracy; the cap
/// keeps extrinsic magnitudes bounded when a check is near-certain.
#[inline]
fn platanh(x: f32) -> f32 {
    let isign = if x < 0.0 { -1.0 } else { 1.0 };
    let z = x.abs();

    if z <= 0.664 {
        x / 0.83
    } else if z <= 0.9217 {
        isign * (z - 0.4064) / 0.322
    } else if z <= 0.9951 {
        isign * (z - 0.8378) / 0.0524
    } else if z <= 0.9998 {
        isign * (z - 0.9914) / 0.0012
    } else {
        isign * 7.0
    }
}

/// Hard-decide `llr > 0 → 1` and count parity rows whose XOR-sum is odd.
///
/// Zero means the hard decision is a valid codeword.
pub fn count_unsatisfied(llr: &[f32; N]) -> usize {
    let adj = &*ADJ;
    (0..M)
        .filter(|&j| {
            let mut parity = 0u8;
            for i in 0..adj.nrw[j] {
                parity ^= (llr[adj.nm[j][i]] > 0.0) as u8;
            }
            parity == 1
        })
        .count()
}

/// One belief-propagation pass per `iterate` call.
///
/// Check→variable messages persist across calls, so feeding each returned
/// posterior back in continues the same decoding rather than restarting it.
pub struct LdpcDecoder {
    tov: [[f32; NCW]; N],
}

impl LdpcDecoder {
    pub fn new() -> Self {
        Self {
            tov: [[0.0; NCW]; N],
        }
    }

    /// Run one sum-product iteration over the posterior `llr`, returning the
    /// updated posterior and its unsatisfied-check count.
    pub fn iterate(&mut self, llr: &[f32; N]) -> ([f32; N], usize) {
        let adj = &*ADJ;

        // variable -> check: posterior minus this check's own contribution
        let mut toc = [[0.0f32; MAX_NRW]; M];
        for j in 0..M {
            for i in 0..adj.nrw[j] {
                let v = adj.nm[j][i];
                let k = adj.mn[v].iter().position(|&c| c == j).unwrap_or(0);
                toc[j][i] = llr[v] - self.tov[v][k];
            }
        }

        // check -> variable: 2·atanh(∏ tanh(m/2)) extrinsics
        let mut tov = [[0.0f32; NCW]; N];
        for (v, out) in tov.iter_mut().enumerate() {
            for (k, &j) in adj.mn[v].iter().enumerate() {
                let mut product = 1.0f32;
                for i in 0..adj.nrw[j] {
                    if adj.nm[j][i] != v {
                        product *= (-toc[j][i] / 2.0).tanh();
                    }
                }
                out[k] = 2.0 * platanh(-product);
            }
        }

        // posterior update: swap the old extrinsics for the new ones
        let mut posterior = [0.0f32; N];
        for v in 0..N {
            let old: f32 = self.tov[v].iter().sum();
            let new: f32 = tov[v].iter().sum();
            posterior[v] = llr[v] - old + new;
        }
        self.tov = tov;

        let ncheck = count_unsatisfied(&posterior);
        (posterior, ncheck)
    }
}

impl Default for LdpcDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ldpc::encode;

    fn known_codeword() -> [u8; N] {
        let word = u128::from_str_radix(
            concat!(
                "00000000010111100101100110000000010100100110110011100110110001100111110010001",
                "00001001100101"
            ),
            2,
        )
        .unwrap();
        encode(word)
    }

    fn to_llr(bits: &[u8; N], magnitude: f32) -> [f32; N] {
        let mut llr = [0.0f32; N];
        for (l, &b) in llr.iter_mut().zip(bits.iter()) {
            *l = if b == 1 { magnitude } else { -magnitude };
        }
        llr
    }

    #[test]
    fn valid_codeword_satisfies_all_checks() {
        let llr = to_llr(&known_codeword(), 4.0);
        assert_eq!(count_unsatisfied(&llr), 0);
    }

    #[test]
    fn single_bit_flip_breaks_three_checks() {
        let bits = known_codeword();
        for flip in 0..N {
            let mut llr = to_llr(&bits, 4.0);
            llr[flip] = -llr[flip];
            assert_eq!(count_unsatisfied(&llr), 3, "flip at {flip}");
        }
    }

    #[test]
    fn iteration_corrects_weak_bit_errors() {
        let bits = known_codeword();
        let mut llr = to_llr(&bits, 3.0);
        // two wrong bits held with low confidence
        llr[100] = 0.7;
        llr[120] = -0.7;
        if bits[100] == 1 {
            llr[100] = -0.7;
        }
        if bits[120] == 0 {
            llr[120] = 0.7;
        }

        let mut decoder = LdpcDecoder::new();
        let mut ncheck = count_unsatisfied(&llr);
        assert!(ncheck > 0);
        for _ in 0..12 {
            let (next, n) = decoder.iterate(&llr);
            llr = next;
            ncheck = n;
            if ncheck == 0 {
                break;
            }
        }
        assert_eq!(ncheck, 0);
        for (i, &b) in bits.iter().enumerate() {
            assert_eq!((llr[i] > 0.0) as u8, b, "bit {i}");
        }
    }
}
