//! Costas-array synchronisation search
//!
//! Scans every frequency bin of the passband for the middle Costas array,
//! scoring candidate start offsets by correlation against a zero-mean tone
//! template. Every bin yields a candidate; pruning happens later at the LLR
//! gate and the per-round decode cap.

use std::ops::Range;

use tracing::trace;

use crate::candidate::Candidate;
use crate::sigspec::SignalSpec;
use crate::spectrum::SpectrumRing;

/// Best start offset found for one frequency bin.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncPoint {
    /// Hop row of the frame start within the cycle.
    pub h0_idx: i32,
    /// Correlation against the Costas template.
    pub score: f32,
    /// Start offset in seconds relative to the nominal frame start.
    pub dt: f32,
}

/// Flattened 7 × fbins_per_signal Costas correlation template: +1 on the
/// tone bins, a balancing negative weight elsewhere, zero past the band the
/// seven Costas tones can occupy.
pub(crate) fn costas_template(spec: &SignalSpec, ring: &SpectrumRing) -> Vec<f32> {
    let bpt = ring.fbins_per_tone;
    let width = ring.fbins_per_signal;
    let off_tone = -(bpt as f32) / (width - bpt) as f32;
    let mut csync = vec![off_tone; spec.costas_len * width];
    for (sym, &tone) in spec.costas.iter().enumerate() {
        let row = &mut csync[sym * width..(sym + 1) * width];
        for bin in &mut row[tone as usize * bpt..(tone as usize + 1) * bpt] {
            *bin = 1.0;
        }
        for bin in &mut row[spec.costas_len * bpt..] {
            *bin = 0.0;
        }
    }
    csync
}

/// Search one cycle of spectrogram for signal starts.
///
/// Returns one candidate per frequency bin in `f0_idxs`, each carrying the
/// best-scoring start offset for the middle Costas array (sync position 1).
pub fn search(
    spec: &SignalSpec,
    ring: &SpectrumRing,
    f0_idxs: Range<usize>,
    cycle_start: &str,
) -> Vec<Candidate> {
    let snap = ring.snapshot();
    let csync = costas_template(spec, ring);
    let (hops, n_freqs) = (ring.hops_per_cycle, ring.n_freqs);
    let width = ring.fbins_per_signal;
    let hps = ring.hops_per_symbol;

    // roughly -1.0 s to +2.5 s around the nominal start
    let h_search: Range<i32> =
        (((-1.7_f32 + 0.7) / ring.dt) as i32)..(((3.2_f32 + 0.7) / ring.dt) as i32);
    let sync_idx = 1;

    let mut candidates = Vec::with_capacity(f0_idxs.len());
    for f0_idx in f0_idxs {
        let window_max = snap
            .chunks(n_freqs)
            .flat_map(|row| &row[f0_idx..f0_idx + width])
            .fold(f32::MIN, |m, &v| m.max(v));

        let mut best = SyncPoint::default();
        for h0_idx in h_search.clone() {
            let mut score = 0.0f32;
            for k in 0..spec.costas_len {
                let row = (h0_idx + (k * hps) as i32 + (sync_idx * 36 * hps) as i32)
                    .rem_euclid(hops as i32) as usize;
                let cells = &snap[row * n_freqs + f0_idx..row * n_freqs + f0_idx + width];
                let template = &csync[k * width..(k + 1) * width];
                for (&db, &w) in cells.iter().zip(template) {
                    score += (db - window_max) * w;
                }
            }
            if score > best.score {
                best = SyncPoint {
                    h0_idx,
                    score,
                    dt: h0_idx as f32 * ring.dt - 0.7,
                };
            }
        }
        trace!(f0_idx, h0_idx = best.h0_idx, score = best.score, "sync");
        candidates.push(Candidate::new(f0_idx, best, ring, cycle_start));
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sigspec::FT8;
    use crate::spectrum::{build, SpectrumParams};

    #[test]
    fn template_marks_costas_tones() {
        let (_, ring) = build(&FT8, SpectrumParams::default());
        let csync = costas_template(&FT8, &ring);
        assert_eq!(csync.len(), 7 * 16);
        for (sym, &tone) in FT8.costas.iter().enumerate() {
            let row = &csync[sym * 16..(sym + 1) * 16];
            for (bin, &w) in row.iter().enumerate() {
                let expect = if bin >= 14 {
                    0.0 // beyond the seven-tone Costas band
                } else if bin / 2 == tone as usize {
                    1.0
                } else {
                    -2.0 / 14.0
                };
                assert_eq!(w, expect, "symbol {sym} bin {bin}");
            }
        }
    }

    #[test]
    fn search_hop_range_matches_dt() {
        let (_, ring) = build(&FT8, SpectrumParams::default());
        assert_eq!(((-1.7_f32 + 0.7) / ring.dt) as i32, -12);
        assert_eq!(((3.2_f32 + 0.7) / ring.dt) as i32, 48);
    }
}
