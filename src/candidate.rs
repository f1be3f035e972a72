//! Decode candidates
//!
//! A candidate is one (frequency bin, start offset) pair produced by the
//! sync search. It moves through demap (58×8 dB cells → 174 LLRs), the LDPC
//! schedule and CRC check, and finally payload unpacking. Every state
//! transition is recorded in a compact trace string for diagnostics.

use std::fmt::Write as _;

use tracing::debug;

use crate::crc;
use crate::ldpc::{self, LdpcDecoder};
use crate::message::{self, Message};
use crate::spectrum::SpectrumRing;
use crate::sync::SyncPoint;

/// Knobs of the decode schedule.
#[derive(Debug, Clone, Copy)]
pub struct DecodeParams {
    /// Candidates whose LLR spread is below this are dead slots.
    pub min_llr_sd: f32,
    /// Abandon when the initial unsatisfied-check count exceeds this.
    pub max_ncheck0: usize,
    /// Belief-propagation iteration budget per candidate.
    pub max_iterations: usize,
    /// LLR conditioning: (target stddev, clip magnitude).
    pub llr_target: (f32, f32),
}

impl Default for DecodeParams {
    fn default() -> Self {
        Self {
            min_llr_sd: 0.5,
            max_ncheck0: 45,
            max_iterations: 12,
            llr_target: (3.3, 3.7),
        }
    }
}

/// One successful decode, emitted through the cycle manager's callback.
#[derive(Debug, Clone)]
pub struct DecodeEvent {
    /// Cycle start, `YYMMDD_HHMMSS` UTC.
    pub cycle_start: String,
    /// Centre of the candidate band in Hz.
    pub freq_hz: u32,
    /// Crude SNR estimate in dB, clipped to ±24.
    pub snr_db: i32,
    /// Start offset in seconds, 2-decimal.
    pub dt: f32,
    /// Space-joined message text.
    pub msg: String,
    /// The three decoded fields.
    pub msg_tuple: Message,
    /// Unsatisfied checks before any iteration.
    pub ncheck0: usize,
    /// State-transition trace.
    pub decode_path: String,
    /// LLR spread before conditioning.
    pub llr_sd: f32,
    /// Wall-clock second of the decode within the minute.
    pub td: f64,
}

/// Sentinel check count before the first hard decision.
const NCHECK_UNSET: usize = 99;

/// One sync hit moving through demap → LDPC → CRC → unpack.
pub struct Candidate {
    pub f0_idx: usize,
    pub sync: SyncPoint,
    /// Bin centres of the eight tones.
    pub freq_idxs: [usize; 8],
    /// Hop row after which the whole frame is in the ring.
    pub last_payload_hop: i32,
    pub cycle_start: String,
    /// Centre of the candidate band in Hz.
    pub freq_hz: u32,
    pub llr: [f32; 174],
    pub llr_sd: f32,
    pub ncheck0: usize,
    pub decode_path: String,
    pub message: Option<Message>,
    ncheck: usize,
    snr_db: i32,
    demap_started: bool,
    decode_completed: bool,
    ldpc: LdpcDecoder,
}

impl Candidate {
    pub(crate) fn new(
        f0_idx: usize,
        sync: SyncPoint,
        ring: &SpectrumRing,
        cycle_start: &str,
    ) -> Self {
        let bpt = ring.fbins_per_tone;
        let mut freq_idxs = [0usize; 8];
        for (tone, idx) in freq_idxs.iter_mut().enumerate() {
            *idx = f0_idx + bpt / 2 + bpt * tone;
        }
        Self {
            f0_idx,
            sync,
            freq_idxs,
            last_payload_hop: sync.h0_idx + (ring.hops_per_symbol * 72) as i32,
            cycle_start: cycle_start.to_string(),
            freq_hz: ((f0_idx + bpt / 2) as f32 * ring.df) as u32,
            llr: [0.0; 174],
            llr_sd: 0.0,
            ncheck0: NCHECK_UNSET,
            decode_path: String::new(),
            message: None,
            ncheck: NCHECK_UNSET,
            snr_db: -30,
            demap_started: false,
            decode_completed: false,
            ldpc: LdpcDecoder::new(),
        }
    }

    pub fn demap_started(&self) -> bool {
        self.demap_started
    }

    pub fn decode_completed(&self) -> bool {
        self.decode_completed
    }

    /// Extract the 58 payload symbol cells and form 174 conditioned LLRs.
    ///
    /// The three LLRs per 8-FSK symbol compare max tone powers over the
    /// complementary 4-subsets that encode the Gray-coded bits of the tone
    /// index. The flattened vector is rescaled to the target stddev and
    /// clipped.
    pub fn demap(&mut self, ring: &SpectrumRing, params: &DecodeParams) {
        self.demap_started = true;

        let hops: Vec<usize> = ring
            .base_payload_hops
            .iter()
            .map(|&base| {
                (self.sync.h0_idx + base as i32).clamp(0, ring.hops_per_cycle as i32 - 1) as usize
            })
            .collect();
        let block = ring.block(&hops, &self.freq_idxs);

        let block_max = block.iter().flatten().fold(f32::MIN, |m, &v| m.max(v));
        let block_min = block.iter().flatten().fold(f32::MAX, |m, &v| m.min(v));
        self.snr_db = ((block_max - block_min - 58.0) as i32).clamp(-24, 24);

        let mut llr = [0.0f32; 174];
        for (s, row) in block.iter().enumerate() {
            let p = row.map(|v| (v - block_max).clamp(-80.0, 0.0));
            let max4 = |idxs: [usize; 4]| idxs.iter().map(|&i| p[i]).fold(f32::MIN, f32::max);
            llr[3 * s] = max4([4, 5, 6, 7]) - max4([0, 1, 2, 3]);
            llr[3 * s + 1] = max4([2, 3, 4, 7]) - max4([0, 1, 5, 6]);
            llr[3 * s + 2] = max4([1, 2, 6, 7]) - max4([0, 3, 4, 5]);
        }
        for v in llr.iter_mut() {
            *v /= 10.0;
        }

        let mean = llr.iter().sum::<f32>() / llr.len() as f32;
        let var = llr.iter().map(|v| (v - mean) * (v - mean)).sum::<f32>() / llr.len() as f32;
        self.llr_sd = (100.0 * var.sqrt()).round() / 100.0;

        let (target_sd, clip) = params.llr_target;
        for v in llr.iter_mut() {
            *v = (target_sd * *v / (1e-12 + self.llr_sd)).clamp(-clip, clip);
        }
        self.llr = llr;
    }

    /// Run the LDPC schedule, CRC check and payload unpack.
    pub fn decode(&mut self, params: &DecodeParams) {
        if self.llr_sd < params.min_llr_sd {
            self.record_state('I', true);
            return;
        }

        self.ncheck = ldpc::count_unsatisfied(&self.llr);
        self.ncheck0 = self.ncheck;
        self.record_state('I', false);

        if self.ncheck > 0 && self.ncheck <= params.max_ncheck0 {
            for _ in 0..params.max_iterations {
                let (llr, ncheck) = self.ldpc.iterate(&self.llr);
                self.llr = llr;
                self.ncheck = ncheck;
                self.record_state('L', false);
                if ncheck == 0 {
                    break;
                }
            }
        }

        if self.ncheck == 0 {
            let mut word91: u128 = 0;
            for &v in &self.llr[..91] {
                word91 = (word91 << 1) | (v > 0.0) as u128;
            }
            if let Some(bits77) = crc::check_crc(word91) {
                match message::unpack(bits77) {
                    Ok(msg) => self.message = Some(msg),
                    Err(e) => debug!(freq_hz = self.freq_hz, "unpack failed: {e}"),
                }
            }
        }

        let code = if self.message.is_some() { 'M' } else { '_' };
        self.record_state(code, true);
    }

    fn record_state(&mut self, code: char, is_final: bool) {
        let _ = write!(self.decode_path, "{code}{:02}", self.ncheck);
        if is_final {
            self.decode_path.push('#');
            self.decode_completed = true;
        }
    }

    /// Assemble the emitted record for a successful decode.
    pub(crate) fn to_event(&self, msg: &Message, td: f64) -> DecodeEvent {
        DecodeEvent {
            cycle_start: self.cycle_start.clone(),
            freq_hz: self.freq_hz,
            snr_db: self.snr_db,
            dt: (self.sync.dt * 100.0).round() / 100.0,
            msg: msg.to_string(),
            msg_tuple: msg.clone(),
            ncheck0: self.ncheck0,
            decode_path: self.decode_path.clone(),
            llr_sd: self.llr_sd,
            td,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sigspec::FT8;
    use crate::spectrum::{build, SpectrumParams};
    use crate::sync::SyncPoint;

    fn test_candidate() -> (Candidate, std::sync::Arc<SpectrumRing>) {
        let (_, ring) = build(&FT8, SpectrumParams::default());
        let cand = Candidate::new(
            160,
            SyncPoint {
                h0_idx: 2,
                score: 10.0,
                dt: 2.0 * ring.dt - 0.7,
            },
            &ring,
            "250801_120000",
        );
        (cand, ring)
    }

    #[test]
    fn candidate_owns_eight_tone_bins() {
        let (cand, _) = test_candidate();
        assert_eq!(cand.freq_idxs, [161, 163, 165, 167, 169, 171, 173, 175]);
        assert_eq!(cand.last_payload_hop, 2 + 144);
        assert_eq!(cand.freq_hz, (161.0 * 3100.0 / 991.0) as u32);
    }

    #[test]
    fn silent_ring_gates_at_the_llr_spread() {
        let (mut cand, ring) = test_candidate();
        let params = DecodeParams::default();
        cand.demap(&ring, &params);
        assert!(cand.llr_sd < params.min_llr_sd);
        cand.decode(&params);
        assert!(cand.decode_completed());
        assert!(cand.message.is_none());
        assert_eq!(cand.decode_path, "I99#");
    }

    #[test]
    fn trace_records_iteration_states() {
        let (mut cand, _) = test_candidate();
        cand.llr_sd = 3.0;
        // alternating strong LLRs: not a codeword, ncheck0 far over the gate
        for (i, v) in cand.llr.iter_mut().enumerate() {
            *v = if i % 2 == 0 { 3.3 } else { -3.3 };
        }
        cand.decode(&DecodeParams::default());
        assert!(cand.ncheck0 > 0);
        assert!(cand.decode_path.starts_with('I'));
        assert!(cand.decode_path.ends_with('#'));
        assert!(cand.message.is_none());
    }
}
