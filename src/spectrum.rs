//! Rolling short-time spectrogram over one FT8 cycle
//!
//! The spectrogram is split into a shared ring of power-dB rows and a writer
//! half owned by the capture thread. The write pointer is the only
//! synchronisation edge: the writer stores a complete row, then advances the
//! pointer with release ordering; readers load it with acquire and copy rows
//! before inspecting them. Row cells are plain `f32` bit patterns in atomics,
//! so no lock is ever taken.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::sigspec::{SignalSpec, SAMPLE_RATE};

/// Spectrogram geometry knobs.
#[derive(Debug, Clone, Copy)]
pub struct SpectrumParams {
    /// Spectrogram rows per symbol.
    pub hops_per_symbol: usize,
    /// FFT bins per 8-FSK tone.
    pub fbins_per_tone: usize,
    /// Top of the analysed band in Hz.
    pub max_freq: f32,
}

impl Default for SpectrumParams {
    fn default() -> Self {
        Self {
            hops_per_symbol: 2,
            fbins_per_tone: 2,
            max_freq: 3100.0,
        }
    }
}

/// Shared reader half: one cycle of spectral power in dB.
pub struct SpectrumRing {
    pub hops_per_cycle: usize,
    pub n_freqs: usize,
    pub hops_per_symbol: usize,
    pub fbins_per_tone: usize,
    /// Bins spanned by one 8-FSK signal.
    pub fbins_per_signal: usize,
    /// Seconds per hop.
    pub dt: f32,
    /// Hz per bin.
    pub df: f32,
    /// Spectrogram rows of the payload symbols, before the sync offset.
    pub base_payload_hops: Vec<usize>,
    rows: Box<[AtomicU32]>,
    ptr: AtomicUsize,
    finished: AtomicBool,
}

impl SpectrumRing {
    /// Current write pointer; rows strictly before it are complete.
    pub fn write_ptr(&self) -> usize {
        self.ptr.load(Ordering::Acquire)
    }

    /// Rewind the pointer at a cycle rollover.
    pub fn reset_ptr(&self) {
        self.ptr.store(0, Ordering::Release);
    }

    /// One dB cell.
    pub fn cell(&self, hop: usize, bin: usize) -> f32 {
        f32::from_bits(self.rows[hop * self.n_freqs + bin].load(Ordering::Relaxed))
    }

    /// Copy the dB block at (hops × bins), e.g. the 58×8 payload cells of a
    /// candidate.
    pub fn block(&self, hops: &[usize], bins: &[usize; 8]) -> Vec<[f32; 8]> {
        hops.iter()
            .map(|&h| bins.map(|b| self.cell(h, b)))
            .collect()
    }

    /// Row-major copy of the whole ring for the sync search.
    pub fn snapshot(&self) -> Vec<f32> {
        self.rows
            .iter()
            .map(|c| f32::from_bits(c.load(Ordering::Relaxed)))
            .collect()
    }

    /// Input exhausted (WAV replay only).
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    pub fn mark_finished(&self) {
        self.finished.store(true, Ordering::Release);
    }
}

/// Writer half: sliding time-domain buffer, Hann window and FFT plan.
pub struct SpectrumWriter {
    ring: Arc<SpectrumRing>,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buf: Vec<f32>,
    scratch: Vec<Complex<f32>>,
    hop_samples: usize,
    pending: usize,
}

/// Build the spectrogram for one cycle of `spec` and split it into its
/// writer and shared reader halves.
pub fn build(spec: &SignalSpec, params: SpectrumParams) -> (SpectrumWriter, Arc<SpectrumRing>) {
    let hop_samples = (SAMPLE_RATE as f32 / (spec.symbols_per_sec * params.hops_per_symbol as f32))
        as usize;
    let fft_len = (params.fbins_per_tone as f32 * SAMPLE_RATE as f32 / spec.symbols_per_sec) as usize;
    let fft_out_len = fft_len / 2 + 1;
    let n_freqs = (fft_out_len as f32 * params.max_freq * 2.0 / SAMPLE_RATE as f32) as usize;
    let hops_per_cycle =
        (spec.cycle_seconds * spec.symbols_per_sec as f64 * params.hops_per_symbol as f64) as usize;

    let base_payload_hops = spec
        .payload_symbol_idxs()
        .map(|s| s * params.hops_per_symbol)
        .collect();

    let ring = Arc::new(SpectrumRing {
        hops_per_cycle,
        n_freqs,
        hops_per_symbol: params.hops_per_symbol,
        fbins_per_tone: params.fbins_per_tone,
        fbins_per_signal: spec.tones_per_symbol * params.fbins_per_tone,
        dt: 1.0 / (spec.symbols_per_sec * params.hops_per_symbol as f32),
        df: params.max_freq / (n_freqs - 1) as f32,
        base_payload_hops,
        rows: (0..hops_per_cycle * n_freqs).map(|_| AtomicU32::new(0)).collect(),
        ptr: AtomicUsize::new(0),
        finished: AtomicBool::new(false),
    });

    let window = (0..fft_len)
        .map(|i| 0.5 - 0.5 * (std::f32::consts::TAU * i as f32 / (fft_len - 1) as f32).cos())
        .collect();

    let writer = SpectrumWriter {
        ring: Arc::clone(&ring),
        fft: FftPlanner::new().plan_fft_forward(fft_len),
        window,
        buf: vec![0.0; fft_len],
        scratch: vec![Complex::default(); fft_len],
        hop_samples,
        pending: 0,
    };
    (writer, ring)
}

impl SpectrumWriter {
    pub fn ring(&self) -> Arc<SpectrumRing> {
        Arc::clone(&self.ring)
    }

    pub fn hop_samples(&self) -> usize {
        self.hop_samples
    }

    /// Append PCM samples to the sliding buffer, producing one spectrogram
    /// row per completed hop. Chunks of any size are accepted.
    pub fn push_samples(&mut self, samples: &[i16]) {
        let mut i = 0;
        while i < samples.len() {
            let take = (samples.len() - i).min(self.hop_samples - self.pending);
            let fft_len = self.buf.len();
            self.buf.copy_within(take.., 0);
            for (dst, &s) in self.buf[fft_len - take..].iter_mut().zip(&samples[i..i + take]) {
                *dst = s as f32;
            }
            self.pending += take;
            i += take;
            if self.pending == self.hop_samples {
                self.pending = 0;
                self.write_row();
            }
        }
    }

    fn write_row(&mut self) {
        for ((z, &x), &w) in self.scratch.iter_mut().zip(&self.buf).zip(&self.window) {
            *z = Complex::new(x * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        let ptr = self.ring.ptr.load(Ordering::Relaxed);
        let base = ptr * self.ring.n_freqs;
        for (cell, z) in self.ring.rows[base..base + self.ring.n_freqs]
            .iter()
            .zip(&self.scratch)
        {
            let power = z.re * z.re + z.im * z.im;
            let db = 10.0 * (power + 1e-12).log10();
            cell.store(db.to_bits(), Ordering::Relaxed);
        }
        // row is fully stored before the pointer advances
        self.ring
            .ptr
            .store((ptr + 1) % self.ring.hops_per_cycle, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sigspec::FT8;

    #[test]
    fn ft8_geometry() {
        let (writer, ring) = build(&FT8, SpectrumParams::default());
        assert_eq!(writer.hop_samples(), 960);
        assert_eq!(writer.buf.len(), 3840);
        assert_eq!(ring.hops_per_cycle, 187);
        assert_eq!(ring.n_freqs, 992);
        assert_eq!(ring.fbins_per_signal, 16);
        assert!((ring.dt - 0.08).abs() < 1e-6);
        assert!((ring.df - 3100.0 / 991.0).abs() < 1e-4);
        assert_eq!(ring.base_payload_hops.len(), 58);
        assert_eq!(ring.base_payload_hops[0], 14);
        assert_eq!(*ring.base_payload_hops.last().unwrap(), 142);
    }

    #[test]
    fn pointer_advances_once_per_hop_and_wraps() {
        let (mut writer, ring) = build(&FT8, SpectrumParams::default());
        assert_eq!(ring.write_ptr(), 0);
        writer.push_samples(&vec![0i16; 960 * 5]);
        assert_eq!(ring.write_ptr(), 5);
        // short chunks accumulate without advancing
        writer.push_samples(&vec![0i16; 500]);
        assert_eq!(ring.write_ptr(), 5);
        writer.push_samples(&vec![0i16; 460]);
        assert_eq!(ring.write_ptr(), 6);
        // wraps modulo hops_per_cycle
        writer.push_samples(&vec![0i16; 960 * 181]);
        assert_eq!(ring.write_ptr(), 0);
    }

    #[test]
    fn pure_tone_peaks_in_its_bin() {
        let (mut writer, ring) = build(&FT8, SpectrumParams::default());
        // 1000 Hz sits at true FFT bin 1000 / 3.125 = 320
        let samples: Vec<i16> = (0..960 * 8)
            .map(|n| {
                let t = n as f32 / SAMPLE_RATE as f32;
                (8000.0 * (std::f32::consts::TAU * 1000.0 * t).sin()) as i16
            })
            .collect();
        writer.push_samples(&samples);
        let row = 7; // buffer fully primed by then
        let peak = (0..ring.n_freqs)
            .max_by(|&a, &b| ring.cell(row, a).total_cmp(&ring.cell(row, b)))
            .unwrap();
        assert_eq!(peak, 320);
        assert!(ring.cell(row, 320) > ring.cell(row, 300) + 30.0);
    }
}
