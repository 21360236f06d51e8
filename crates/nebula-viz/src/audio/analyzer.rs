//! Spectrum analysis over the playback tap.
//!
//! Fixed 512-point Hann-windowed FFT over the most recent output samples,
//! reduced to 256 byte magnitudes on a -100..-30 dB scale with per-bin time
//! smoothing. The byte scale is what the band-reduction constants are
//! calibrated against.

use std::sync::Arc;

use num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use nebula_signal::SpectrumTap;

use super::tap::SampleTap;

/// Transform size, fixed at construction.
pub const FFT_SIZE: usize = 512;

/// Frequency bins exposed per snapshot.
pub const BIN_COUNT: usize = FFT_SIZE / 2;

/// Magnitudes at or below this map to byte 0.
const MIN_DB: f32 = -100.0;

/// Magnitudes at or above this saturate at byte 255.
const MAX_DB: f32 = -30.0;

/// Per-bin smoothing against the previous snapshot.
const TIME_SMOOTHING: f32 = 0.8;

/// FFT analyzer fed by the samples the deck actually renders.
pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    scratch: Vec<f32>,
    fft_buffer: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
    tap: SampleTap,
}

impl SpectrumAnalyzer {
    pub fn new(tap: SampleTap) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(FFT_SIZE);

        // Pre-compute Hann window
        let window: Vec<f32> = (0..FFT_SIZE)
            .map(|i| 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / FFT_SIZE as f32).cos()))
            .collect();

        Self {
            fft,
            window,
            scratch: vec![0.0; FFT_SIZE],
            fft_buffer: vec![Complex::new(0.0, 0.0); FFT_SIZE],
            smoothed: vec![0.0; BIN_COUNT],
            tap,
        }
    }
}

impl SpectrumTap for SpectrumAnalyzer {
    fn bin_count(&self) -> usize {
        BIN_COUNT
    }

    fn fill(&mut self, bins: &mut [u8]) {
        self.tap.latest(&mut self.scratch);

        for i in 0..FFT_SIZE {
            self.fft_buffer[i] = Complex::new(self.scratch[i] * self.window[i], 0.0);
        }
        self.fft.process(&mut self.fft_buffer);

        for (i, out) in bins.iter_mut().enumerate().take(BIN_COUNT) {
            let mag = self.fft_buffer[i].norm() / FFT_SIZE as f32;
            self.smoothed[i] = self.smoothed[i] * TIME_SMOOTHING + mag * (1.0 - TIME_SMOOTHING);

            let db = 20.0 * (self.smoothed[i] + 1e-10).log10();
            let scaled = (db - MIN_DB) / (MAX_DB - MIN_DB) * 255.0;
            *out = scaled.clamp(0.0, 255.0) as u8;
        }
    }
}
