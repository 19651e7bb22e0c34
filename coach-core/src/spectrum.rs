//! # Spectral Analysis Module
//!
//! Short-time spectral analysis for pitch extraction. An audio block is
//! sliced into overlapping frames; each frame is DC-corrected, Hann-windowed
//! and run through a forward FFT, and the strongest bin in the audible search
//! band becomes that frame's dominant peak. Parabolic interpolation around
//! the peak bin recovers sub-bin frequency accuracy, which matters here
//! because a 2048-sample frame at 44.1 kHz has ~21.5 Hz bins while adjacent
//! semitones in the guitar's low register are closer together than that.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Samples per analysis frame.
pub const FRAME_SIZE: usize = 2048;

/// Samples between successive frame starts.
pub const HOP_SIZE: usize = 512;

/// Lower edge of the peak search band in Hz. Sits below the guitar's low
/// E string (82.4 Hz) while excluding the DC bin and mains rumble.
const MIN_FREQUENCY: f32 = 60.0;

/// Upper edge of the peak search band in Hz.
const MAX_FREQUENCY: f32 = 4000.0;

/// The dominant spectral peak of one analysis frame.
#[derive(Debug, Clone, Copy)]
pub struct FramePeak {
    /// Interpolated peak frequency in Hz.
    pub frequency: f32,
    /// Peak bin magnitude, in raw FFT units of the windowed frame.
    pub magnitude: f32,
}

/// Frame-wise dominant-peak extractor over fixed-size audio blocks.
pub struct SpectralAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    sample_rate: u32,
}

impl SpectralAnalyzer {
    /// Plans the FFT and precomputes the Hann window for the fixed frame
    /// geometry. Planning happens once here, not per frame.
    pub fn new(sample_rate: u32) -> SpectralAnalyzer {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(FRAME_SIZE);

        let n_minus_1 = (FRAME_SIZE - 1) as f32;
        let window = (0..FRAME_SIZE)
            .map(|i| {
                0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / n_minus_1).cos())
            })
            .collect();

        SpectralAnalyzer {
            fft,
            window,
            sample_rate,
        }
    }

    /// Extracts the dominant peak of every full frame in `block`.
    ///
    /// # Arguments
    /// * `block` - Mono audio samples; analysed in 2048-sample frames at
    ///   512-sample hops, trailing partial frames ignored
    ///
    /// # Returns
    /// * One `FramePeak` per full frame, in frame order; empty for blocks
    ///   shorter than one frame
    pub fn dominant_peaks(&self, block: &[f32]) -> Vec<FramePeak> {
        if block.len() < FRAME_SIZE {
            return Vec::new();
        }

        let frame_count = (block.len() - FRAME_SIZE) / HOP_SIZE + 1;
        let mut peaks = Vec::with_capacity(frame_count);
        let mut buffer = vec![Complex { re: 0.0f32, im: 0.0 }; FRAME_SIZE];

        let mut start = 0;
        while start + FRAME_SIZE <= block.len() {
            let frame = &block[start..start + FRAME_SIZE];
            self.load_frame(frame, &mut buffer);
            self.fft.process(&mut buffer);
            if let Some(peak) = self.find_peak(&buffer) {
                peaks.push(peak);
            }
            start += HOP_SIZE;
        }

        peaks
    }

    /// Copies one frame into the FFT buffer with DC removal and windowing.
    fn load_frame(&self, frame: &[f32], buffer: &mut [Complex<f32>]) {
        let mean = frame.iter().sum::<f32>() / frame.len() as f32;
        for ((slot, &sample), &w) in buffer.iter_mut().zip(frame).zip(&self.window) {
            slot.re = (sample - mean) * w;
            slot.im = 0.0;
        }
    }

    /// Strongest bin within the search band, with parabolic refinement.
    fn find_peak(&self, spectrum: &[Complex<f32>]) -> Option<FramePeak> {
        let bin_width = self.sample_rate as f32 / FRAME_SIZE as f32;
        // Only the first half of the spectrum is meaningful (Nyquist).
        let half = FRAME_SIZE / 2;
        let lo = ((MIN_FREQUENCY / bin_width).ceil() as usize).max(1);
        let hi = ((MAX_FREQUENCY / bin_width).floor() as usize).min(half - 1);
        if lo >= hi {
            return None;
        }

        let magnitude = |bin: usize| spectrum[bin].norm();

        let mut peak_bin = lo;
        let mut peak_mag = magnitude(lo);
        for bin in lo + 1..=hi {
            let mag = magnitude(bin);
            if mag > peak_mag {
                peak_mag = mag;
                peak_bin = bin;
            }
        }

        // Parabolic interpolation across the peak and its neighbours gives
        // sub-bin accuracy on windowed tones. Degenerate (flat) neighbourhoods
        // keep the raw bin centre.
        let y1 = magnitude(peak_bin - 1);
        let y2 = peak_mag;
        let y3 = magnitude(peak_bin + 1);
        let denom = y1 - 2.0 * y2 + y3;
        let shift = if denom.abs() > f32::EPSILON {
            (0.5 * (y1 - y3) / denom).clamp(-0.5, 0.5)
        } else {
            0.0
        };

        let frequency = (peak_bin as f32 + shift) * bin_width;
        Some(FramePeak {
            frequency,
            magnitude: peak_mag,
        })
    }
}
