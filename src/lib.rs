//! Wavelet-shrinkage audio denoising and noise-profile extraction.
//!
//! Two entry operations: [`denoise::denoise_file`] streams an input WAV through a
//! per-block VisuShrink denoiser, and [`profiler::extract_noise_profile`] builds a
//! full-duration noise-only waveform from a recording that mixes noise-only and
//! signal-bearing stretches.

pub mod denoise;
pub mod error;
pub mod profiler;
pub mod sequence;
pub mod signal;
pub mod utils;
pub mod wav;
pub mod wavelet;
pub mod window;

#[cfg(test)]
const _EPSILON: f64 = 1e-12;
