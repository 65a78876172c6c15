//! Test-signal generation for the `sig-gen` command and the test suite.

use rand::{distributions::Uniform, thread_rng, Rng};
use std::f64::consts::PI;

/// Signal types
#[derive(Clone, Copy, Debug)]
pub enum SignalType {
    WhiteNoise,      // White noise
    Sinusoidal(f64), // Sinusoidal signal with given frequency (Hz)
    Chirp(f64, f64), // Linear chirp from f1 to f2
}

/// Generates white noise signal
fn generate_white_noise(len: usize) -> Vec<f64> {
    let mut rng = thread_rng();
    let uniform = Uniform::from(-1.0..1.0);
    (0..len).map(|_| rng.sample(uniform)).collect()
}

/// Generates a sinusoidal signal at the given frequency
fn generate_sinusoidal(len: usize, frequency: f64, sr: f64) -> Vec<f64> {
    (0..len)
        .map(|i| {
            let t = i as f64 / sr;
            (2.0 * PI * frequency * t).sin()
        })
        .collect()
}

/// Generates a linear chirp from f1 to f2 over the signal duration
fn generate_chirp(len: usize, f1: f64, f2: f64, sr: f64) -> Vec<f64> {
    let duration = len as f64 / sr;
    let k = (f2 - f1) / duration;

    (0..len)
        .map(|i| {
            let t = i as f64 / sr;
            (2.0 * PI * (f1 * t + 0.5 * k * t * t)).sin()
        })
        .collect()
}

/// Generates a signal vector of given length and type.
pub fn generate_signal(len: usize, sig_type: SignalType, sample_rate: f64) -> Vec<f64> {
    match sig_type {
        SignalType::WhiteNoise => generate_white_noise(len),
        SignalType::Sinusoidal(freq) => generate_sinusoidal(len, freq, sample_rate),
        SignalType::Chirp(f1, f2) => generate_chirp(len, f1, f2, sample_rate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_length() {
        for sig_type in [
            SignalType::WhiteNoise,
            SignalType::Sinusoidal(440.0),
            SignalType::Chirp(200.0, 800.0),
        ] {
            let sig = generate_signal(1000, sig_type, 44100.0);
            assert_eq!(sig.len(), 1000);
        }
    }

    #[test]
    fn test_white_noise_in_range() {
        let sig = generate_signal(10_000, SignalType::WhiteNoise, 44100.0);
        assert!(sig.iter().all(|&s| (-1.0..1.0).contains(&s)));
    }

    #[test]
    fn test_sinusoidal_starts_at_zero() {
        let sig = generate_signal(64, SignalType::Sinusoidal(440.0), 44100.0);
        assert_eq!(sig[0], 0.0);
    }
}
