//! Mixing helpers and quality metrics used by the eval harness and the tests.

/// Mix clean signal with noise, scaling noise by `noise_level`.
pub fn add_noise(signal: &[f64], noise: &[f64], noise_level: f64) -> Vec<f64> {
    signal
        .iter()
        .zip(noise.iter())
        .map(|(s, n)| s + n * noise_level)
        .collect()
}

/// Computes the mean squared error (MSE) between two signals.
pub fn mean_square_error(signal1: &[f64], signal2: &[f64]) -> f64 {
    signal1
        .iter()
        .zip(signal2.iter())
        .map(|(s1, s2)| (s1 - s2) * (s1 - s2))
        .sum::<f64>()
        / signal1.len() as f64
}

/// Compute the linear signal-to-noise ratio between a clean reference and a
/// processed signal: SNR = P_clean / P_noise, where noise = clean - processed.
///
/// If the input vectors have different lengths, both are cut to the length of
/// the shorter one.
pub fn sig_to_noise_ratio(clean: &[f64], processed: &[f64]) -> f64 {
    let len = clean.len().min(processed.len());
    let clean = &clean[..len];
    let processed = &processed[..len];

    let pow_signal = clean.iter().map(|&x| x * x).sum::<f64>();
    let pow_error = clean
        .iter()
        .zip(processed.iter())
        .map(|(&d, &pd)| (d - pd).powi(2))
        .sum::<f64>();
    if pow_error == 0.0 {
        return f64::INFINITY;
    }
    pow_signal / pow_error
}

/// Compute the SNR in decibels: 10 * log10(linear SNR).
fn sig_to_noise_ratio_db(clean: &[f64], processed: &[f64]) -> f64 {
    let snr = sig_to_noise_ratio(clean, processed);
    10.0 * snr.log10()
}

/// Compute the improvement in SNR (in dB) from a noisy input to a processed
/// output, relative to a clean reference:
/// improvement_dB = SNR_db(clean, processed) - SNR_db(clean, noisy)
pub fn snr_improvement_db(clean: &[f64], noisy: &[f64], processed: &[f64]) -> f64 {
    let snr_in = sig_to_noise_ratio_db(clean, noisy);
    let snr_out = sig_to_noise_ratio_db(clean, processed);
    snr_out - snr_in
}

/// Compute the linear improvement in SNR (ratio) from a noisy input to a
/// processed output.
pub fn snr_improvement(clean: &[f64], noisy: &[f64], processed: &[f64]) -> f64 {
    let snr_in = sig_to_noise_ratio(clean, noisy);
    let snr_out = sig_to_noise_ratio(clean, processed);
    if snr_in == 0.0 {
        return f64::INFINITY;
    }
    snr_out / snr_in
}
