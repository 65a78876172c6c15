//! Multi-level discrete wavelet transform with periodic boundary handling,
//! plus the soft-threshold operator used for shrinkage denoising.
//!
//! The analysis bank convolves with the low-pass filter `h` and the high-pass
//! filter `g` (derived from `h` by the alternating-flip QMF relation) and
//! decimates by 2; the synthesis bank is its exact transpose, so orthogonal
//! bases reconstruct perfectly. Odd-length inputs are extended by duplicating
//! the last sample before each analysis step and the pre-extension lengths are
//! recorded so reconstruction restores them.

use crate::error::DenoiseError;

/// The Daubechies basis used for decomposition. Fixed per denoiser instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Wavelet {
    Db4,
    Db8,
}

impl Wavelet {
    /// Low-pass (scaling) decomposition filter coefficients.
    pub fn scaling_filter(self) -> &'static [f64] {
        match self {
            Wavelet::Db4 => &[
                -0.010597401784997278,
                0.032883011666982945,
                0.030841381835986965,
                -0.187034811718881060,
                -0.027983769416983849,
                0.630880767929590380,
                0.714846570552541600,
                0.230377813308855140,
            ],
            Wavelet::Db8 => &[
                -0.00011747678400228192,
                0.0006754494059985568,
                -0.0003917403729959771,
                -0.00487035299301066,
                0.008746094047015655,
                0.013981027917015516,
                -0.04408825393106472,
                -0.01736930100202211,
                0.128747426620186,
                0.00047248457399797254,
                -0.2840155429624281,
                -0.015829105256023893,
                0.5853546836548691,
                0.6756307362980128,
                0.3128715909144659,
                0.05441584224308161,
            ],
        }
    }

    pub fn filter_len(self) -> usize {
        self.scaling_filter().len()
    }

    /// High-pass (wavelet) filter from the low-pass via the alternating flip
    /// (QMF) relation: `g[n] = (-1)^n * h[L-1-n]`.
    pub fn wavelet_filter(self) -> Vec<f64> {
        let lo = self.scaling_filter();
        let l = lo.len();
        (0..l)
            .map(|n| {
                let sign = if n % 2 == 0 { 1.0 } else { -1.0 };
                sign * lo[l - 1 - n]
            })
            .collect()
    }
}

/// Result of a multi-level decomposition.
///
/// `details[0]` is the finest scale; `details[last]` the coarsest. `lengths`
/// keeps the pre-extension input length of each analysis level so that
/// [`waverec`] can undo the odd-length periodic extension.
pub struct Decomposition {
    pub approx: Vec<f64>,
    pub details: Vec<Vec<f64>>,
    lengths: Vec<usize>,
}

/// Maximum useful decomposition level for a signal of length `n`,
/// `floor(log2(n / (filter_len - 1)))` as in pywt's `dwt_max_level`.
pub fn max_level(n: usize, wavelet: Wavelet) -> usize {
    let d = wavelet.filter_len() - 1;
    if n <= d {
        return 0;
    }
    ((n as f64) / (d as f64)).log2().floor() as usize
}

/// One level of analysis: periodic convolution with h and g, then downsample
/// by 2. `a[k] = sum_j h[j] * x[(2k - j) mod N]`, same for `d` with `g`.
fn analysis_step(signal: &[f64], h: &[f64], g: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let owned;
    let x: &[f64] = if signal.len() % 2 != 0 {
        // periodic mode extends odd-length input by duplicating the last sample
        owned = [signal, &signal[signal.len() - 1..]].concat();
        &owned
    } else {
        signal
    };

    let n = x.len();
    let half = n / 2;
    let flen = h.len();

    let mut approx = vec![0.0; half];
    let mut detail = vec![0.0; half];

    for k in 0..half {
        let mut a = 0.0;
        let mut d = 0.0;
        for j in 0..flen {
            let idx = ((2 * k) as isize - j as isize).rem_euclid(n as isize) as usize;
            a += h[j] * x[idx];
            d += g[j] * x[idx];
        }
        approx[k] = a;
        detail[k] = d;
    }

    (approx, detail)
}

/// One level of synthesis: the exact transpose of [`analysis_step`]. Each
/// coefficient pair (a[k], d[k]) is scattered into the output at positions
/// `(2k - j) mod N`.
fn synthesis_step(approx: &[f64], detail: &[f64], h: &[f64], g: &[f64]) -> Vec<f64> {
    let half = approx.len();
    let n = half * 2;
    let flen = h.len();

    let mut result = vec![0.0; n];

    for k in 0..half {
        for j in 0..flen {
            let idx = ((2 * k) as isize - j as isize).rem_euclid(n as isize) as usize;
            result[idx] += h[j] * approx[k] + g[j] * detail[k];
        }
    }

    result
}

/// Multi-level forward decomposition with periodic boundary handling.
///
/// `levels` must be at least 1 and no deeper than [`max_level`] allows;
/// anything else is a configuration error, never a silent truncation.
pub fn wavedec(
    signal: &[f64],
    wavelet: Wavelet,
    levels: usize,
) -> Result<Decomposition, DenoiseError> {
    if signal.is_empty() {
        return Err(DenoiseError::Config("cannot decompose an empty signal".into()));
    }
    if levels == 0 || levels > max_level(signal.len(), wavelet) {
        return Err(DenoiseError::Config(format!(
            "{} decomposition levels not supported for {} samples with {:?}",
            levels,
            signal.len(),
            wavelet
        )));
    }

    let h = wavelet.scaling_filter();
    let g = wavelet.wavelet_filter();

    let mut approx = signal.to_vec();
    let mut details = Vec::with_capacity(levels);
    let mut lengths = Vec::with_capacity(levels);
    for _ in 0..levels {
        lengths.push(approx.len());
        let (a, d) = analysis_step(&approx, h, &g);
        details.push(d);
        approx = a;
    }

    Ok(Decomposition {
        approx,
        details,
        lengths,
    })
}

/// Reconstruct the signal from a [`Decomposition`], coarsest level first,
/// trimming each level back to its pre-extension length.
pub fn waverec(dec: &Decomposition, wavelet: Wavelet) -> Vec<f64> {
    let h = wavelet.scaling_filter();
    let g = wavelet.wavelet_filter();

    let mut current = dec.approx.clone();
    for (detail, &len) in dec.details.iter().zip(dec.lengths.iter()).rev() {
        current = synthesis_step(&current, detail, h, &g);
        current.truncate(len);
    }
    current
}

/// Soft-threshold operator: `c -> sign(c) * max(|c| - value, 0)`.
/// With `value == 0` this is the identity.
pub fn soft_threshold(coeffs: &[f64], value: f64) -> Vec<f64> {
    coeffs
        .iter()
        .map(|&c| {
            let shrunk = c.abs() - value;
            if shrunk > 0.0 {
                c.signum() * shrunk
            } else {
                0.0
            }
        })
        .collect()
}
