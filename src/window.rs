//! Fixed-size window segmentation and per-window RMS energy.

use std::cell::Cell;

/// One segmentation window: its position in the recording, its raw samples,
/// and the RMS energy memoized on first computation.
///
/// Windows are created once by [`segment`] and only read afterwards; the
/// profiler refers to them by id, never by copying the samples.
pub struct WindowBundle {
    pub id: usize,
    pub samples: Vec<f64>,
    rms: Cell<Option<f64>>,
}

impl WindowBundle {
    pub fn new(id: usize, samples: Vec<f64>) -> Self {
        WindowBundle {
            id,
            samples,
            rms: Cell::new(None),
        }
    }

    /// Root-mean-square energy, `sqrt(sum(x^2) / count)`, computed once and
    /// cached. An all-zero window yields exactly 0.0.
    pub fn rms(&self) -> f64 {
        if let Some(rms) = self.rms.get() {
            return rms;
        }
        let squared_sum: f64 = self.samples.iter().map(|&x| x * x).sum();
        let rms = (squared_sum / self.samples.len() as f64).sqrt();
        self.rms.set(Some(rms));
        rms
    }
}

/// Partition `samples` into consecutive windows of `window_samples` each, in
/// id order. The final window is zero-padded on the right when the input
/// length is not a multiple of the window size. Empty input yields no windows.
pub fn segment(samples: &[f64], window_samples: usize) -> Vec<WindowBundle> {
    assert!(window_samples > 0, "window size must be positive");

    let n_windows = samples.len().div_ceil(window_samples);
    let mut windows = Vec::with_capacity(n_windows);
    for id in 0..n_windows {
        let begin = id * window_samples;
        let end = (begin + window_samples).min(samples.len());
        let mut data = samples[begin..end].to_vec();
        data.resize(window_samples, 0.0);
        windows.push(WindowBundle::new(id, data));
    }
    windows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::_EPSILON;
    use float_cmp::approx_eq;

    #[test]
    fn test_segment_roundtrip_exact_multiple() {
        let samples: Vec<f64> = (0..12).map(|i| i as f64).collect();
        let windows = segment(&samples, 4);
        assert_eq!(windows.len(), 3);
        let joined: Vec<f64> = windows.iter().flat_map(|w| w.samples.clone()).collect();
        assert_eq!(joined, samples);
    }

    #[test]
    fn test_segment_pads_last_window() {
        let samples: Vec<f64> = (1..=10).map(|i| i as f64).collect();
        let windows = segment(&samples, 4);
        assert_eq!(windows.len(), 3);
        assert_eq!(windows[2].samples, vec![9.0, 10.0, 0.0, 0.0]);
        // truncating the concatenation to the input length reproduces it
        let joined: Vec<f64> = windows.iter().flat_map(|w| w.samples.clone()).collect();
        assert_eq!(joined.len(), 12);
        assert_eq!(&joined[..10], &samples[..]);
    }

    #[test]
    fn test_segment_empty_input() {
        assert!(segment(&[], 4).is_empty());
    }

    #[test]
    fn test_segment_ids_are_ordered() {
        let windows = segment(&vec![0.0; 100], 7);
        for (i, w) in windows.iter().enumerate() {
            assert_eq!(w.id, i);
        }
    }

    #[test]
    fn test_rms_known_value() {
        let w = WindowBundle::new(0, vec![3.0, -4.0]);
        // sqrt((9 + 16) / 2)
        assert!(approx_eq!(f64, w.rms(), 12.5_f64.sqrt(), epsilon = _EPSILON));
    }

    #[test]
    fn test_rms_silent_window_is_zero() {
        let w = WindowBundle::new(0, vec![0.0; 64]);
        assert_eq!(w.rms(), 0.0);
    }

    #[test]
    fn test_rms_is_memoized() {
        let w = WindowBundle::new(0, vec![1.0, -1.0, 1.0]);
        let first = w.rms();
        assert_eq!(w.rms(), first);
        assert_eq!(w.rms.get(), Some(first));
    }
}
