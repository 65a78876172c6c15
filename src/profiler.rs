//! Noise-profile extraction: percentile RMS threshold, Noise/Signal window
//! classification, and circular gap-filling prediction that reconstructs
//! plausible noise content under signal-dominated windows.

use std::cell::{Cell, OnceCell};

use crate::error::DenoiseError;
use crate::sequence::{ReplayDirection, WindowSequence};
use crate::wav;
use crate::window::{segment, WindowBundle};

/// Grace factor applied to the RMS threshold comparison: a window counts as
/// noise while its RMS stays below threshold * 1.05.
const RMS_GRACE: f64 = 1.05;

/// Classification tag for one window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowClass {
    Noise,
    Signal,
}

/// Profiler settings. Defaults match the original tuning: 0.1 s windows and
/// the 95th percentile RMS cut.
#[derive(Clone, Copy, Debug)]
pub struct ProfilerConfig {
    pub window_secs: f64,
    pub percentile: f64,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        ProfilerConfig {
            window_secs: 0.1,
            percentile: 95.0,
        }
    }
}

/// Segments a recording into fixed windows, classifies them by RMS energy,
/// and synthesizes a full-duration noise-only waveform.
///
/// The RMS threshold and the classification are memoized behind interior
/// mutability, so every accessor takes `&self`, views over both classes can
/// coexist, and repeated calls return the first result unconditionally no
/// matter the caller ordering. Profile assembly consumes the profiler,
/// releasing the window and sequence state.
pub struct NoiseProfiler {
    windows: Vec<WindowBundle>,
    window_samples: usize,
    percentile: f64,
    threshold: Cell<Option<f64>>,
    classes: OnceCell<Vec<WindowClass>>,
}

impl NoiseProfiler {
    pub fn new(
        samples: &[f64],
        sample_rate: u32,
        config: ProfilerConfig,
    ) -> Result<Self, DenoiseError> {
        if samples.is_empty() {
            return Err(DenoiseError::Config("input recording is empty".into()));
        }
        let window_samples = (config.window_secs * f64::from(sample_rate)) as usize;
        if window_samples == 0 {
            return Err(DenoiseError::Config(format!(
                "window of {} s holds no samples at {} Hz",
                config.window_secs, sample_rate
            )));
        }

        Ok(NoiseProfiler {
            windows: segment(samples, window_samples),
            window_samples,
            percentile: config.percentile,
            threshold: Cell::new(None),
            classes: OnceCell::new(),
        })
    }

    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    /// Percentile RMS threshold over all windows: sort by RMS descending and
    /// read the RMS at `floor(p/100 * count)` (clamped to the last window).
    ///
    /// Memoized for the lifetime of the profiler; once computed, later calls
    /// return the cached value regardless of `percentile_level`.
    pub fn rms_threshold(&self, percentile_level: f64) -> f64 {
        if let Some(threshold) = self.threshold.get() {
            return threshold;
        }

        let mut sorted: Vec<&WindowBundle> = self.windows.iter().collect();
        sorted.sort_by(|a, b| b.rms().partial_cmp(&a.rms()).unwrap());

        let n_windows = sorted.len();
        let threshold_index =
            ((percentile_level / 100.0 * n_windows as f64).floor() as usize).min(n_windows - 1);
        let threshold = sorted[threshold_index].rms();

        self.threshold.set(Some(threshold));
        threshold
    }

    /// Split windows into Noise and Signal by the percentile threshold.
    /// A no-op once the classification exists.
    pub fn classify(&self) {
        self.classes();
    }

    fn classes(&self) -> &[WindowClass] {
        self.classes.get_or_init(|| {
            let threshold = self.rms_threshold(self.percentile);
            self.windows
                .iter()
                .map(|w| {
                    if w.rms() < threshold * RMS_GRACE {
                        WindowClass::Noise
                    } else {
                        WindowClass::Signal
                    }
                })
                .collect()
        })
    }

    /// Noise-classified windows in id order.
    pub fn noise_windows(&self) -> Vec<&WindowBundle> {
        self.windows
            .iter()
            .zip(self.classes().iter())
            .filter(|(_, c)| **c == WindowClass::Noise)
            .map(|(w, _)| w)
            .collect()
    }

    /// Signal-classified windows in id order.
    pub fn signal_windows(&self) -> Vec<&WindowBundle> {
        self.windows
            .iter()
            .zip(self.classes().iter())
            .filter(|(_, c)| **c == WindowClass::Signal)
            .map(|(w, _)| w)
            .collect()
    }

    /// Full-length slot view in id order: `Some(window)` where the slot holds
    /// the wanted class, `None` elsewhere. Views over both classes can be
    /// held at the same time.
    pub fn slot_view(&self, class: WindowClass) -> Vec<Option<&WindowBundle>> {
        self.windows
            .iter()
            .zip(self.classes().iter())
            .map(|(w, c)| (*c == class).then_some(w))
            .collect()
    }

    fn window_sequence(&self) -> WindowSequence {
        let flags = self
            .classes()
            .iter()
            .map(|c| *c == WindowClass::Noise)
            .collect();
        WindowSequence::new(flags)
    }

    /// Noise slots carry their raw samples, signal slots carry zeros. The
    /// original's masking/inspection variant of the profile.
    pub fn noise_or_zero(&self) -> Vec<f64> {
        let mut data = Vec::with_capacity(self.windows.len() * self.window_samples);
        for (window, class) in self.windows.iter().zip(self.classes().iter()) {
            match class {
                WindowClass::Noise => data.extend_from_slice(&window.samples),
                WindowClass::Signal => data.extend(std::iter::repeat(0.0).take(self.window_samples)),
            }
        }
        data
    }

    /// Per-window RMS replicated to window length, for external plotting.
    pub fn rms_envelope(&self) -> Vec<f64> {
        let mut envelope = Vec::with_capacity(self.windows.len() * self.window_samples);
        for window in &self.windows {
            envelope.extend(std::iter::repeat(window.rms()).take(window.samples.len()));
        }
        envelope
    }

    /// Assemble the full-duration noise profile: noise slots carry their own
    /// unaltered samples, gap slots carry circularly predicted noise content.
    ///
    /// Consumes the profiler; the window arena is memory-heavy for long
    /// recordings and is released when this returns.
    pub fn noise_profile(self) -> Result<Vec<f64>, DenoiseError> {
        let seq = self.window_sequence();
        assemble(&self.windows, &seq)
    }
}

/// Window ids whose samples fill a gap anchored at `anchor` (the populated
/// node that closed the gap, or the last populated node for a trailing gap).
///
/// No backward anchor means the gap precedes the first noise window, so the
/// replay runs future-circular from the nearest forward noise slot; otherwise
/// it runs past-circular from the nearest backward one. A lone noise window
/// with no valid neighbor replays itself.
fn predict(
    seq: &WindowSequence,
    anchor: usize,
    count: usize,
) -> Result<Vec<usize>, DenoiseError> {
    match seq.nearest_valid_backward(anchor) {
        Some(prev) => Ok(seq
            .circular_replay(prev, ReplayDirection::Backward, count)
            .collect()),
        None => {
            let start = seq
                .nearest_valid_forward(anchor)
                .or_else(|| seq.is_noise(anchor).then_some(anchor))
                .ok_or(DenoiseError::InsufficientData)?;
            Ok(seq
                .circular_replay(start, ReplayDirection::Forward, count)
                .collect())
        }
    }
}

/// Single pass over the sequence in id order, tracking the run length of
/// consecutive signal slots and predicting each gap as soon as a noise slot
/// closes it. A trailing gap is predicted from the last populated slot.
fn assemble(windows: &[WindowBundle], seq: &WindowSequence) -> Result<Vec<f64>, DenoiseError> {
    let window_samples = windows.first().map_or(0, |w| w.samples.len());
    let mut profile = Vec::with_capacity(windows.len() * window_samples);

    let mut gap = 0usize;
    let mut last_valid: Option<usize> = None;
    for id in 0..seq.len() {
        if !seq.is_noise(id) {
            gap += 1;
            continue;
        }
        if gap > 0 {
            for wid in predict(seq, id, gap)? {
                profile.extend_from_slice(&windows[wid].samples);
            }
            gap = 0;
        }
        profile.extend_from_slice(&windows[id].samples);
        last_valid = Some(id);
    }

    // gap running through the end of the recording
    if gap > 0 {
        let anchor = last_valid.ok_or(DenoiseError::InsufficientData)?;
        for wid in predict(seq, anchor, gap)? {
            profile.extend_from_slice(&windows[wid].samples);
        }
    }

    Ok(profile)
}

/// Extract a synthetic noise-only waveform from `input` and write it to
/// `output` at the input's sample rate.
pub fn extract_noise_profile(
    input: &str,
    output: &str,
    config: ProfilerConfig,
) -> Result<(), DenoiseError> {
    let (samples, rate) = wav::read_wav(input)?;
    let profiler = NoiseProfiler::new(&samples, rate, config)?;
    let profile = profiler.noise_profile()?;
    wav::save_wav(&profile, rate, output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::_EPSILON;
    use float_cmp::approx_eq;
    use std::f64::consts::PI;

    const RATE: u32 = 44100;
    const WINDOW: usize = 4410; // 0.1 s at 44.1 kHz

    /// Alternating-sign samples with the given amplitude: RMS is exactly the
    /// amplitude, and each window is distinguishable by it.
    fn flat_noise(amplitude: f64, len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| if i % 2 == 0 { amplitude } else { -amplitude })
            .collect()
    }

    fn tone(amplitude: f64, freq: f64, len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| amplitude * (2.0 * PI * freq * i as f64 / RATE as f64).sin())
            .collect()
    }

    /// 1 s mono recording: [0.4 s noise][0.2 s tone][0.4 s noise], with each
    /// noise window carrying a slightly different amplitude (within the 5%
    /// grace band) so gap-filled slots can be traced to their source window.
    fn mixed_recording() -> Vec<f64> {
        let mut samples = Vec::with_capacity(10 * WINDOW);
        for w in 0..10usize {
            if (4..7).contains(&w) {
                samples.extend(tone(0.8, 1000.0, WINDOW));
            } else {
                samples.extend(flat_noise(0.1 * (1.0 + 0.002 * w as f64), WINDOW));
            }
        }
        samples
    }

    fn profiler(samples: &[f64], percentile: f64) -> NoiseProfiler {
        NoiseProfiler::new(
            samples,
            RATE,
            ProfilerConfig {
                window_secs: 0.1,
                percentile,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_threshold_is_memoized_regardless_of_arguments() {
        let samples = mixed_recording();
        let p = profiler(&samples, 95.0);
        let first = p.rms_threshold(95.0);
        assert_eq!(p.rms_threshold(95.0), first);
        // cached value wins even when the percentile changes
        assert_eq!(p.rms_threshold(10.0), first);
    }

    #[test]
    fn test_threshold_value_is_percentile_rms() {
        let samples = mixed_recording();
        let p = profiler(&samples, 95.0);
        // index floor(0.95 * 10) = 9 in descending order: the smallest RMS
        assert!(approx_eq!(f64, p.rms_threshold(95.0), 0.1, epsilon = 1e-6));
    }

    #[test]
    fn test_noise_count_monotone_in_percentile() {
        // a higher percentile reads further down the descending RMS order,
        // so the cut only ever drops and the noise set only ever shrinks
        let samples = mixed_recording();
        let mut previous = usize::MAX;
        for percentile in [20.0, 50.0, 80.0, 95.0] {
            let p = profiler(&samples, percentile);
            let count = p.noise_windows().len();
            assert!(
                count <= previous,
                "noise count grew from {} to {} at percentile {}",
                previous,
                count,
                percentile
            );
            previous = count;
        }
    }

    #[test]
    fn test_classification_is_a_partition() {
        let samples = mixed_recording();
        let p = profiler(&samples, 95.0);
        let noise = p.noise_windows().len();
        let signal = p.signal_windows().len();
        assert_eq!(noise + signal, p.window_count());

        // both full-length views can be held side by side
        let noise_view = p.slot_view(WindowClass::Noise);
        let signal_view = p.slot_view(WindowClass::Signal);
        assert_eq!(noise_view.len(), p.window_count());
        assert_eq!(signal_view.len(), p.window_count());
        for (n, s) in noise_view.iter().zip(signal_view.iter()) {
            assert!(n.is_some() != s.is_some());
        }
    }

    #[test]
    fn test_classify_is_idempotent() {
        let samples = mixed_recording();
        let p = profiler(&samples, 95.0);
        p.classify();
        let first = p.classes().to_vec();
        p.classify();
        assert_eq!(p.classes(), first.as_slice());
    }

    #[test]
    fn test_all_noise_input_yields_raw_concatenation() {
        // identical windows: every RMS equals the threshold, all noise
        let samples = flat_noise(0.1, 10 * WINDOW);
        let p = profiler(&samples, 95.0);
        let profile = p.noise_profile().unwrap();
        assert_eq!(profile, samples);
    }

    #[test]
    fn test_all_signal_sequence_fails_explicitly() {
        let windows = segment(&flat_noise(0.1, 3 * WINDOW), WINDOW);
        let seq = WindowSequence::new(vec![false, false, false]);
        assert!(matches!(
            assemble(&windows, &seq),
            Err(DenoiseError::InsufficientData)
        ));
    }

    #[test]
    fn test_leading_gap_uses_future_circular_replay() {
        let seq = WindowSequence::new(vec![false, false, true, true, false]);
        // leading gap of 2 anchored at slot 2: no backward noise, so the
        // replay starts at the nearest forward slot (3); slot 4 is signal,
        // so the walk wraps straight back to 3
        let ids = predict(&seq, 2, 2).unwrap();
        assert_eq!(ids, vec![3, 3]);
    }

    #[test]
    fn test_zero_length_input_is_config_error() {
        assert!(matches!(
            NoiseProfiler::new(&[], RATE, ProfilerConfig::default()),
            Err(DenoiseError::Config(_))
        ));
    }

    #[test]
    fn test_zero_window_is_config_error() {
        let config = ProfilerConfig {
            window_secs: 0.0,
            percentile: 95.0,
        };
        assert!(matches!(
            NoiseProfiler::new(&[0.1, 0.2], RATE, config),
            Err(DenoiseError::Config(_))
        ));
    }

    #[test]
    fn test_noise_or_zero_masks_signal_slots() {
        let samples = mixed_recording();
        let p = profiler(&samples, 95.0);
        let masked = p.noise_or_zero();
        assert_eq!(masked.len(), 10 * WINDOW);
        // noise slot carries raw data
        assert_eq!(&masked[..WINDOW], &samples[..WINDOW]);
        // tone slots are silenced
        assert!(masked[4 * WINDOW..7 * WINDOW].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_rms_envelope_replicates_window_rms() {
        let samples = mixed_recording();
        let p = profiler(&samples, 95.0);
        let envelope = p.rms_envelope();
        assert_eq!(envelope.len(), 10 * WINDOW);
        assert!(approx_eq!(f64, envelope[0], 0.1, epsilon = _EPSILON));
        assert!(envelope[..WINDOW].iter().all(|&e| e == envelope[0]));
    }

    #[test]
    fn test_end_to_end_mixed_recording() {
        let samples = mixed_recording();
        let p = profiler(&samples, 95.0);

        let noise_ids: Vec<usize> = p.noise_windows().iter().map(|w| w.id).collect();
        let signal_ids: Vec<usize> = p.signal_windows().iter().map(|w| w.id).collect();
        assert_eq!(noise_ids, vec![0, 1, 2, 3, 7, 8, 9]);
        assert_eq!(signal_ids, vec![4, 5, 6]);

        let profile = p.noise_profile().unwrap();
        assert_eq!(profile.len(), samples.len());

        // every noise slot carries its own raw samples
        for w in [0usize, 1, 2, 3, 7, 8, 9] {
            assert_eq!(
                &profile[w * WINDOW..(w + 1) * WINDOW],
                &samples[w * WINDOW..(w + 1) * WINDOW]
            );
        }

        // the gap is closed by window 7, whose nearest backward noise slot is
        // 3: past-circular replay emits windows 3, 2, 1 into slots 4, 5, 6
        for (slot, source) in [(4usize, 3usize), (5, 2), (6, 1)] {
            assert_eq!(
                &profile[slot * WINDOW..(slot + 1) * WINDOW],
                &samples[source * WINDOW..(source + 1) * WINDOW]
            );
            // predicted content is never silence
            assert!(profile[slot * WINDOW..(slot + 1) * WINDOW]
                .iter()
                .any(|&s| s != 0.0));
        }
    }

    #[test]
    fn test_trailing_gap_is_predicted() {
        // [noise x4][tone x2] at the end of the recording
        let mut samples = Vec::new();
        for w in 0..4usize {
            samples.extend(flat_noise(0.1 * (1.0 + 0.002 * w as f64), WINDOW));
        }
        samples.extend(tone(0.8, 1000.0, 2 * WINDOW));

        let p = profiler(&samples, 95.0);
        let profile = p.noise_profile().unwrap();
        assert_eq!(profile.len(), samples.len());
        // anchored at the last populated slot (3); its backward neighbor 2
        // seeds the past-circular walk: slots 4, 5 get windows 2, 1
        for (slot, source) in [(4usize, 2usize), (5, 1)] {
            assert_eq!(
                &profile[slot * WINDOW..(slot + 1) * WINDOW],
                &samples[source * WINDOW..(source + 1) * WINDOW]
            );
        }
    }
}
