use thiserror::Error;

/// Errors raised by the denoiser and the noise profiler.
///
/// Every failure is fatal to the current operation: no partial output is
/// written and nothing is retried.
#[derive(Debug, Error)]
pub enum DenoiseError {
    /// Input length, window size, or block size incompatible with the
    /// configured transform.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Gap prediction was requested but the recording contains no
    /// noise-classified windows at all.
    #[error("no noise-classified windows available for gap prediction")]
    InsufficientData,

    /// WAV decode/encode failure, propagated from hound unchanged.
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    /// Filesystem failure, propagated unchanged.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
