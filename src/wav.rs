//! WAV I/O: whole-file read/write plus the streamed block reader and block
//! writer used by the per-block denoiser.

use std::fs::File;
use std::io::{BufReader, BufWriter};

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::error::DenoiseError;

const SAMPLE_MAX: f64 = 32767.0;

/// Reject anything that is not mono 16-bit integer PCM.
fn check_spec(spec: &WavSpec) -> Result<(), DenoiseError> {
    if spec.channels != 1 {
        return Err(DenoiseError::Config(format!(
            "expected 1 channel, found {}",
            spec.channels
        )));
    }
    if spec.bits_per_sample != 16 {
        return Err(DenoiseError::Config(format!(
            "expected 16 bits per sample, found {}",
            spec.bits_per_sample
        )));
    }
    if spec.sample_format != SampleFormat::Int {
        return Err(DenoiseError::Config(format!(
            "expected PCM integer format, found {:?}",
            spec.sample_format
        )));
    }
    Ok(())
}

/// Normalize a vector of samples to the range [-1.0, 1.0].
/// Signals already inside the range are returned unchanged.
fn normalize_samples(samples: &[f64]) -> Vec<f64> {
    let max_sample = samples.iter().fold(0.0_f64, |max, &s| max.max(s.abs()));
    if max_sample > 1.0 {
        return samples.iter().map(|s| s / max_sample).collect();
    }
    samples.to_vec()
}

/// Returns (total samples, sample rate) of a mono 16-bit PCM WAV file
/// without reading its data.
pub fn info(path: &str) -> Result<(usize, u32), DenoiseError> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    check_spec(&spec)?;
    Ok((reader.duration() as usize, spec.sample_rate))
}

/// Reads a single-channel 16-bit PCM WAV file and returns the samples
/// normalized to [-1.0, 1.0] together with the sample rate.
pub fn read_wav(path: &str) -> Result<(Vec<f64>, u32), DenoiseError> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();
    check_spec(&spec)?;

    let mut samples = Vec::with_capacity(reader.duration() as usize);
    for sample in reader.samples::<i16>() {
        samples.push(f64::from(sample?) / SAMPLE_MAX);
    }

    Ok((samples, spec.sample_rate))
}

/// Writes a vector of samples (in any range) to a single-channel 16-bit PCM
/// WAV file at the given sample rate. The signal is normalized to
/// [-1.0, 1.0] first (a no-op when it already fits), then scaled to i16.
pub fn save_wav(sig: &[f64], sample_rate: u32, path: &str) -> Result<(), DenoiseError> {
    let normalized = normalize_samples(sig);

    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)?;

    for s in normalized {
        writer.write_sample((s * SAMPLE_MAX) as i16)?;
    }

    writer.finalize()?;
    Ok(())
}

/// Sequential reader yielding successive sample blocks of a fixed size from a
/// mono 16-bit PCM WAV file. The final block may be shorter.
pub struct BlockReader {
    reader: WavReader<BufReader<File>>,
    block_samples: usize,
}

impl BlockReader {
    pub fn open(path: &str, block_samples: usize) -> Result<Self, DenoiseError> {
        if block_samples == 0 {
            return Err(DenoiseError::Config("block size must be positive".into()));
        }
        let reader = WavReader::open(path)?;
        check_spec(&reader.spec())?;
        Ok(BlockReader { reader, block_samples })
    }

    pub fn sample_rate(&self) -> u32 {
        self.reader.spec().sample_rate
    }

    /// Total number of samples in the file.
    pub fn total_samples(&self) -> usize {
        self.reader.duration() as usize
    }

    /// Number of blocks this reader will yield.
    pub fn block_count(&self) -> usize {
        self.total_samples().div_ceil(self.block_samples)
    }
}

impl Iterator for BlockReader {
    type Item = Result<Vec<f64>, DenoiseError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut block = Vec::with_capacity(self.block_samples);
        {
            let mut samples = self.reader.samples::<i16>();
            while block.len() < self.block_samples {
                match samples.next() {
                    Some(Ok(s)) => block.push(f64::from(s) / SAMPLE_MAX),
                    Some(Err(e)) => return Some(Err(e.into())),
                    None => break,
                }
            }
        }
        if block.is_empty() {
            None
        } else {
            Some(Ok(block))
        }
    }
}

/// Streaming sink accepting successive float blocks at a fixed sample rate,
/// finalized on completion. Samples are clamped to [-1.0, 1.0] before the i16
/// conversion since no global peak is known while streaming.
pub struct BlockWriter {
    writer: WavWriter<BufWriter<File>>,
}

impl BlockWriter {
    pub fn create(path: &str, sample_rate: u32) -> Result<Self, DenoiseError> {
        let spec = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let writer = WavWriter::create(path, spec)?;
        Ok(BlockWriter { writer })
    }

    pub fn write_block(&mut self, block: &[f64]) -> Result<(), DenoiseError> {
        for &s in block {
            let clamped = s.clamp(-1.0, 1.0);
            self.writer.write_sample((clamped * SAMPLE_MAX) as i16)?;
        }
        Ok(())
    }

    pub fn finalize(self) -> Result<(), DenoiseError> {
        self.writer.finalize()?;
        Ok(())
    }
}
